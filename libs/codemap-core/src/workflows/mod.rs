//! Workflows that drive the selectors and forms against a [`MapperApi`]
//!
//! Every collaborator failure is logged where it is caught and returned to the
//! caller; the state change that depended on it is not applied.

pub mod code_groups;
pub mod confirm;
pub mod curation;
pub mod data_mapping;
pub mod mapping_view;

pub use code_groups::CodeGroupsView;
pub use confirm::PendingDeletion;
pub use curation::{add_code, MasterCuration};
pub use data_mapping::{load_code_data, CategoryData, CodeData, DataMappingSession, SubmissionReceipt};
pub use mapping_view::MappingViewer;

use tracing::error;

use crate::api::MapperApi;
use crate::models::{Category, Code, MasterItem};
use crate::selector::SearchableSelector;

/// Fill a master-item picker and a code picker concurrently. A failed fetch
/// leaves its picker empty and out of the loading state.
pub(crate) async fn load_pickers(
    api: &dyn MapperApi,
    category: Category,
    items: &mut SearchableSelector<MasterItem>,
    codes: &mut SearchableSelector<Code>,
) {
    items.set_loading(true);
    codes.set_loading(true);

    let (item_result, code_result) =
        futures::join!(api.list_master_items(category), api.list_codes());

    match item_result {
        Ok(list) => {
            items.set_candidates(list);
        }
        Err(e) => {
            error!(category = %category, error = %e, "Failed to load master items");
            items.finish_loading();
        }
    }

    load_codes_into(codes, code_result);
}

pub(crate) fn load_codes_into(
    codes: &mut SearchableSelector<Code>,
    result: crate::Result<Vec<Code>>,
) {
    match result {
        Ok(list) => {
            codes.set_candidates(list);
        }
        Err(e) => {
            error!(error = %e, "Failed to load codes");
            codes.finish_loading();
        }
    }
}
