//! Look up and delete persisted mappings for one category

use tracing::error;

use crate::api::MapperApi;
use crate::error::{Error, Result};
use crate::models::{Category, Code, MappingRow, MasterItem};
use crate::selector::SearchableSelector;
use crate::workflows::{load_pickers, PendingDeletion};

#[derive(Debug, Clone)]
pub struct MappingViewer {
    category: Category,
    pub items: SearchableSelector<MasterItem>,
    pub codes: SearchableSelector<Code>,
    rows: Vec<MappingRow>,
}

impl MappingViewer {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            items: SearchableSelector::loading(),
            codes: SearchableSelector::loading(),
            rows: Vec::new(),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Unit and bound columns only apply to labs.
    pub fn shows_qualifier_columns(&self) -> bool {
        self.category.shows_additional_fields()
    }

    pub async fn load(&mut self, api: &dyn MapperApi) {
        load_pickers(api, self.category, &mut self.items, &mut self.codes).await;
    }

    /// Rows from the last successful [`MappingViewer::view`].
    pub fn rows(&self) -> &[MappingRow] {
        &self.rows
    }

    /// Fetch the mapping rows for the selected item and code.
    pub async fn view(&mut self, api: &dyn MapperApi) -> Result<&[MappingRow]> {
        let (item, code) = self.selected_pair()?;
        let rows = api
            .get_mapping_data(item, code, self.category)
            .await
            .inspect_err(|e| {
                error!(category = %self.category, error = %e, "Failed to fetch mapping data")
            })?;
        self.rows = rows;
        Ok(&self.rows)
    }

    pub fn request_delete(&self) -> Result<PendingDeletion> {
        let (item, code) = self.selected_pair()?;
        Ok(PendingDeletion::Mapping {
            category: self.category,
            item: item.clone(),
            code: code.clone(),
        })
    }

    fn selected_pair(&self) -> Result<(&MasterItem, &Code)> {
        match (self.items.selection(), self.codes.selection()) {
            (Some(item), Some(code)) => Ok((item, code)),
            _ => Err(Error::validation(
                "Please select both a master item and a code",
            )),
        }
    }
}
