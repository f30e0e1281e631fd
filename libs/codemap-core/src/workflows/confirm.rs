//! Two-step destructive actions
//!
//! A workflow's `request_delete` validates its selection and returns a
//! [`PendingDeletion`]; nothing is sent until [`PendingDeletion::confirm`] runs.
//! Dropping the value is the "cancel" path.

use tracing::{error, info};

use crate::api::MapperApi;
use crate::error::{Error, Result};
use crate::models::{Category, Code, MasterItem};

#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "nothing is deleted until the pending deletion is confirmed"]
pub enum PendingDeletion {
    Mapping {
        category: Category,
        item: MasterItem,
        code: Code,
    },
    MasterItem {
        category: Category,
        item: MasterItem,
    },
    CodeGroup {
        code_id: i64,
        group_id: i64,
    },
}

impl PendingDeletion {
    /// Question put to the user before confirming.
    pub fn prompt(&self) -> String {
        match self {
            PendingDeletion::Mapping { item, code, .. } => format!(
                "This will permanently delete the mapping between {} and code {}. \
                 This action cannot be undone.",
                item.text, code.code
            ),
            PendingDeletion::MasterItem { item, .. } => format!(
                "Are you sure you want to delete \"{}\"? This action cannot be undone.",
                item.text
            ),
            PendingDeletion::CodeGroup { code_id, group_id } => format!(
                "This will delete group {group_id} of code {code_id}. This action cannot be undone."
            ),
        }
    }

    /// Perform the deletion and return the message to show.
    pub async fn confirm(self, api: &dyn MapperApi) -> Result<String> {
        match self {
            PendingDeletion::Mapping {
                category,
                item,
                code,
            } => {
                let message = api
                    .delete_mapping(&item, &code, category)
                    .await
                    .inspect_err(|e| error!(category = %category, error = %e, "Failed to delete mapping"))?;
                info!(category = %category, item_id = item.id, code_id = code.id, "Mapping deleted");
                Ok(if message.trim().is_empty() {
                    "Mapping deleted successfully".to_string()
                } else {
                    message
                })
            }
            PendingDeletion::MasterItem { category, item } => {
                api.delete_master_item(category, item.id, &item.text)
                    .await
                    .inspect_err(|e| error!(category = %category, error = %e, "Failed to delete master item"))?;
                info!(category = %category, item_id = item.id, "Master item deleted");
                Ok(format!("{} item deleted successfully", category.title()))
            }
            PendingDeletion::CodeGroup { code_id, group_id } => {
                let ack = api
                    .delete_code_group(code_id, group_id)
                    .await
                    .inspect_err(|e| error!(code_id, group_id, error = %e, "Error deleting group"))?;
                if ack.success {
                    info!(code_id, group_id, "Code group deleted");
                    Ok(ack
                        .message
                        .unwrap_or_else(|| "Group deleted successfully".to_string()))
                } else {
                    Err(Error::Rejected(
                        ack.message
                            .unwrap_or_else(|| "Failed to delete group".to_string()),
                    ))
                }
            }
        }
    }
}
