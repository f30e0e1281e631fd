//! Curation of the master lists and the code list

use tracing::{error, info, warn};

use crate::api::MapperApi;
use crate::error::{Error, Result};
use crate::models::{Category, MasterItem, TextToCui};
use crate::selector::SearchableSelector;
use crate::workflows::PendingDeletion;

/// Add a code to the code master list. Blank text is rejected locally.
pub async fn add_code(api: &dyn MapperApi, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(Error::validation("Please enter text for the new code"));
    }
    api.add_code(text)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to add code to master"))?;
    info!(code = %text, "Code added");
    Ok(())
}

/// Browse, extend and prune one category's master list.
#[derive(Debug, Clone)]
pub struct MasterCuration {
    category: Category,
    pub items: SearchableSelector<MasterItem>,
}

impl MasterCuration {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            items: SearchableSelector::loading(),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// (Re)load the master list.
    pub async fn load(&mut self, api: &dyn MapperApi) -> Result<()> {
        self.items.set_loading(true);
        match api.list_master_items(self.category).await {
            Ok(list) => {
                self.items.set_candidates(list);
                Ok(())
            }
            Err(e) => {
                error!(category = %self.category, error = %e, "Failed to fetch master items");
                self.items.finish_loading();
                Err(e)
            }
        }
    }

    /// Add `text` to the list and reload it.
    pub async fn add_item(&mut self, api: &dyn MapperApi, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(Error::validation("Please enter text for the new item"));
        }
        api.add_master_item(self.category, text)
            .await
            .inspect_err(|e| error!(category = %self.category, error = %e, "Failed to add master item"))?;
        info!(category = %self.category, text, "Master item added");
        self.load(api).await
    }

    /// Text-to-CUI details of the selected item.
    pub async fn details(&self, api: &dyn MapperApi) -> Result<Vec<TextToCui>> {
        let item = self.selected()?;
        api.lookup_text_to_cuis(self.category, item)
            .await
            .inspect_err(|e| {
                error!(category = %self.category, error = %e, "Failed to fetch text-to-CUI details")
            })
    }

    pub fn request_delete(&self) -> Result<PendingDeletion> {
        let item = self.selected()?;
        Ok(PendingDeletion::MasterItem {
            category: self.category,
            item: item.clone(),
        })
    }

    /// Confirm a deletion, drop the selection and reload the list. The
    /// backend's message is returned even if the reload fails.
    pub async fn confirm_delete(
        &mut self,
        api: &dyn MapperApi,
        pending: PendingDeletion,
    ) -> Result<String> {
        let message = pending.confirm(api).await?;
        self.items.clear();
        if let Err(e) = self.load(api).await {
            warn!(category = %self.category, error = %e, "Item deleted but the list could not be reloaded");
        }
        Ok(message)
    }

    fn selected(&self) -> Result<&MasterItem> {
        self.items
            .selection()
            .ok_or_else(|| Error::validation("Please select an item"))
    }
}
