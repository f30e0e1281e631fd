//! Previously submitted groups of a code

use tracing::{error, warn};

use crate::api::MapperApi;
use crate::error::{Error, Result};
use crate::models::{Code, CodeGroup};
use crate::selector::SearchableSelector;
use crate::workflows::{load_codes_into, PendingDeletion};

#[derive(Debug, Clone, Default)]
pub struct CodeGroupsView {
    pub codes: SearchableSelector<Code>,
    groups: Vec<CodeGroup>,
    stale: bool,
}

impl CodeGroupsView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the code list and, if `code_id` names one of the codes, select it
    /// and fetch its groups.
    pub async fn open(api: &dyn MapperApi, code_id: Option<i64>) -> Result<Self> {
        let mut view = Self::new();
        load_codes_into(&mut view.codes, api.list_codes().await);
        if let Some(id) = code_id {
            let found = view.codes.candidates().iter().find(|c| c.id == id).cloned();
            if found.is_some() {
                view.codes.set_selection(found);
                view.refresh(api).await?;
            }
        }
        Ok(view)
    }

    pub fn groups(&self) -> &[CodeGroup] {
        &self.groups
    }

    /// True when the last re-fetch after a change failed, so `groups` may
    /// still list rows the backend no longer has.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Select the code with `code_id` and fetch its groups. An unknown id
    /// leaves the current selection and groups untouched.
    pub async fn select(&mut self, api: &dyn MapperApi, code_id: i64) -> Result<()> {
        if !self.codes.candidates().iter().any(|c| c.id == code_id) {
            return Err(Error::NotFound(format!("code {code_id}")));
        }
        self.codes.input("");
        self.codes.choose(code_id);
        self.refresh(api).await
    }

    /// Re-fetch the groups of the selected code.
    pub async fn refresh(&mut self, api: &dyn MapperApi) -> Result<()> {
        let code_id = self.selected_code()?.id;
        self.groups = api
            .list_code_groups(code_id)
            .await
            .inspect_err(|e| error!(code_id, error = %e, "Failed to fetch code groups"))?;
        self.stale = false;
        Ok(())
    }

    pub fn request_delete(&self, group_id: i64) -> Result<PendingDeletion> {
        let code = self.selected_code()?;
        if !self.groups.iter().any(|g| g.group_id == group_id) {
            return Err(Error::NotFound(format!(
                "group {group_id} of code {}",
                code.code
            )));
        }
        Ok(PendingDeletion::CodeGroup {
            code_id: code.id,
            group_id,
        })
    }

    /// Confirm a deletion and re-fetch the groups. Once the backend has
    /// accepted the deletion its message is returned even if the re-fetch
    /// fails; the view is then marked stale.
    pub async fn confirm_delete(
        &mut self,
        api: &dyn MapperApi,
        pending: PendingDeletion,
    ) -> Result<String> {
        let message = pending.confirm(api).await?;
        if let Err(e) = self.refresh(api).await {
            warn!(error = %e, "Group deleted but the list could not be refreshed");
            self.stale = true;
        }
        Ok(message)
    }

    fn selected_code(&self) -> Result<&Code> {
        self.codes
            .selection()
            .ok_or_else(|| Error::validation("Please select a code"))
    }
}
