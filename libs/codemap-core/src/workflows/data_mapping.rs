//! Per-code data mapping: load the five category lists for a code, collect a
//! selection set and submit it as a group for a client.

use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::api::MapperApi;
use crate::error::{Error, Result};
use crate::models::{Category, Code, MasterItem, SelectedItem};
use crate::selection::{SelectionAggregator, Toggle};
use crate::selector::filter_candidates;

const DEFAULT_SUCCESS_MESSAGE: &str = "Selections submitted successfully";
const DEFAULT_FAILURE_MESSAGE: &str = "Failed to submit selections";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryData {
    pub category: Category,
    pub items: Vec<MasterItem>,
    /// The fetch failed and `items` is empty because of it.
    pub failed: bool,
}

/// A code with the master items associated to it in every category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeData {
    pub code: Code,
    pub categories: Vec<CategoryData>,
}

impl CodeData {
    pub fn items(&self, category: Category) -> &[MasterItem] {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.items.as_slice())
            .unwrap_or(&[])
    }

    pub fn failed_categories(&self) -> Vec<Category> {
        self.categories
            .iter()
            .filter(|c| c.failed)
            .map(|c| c.category)
            .collect()
    }
}

/// Fetch the code, then every category's items in parallel.
///
/// A category that fails to load is logged and comes back empty; it does not
/// fail the whole load. Failing to fetch the code itself does.
pub async fn load_code_data(api: &dyn MapperApi, code_id: i64) -> Result<CodeData> {
    let code = api
        .get_code(code_id)
        .await
        .inspect_err(|e| error!(code_id, error = %e, "Failed to fetch code"))?;

    let fetches = Category::ALL.into_iter().map(|category| async move {
        match api.list_data_for_code(code_id, category).await {
            Ok(items) => CategoryData {
                category,
                items,
                failed: false,
            },
            Err(e) => {
                warn!(code_id, category = %category, error = %e, "Failed to load category data");
                CategoryData {
                    category,
                    items: Vec::new(),
                    failed: true,
                }
            }
        }
    });
    let categories = join_all(fetches).await;

    debug!(code_id, code = %code.code, "Loaded code data");
    Ok(CodeData { code, categories })
}

/// What a successful group submission sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub items: Vec<SelectedItem>,
    pub message: String,
}

/// Selection state for one code, plus the client the group is recorded for.
#[derive(Debug, Clone)]
pub struct DataMappingSession {
    data: CodeData,
    clients: Vec<String>,
    client: Option<String>,
    pub selection: SelectionAggregator,
}

impl DataMappingSession {
    /// Load the code's data and the client list concurrently. The client list
    /// is optional: if it fails the session starts with none.
    pub async fn open(api: &dyn MapperApi, code_id: i64) -> Result<Self> {
        let (data, clients) = futures::join!(load_code_data(api, code_id), api.list_clients());
        let clients = clients.unwrap_or_else(|e| {
            error!(error = %e, "Failed to fetch clients");
            Vec::new()
        });
        Ok(Self::from_parts(data?, clients))
    }

    pub fn from_parts(data: CodeData, clients: Vec<String>) -> Self {
        Self {
            data,
            clients,
            client: None,
            selection: SelectionAggregator::new(),
        }
    }

    pub fn code(&self) -> &Code {
        &self.data.code
    }

    pub fn data(&self) -> &CodeData {
        &self.data
    }

    pub fn clients(&self) -> &[String] {
        &self.clients
    }

    pub fn client(&self) -> Option<&str> {
        self.client.as_deref()
    }

    /// Items of `category` whose text contains `query`.
    pub fn search(&self, category: Category, query: &str) -> Vec<&MasterItem> {
        filter_candidates(self.data.items(category), query)
    }

    /// Load another code. The selection set belongs to the previous code and is
    /// dropped; frequency counters and the chosen client are kept.
    pub async fn switch_code(&mut self, api: &dyn MapperApi, code_id: i64) -> Result<()> {
        self.data = load_code_data(api, code_id).await?;
        self.selection.clear();
        Ok(())
    }

    pub fn choose_client(&mut self, client: &str) -> Result<()> {
        let known = self.clients.iter().find(|c| c.as_str() == client);
        match known {
            Some(c) => {
                self.client = Some(c.clone());
                Ok(())
            }
            None => Err(Error::validation(format!("Unknown client: {client}"))),
        }
    }

    /// Toggle the item with `item_id` in `category`.
    pub fn toggle(&mut self, category: Category, item_id: i64) -> Result<Toggle> {
        let item = self
            .data
            .items(category)
            .iter()
            .find(|i| i.id == item_id)
            .cloned()
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "{} item {item_id} for code {}",
                    category.title(),
                    self.data.code.code
                ))
            })?;
        let toggle = self.selection.select(&item, category);
        if let Toggle::Added { frequency } = toggle {
            debug!(category = %category, item = %item.text, frequency, "Added to selections");
        }
        Ok(toggle)
    }

    /// Submit the selection set as a group.
    ///
    /// Validation failures leave the set untouched and make no call. Once the
    /// call is made the set is cleared, whether it succeeded or not; a failed
    /// submission has to be reselected.
    pub async fn apply(&mut self, api: &dyn MapperApi) -> Result<SubmissionReceipt> {
        let items = self.selection.build_submission(self.client.as_deref())?;
        let client = items
            .first()
            .and_then(|i| i.client.clone())
            .unwrap_or_default();

        let result = api
            .submit_selection(self.data.code.id, &items, &client)
            .await;
        self.selection.clear();

        match result {
            Ok(ack) if ack.success => {
                info!(
                    code_id = self.data.code.id,
                    client = %client,
                    count = items.len(),
                    "Selections submitted"
                );
                Ok(SubmissionReceipt {
                    items,
                    message: ack
                        .message
                        .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string()),
                })
            }
            Ok(ack) => {
                let message = ack
                    .message
                    .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
                warn!(code_id = self.data.code.id, %message, "Submission rejected");
                Err(Error::Rejected(message))
            }
            Err(e) => {
                error!(code_id = self.data.code.id, error = %e, "Error submitting selections");
                Err(e)
            }
        }
    }
}
