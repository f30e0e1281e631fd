use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Acknowledgement, Category, Code, CodeGroup, CuiDetails, MappingPayload, MappingRow,
    MasterItem, SelectedItem, TextToCui,
};

/// Data-access collaborator backing every workflow.
///
/// Implementations map their own failures into [`crate::Error::Transport`].
/// No call is retried by the workflows.
#[async_trait]
pub trait MapperApi: Send + Sync {
    async fn list_codes(&self) -> Result<Vec<Code>>;

    async fn get_code(&self, id: i64) -> Result<Code>;

    async fn add_code(&self, text: &str) -> Result<()>;

    async fn list_master_items(&self, category: Category) -> Result<Vec<MasterItem>>;

    async fn add_master_item(&self, category: Category, text: &str) -> Result<()>;

    async fn delete_master_item(&self, category: Category, id: i64, text: &str) -> Result<()>;

    /// Master items currently associated with a code in one category.
    async fn list_data_for_code(&self, code_id: i64, category: Category)
        -> Result<Vec<MasterItem>>;

    async fn list_clients(&self) -> Result<Vec<String>>;

    async fn submit_selection(
        &self,
        code_id: i64,
        items: &[SelectedItem],
        client: &str,
    ) -> Result<Acknowledgement>;

    async fn list_code_groups(&self, code_id: i64) -> Result<Vec<CodeGroup>>;

    async fn delete_code_group(&self, code_id: i64, group_id: i64) -> Result<Acknowledgement>;

    async fn lookup_cuis(
        &self,
        item: &MasterItem,
        code: &Code,
        category: Category,
    ) -> Result<Vec<CuiDetails>>;

    async fn lookup_text_to_cuis(
        &self,
        category: Category,
        item: &MasterItem,
    ) -> Result<Vec<TextToCui>>;

    async fn add_mapping(&self, category: Category, payload: &MappingPayload) -> Result<()>;

    async fn get_mapping_data(
        &self,
        item: &MasterItem,
        code: &Code,
        category: Category,
    ) -> Result<Vec<MappingRow>>;

    /// Returns the server's confirmation message.
    async fn delete_mapping(
        &self,
        item: &MasterItem,
        code: &Code,
        category: Category,
    ) -> Result<String>;

    /// Backend status text.
    async fn health(&self) -> Result<String>;
}
