//! Mapping backend HTTP client

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use codemap_core::{
    Acknowledgement, Category, Code, CodeGroup, CuiDetails, MapperApi, MappingPayload,
    MappingRow, MasterItem, SelectedItem, TextToCui,
};

use crate::error::{Error, Result};
use crate::models::{
    AddMappingRequest, AddMasterValueRequest, CuiLookupRequest, DeleteMasterValueRequest,
    HealthMessage, MappingKeyRequest, SubmitGroupRequest, TextRequest, TextToCuiRequest,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8081/research";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how to reach the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Text-to-CUI lookups may be served from a different deployment.
    /// Falls back to `base_url`.
    pub text_to_cui_base_url: Option<String>,
    /// Full URL of an auxiliary service's health endpoint, answering
    /// `{"message": ...}`. Not checked when unset.
    pub service_health_url: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            text_to_cui_base_url: None,
            service_health_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_base_url("base_url", &self.base_url)?;
        if let Some(url) = &self.text_to_cui_base_url {
            validate_base_url("text_to_cui_base_url", url)?;
        }
        if let Some(url) = &self.service_health_url {
            validate_base_url("service_health_url", url)?;
        }
        if self.timeout.is_zero() {
            return Err(Error::InvalidConfig("timeout must be non-zero".into()));
        }
        Ok(())
    }
}

fn validate_base_url(name: &str, url: &str) -> Result<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{name} must be an http(s) URL, got '{url}'"
        )))
    }
}

/// [`MapperApi`] over HTTP/JSON.
pub struct HttpMapperClient {
    client: Client,
    base_url: String,
    text_to_cui_base_url: String,
    service_health_url: Option<String>,
}

impl HttpMapperClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder().timeout(config.timeout).build()?;
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let text_to_cui_base_url = config
            .text_to_cui_base_url
            .as_deref()
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| base_url.clone());
        Ok(Self {
            client,
            base_url,
            text_to_cui_base_url,
            service_health_url: config.service_health_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Status message of the auxiliary service, or `None` when no
    /// `service_health_url` is configured.
    pub async fn service_health(&self) -> Result<Option<String>> {
        let Some(url) = &self.service_health_url else {
            return Ok(None);
        };
        let health: HealthMessage = self
            .send_json(self.client.get(url.as_str()), "Service is down")
            .await?;
        Ok(Some(health.message))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, context: &str) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        debug!(%status, url = %response.url(), "Backend responded");
        if !status.is_success() {
            return Err(Error::Status {
                context: context.to_string(),
                status,
            });
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<T> {
        let response = self.send(request, context).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn send_text(&self, request: RequestBuilder, context: &str) -> Result<String> {
        let response = self.send(request, context).await?;
        Ok(response.text().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, context: &str) -> Result<T> {
        self.send_json(self.client.get(self.url(path)), context)
            .await
    }
}

#[async_trait]
impl MapperApi for HttpMapperClient {
    async fn list_codes(&self) -> codemap_core::Result<Vec<Code>> {
        Ok(self.get_json("codes", "Error fetching codes").await?)
    }

    async fn get_code(&self, id: i64) -> codemap_core::Result<Code> {
        Ok(self
            .get_json(&format!("codes/{id}"), "Error fetching code")
            .await?)
    }

    async fn add_code(&self, text: &str) -> codemap_core::Result<()> {
        let request = self
            .client
            .post(self.url("codes/addCode"))
            .json(&TextRequest { text });
        let message = self.send_text(request, "Failed to add code").await?;
        debug!(%message, "Add code response");
        Ok(())
    }

    async fn list_master_items(&self, category: Category) -> codemap_core::Result<Vec<MasterItem>> {
        Ok(self
            .get_json(
                &format!("master-items/{category}"),
                &format!("Error fetching {category} items"),
            )
            .await?)
    }

    async fn add_master_item(&self, category: Category, text: &str) -> codemap_core::Result<()> {
        let request = self
            .client
            .post(self.url("master/add"))
            .json(&AddMasterValueRequest { category, text });
        self.send(request, &format!("Failed to add {category} master value"))
            .await?;
        Ok(())
    }

    async fn delete_master_item(
        &self,
        category: Category,
        id: i64,
        text: &str,
    ) -> codemap_core::Result<()> {
        let request = self
            .client
            .delete(self.url("master/delete-master-value"))
            .json(&DeleteMasterValueRequest { category, id, text });
        self.send(request, "Error deleting master value").await?;
        Ok(())
    }

    async fn list_data_for_code(
        &self,
        code_id: i64,
        category: Category,
    ) -> codemap_core::Result<Vec<MasterItem>> {
        Ok(self
            .get_json(
                &format!("codes/{code_id}/{category}"),
                &format!("Error fetching {category} data"),
            )
            .await?)
    }

    async fn list_clients(&self) -> codemap_core::Result<Vec<String>> {
        Ok(self.get_json("clients", "Error fetching clients").await?)
    }

    async fn submit_selection(
        &self,
        code_id: i64,
        items: &[SelectedItem],
        client: &str,
    ) -> codemap_core::Result<Acknowledgement> {
        debug!(code_id, count = items.len(), client, "Submitting selected items");
        let request = self
            .client
            .post(self.url("addGroup"))
            .json(&SubmitGroupRequest {
                code_id,
                selected_items: items,
                client,
            });
        Ok(self.send_json(request, "Error submitting data").await?)
    }

    async fn list_code_groups(&self, code_id: i64) -> codemap_core::Result<Vec<CodeGroup>> {
        Ok(self
            .get_json(
                &format!("codes/groups/{code_id}"),
                "Error fetching code groups",
            )
            .await?)
    }

    async fn delete_code_group(
        &self,
        code_id: i64,
        group_id: i64,
    ) -> codemap_core::Result<Acknowledgement> {
        let request = self
            .client
            .delete(self.url(&format!("codes/groups/delete/{code_id}/{group_id}")));
        Ok(self.send_json(request, "Error deleting code group").await?)
    }

    async fn lookup_cuis(
        &self,
        item: &MasterItem,
        code: &Code,
        category: Category,
    ) -> codemap_core::Result<Vec<CuiDetails>> {
        let request = self
            .client
            .post(self.url("api/cuis"))
            .json(&CuiLookupRequest {
                master_item: item,
                code,
                category,
            });
        Ok(self.send_json(request, "Error fetching CUIs").await?)
    }

    async fn lookup_text_to_cuis(
        &self,
        category: Category,
        item: &MasterItem,
    ) -> codemap_core::Result<Vec<TextToCui>> {
        let request = self
            .client
            .post(format!("{}/fetch/text-to-cuis", self.text_to_cui_base_url))
            .json(&TextToCuiRequest {
                category,
                master_data_item: item,
            });
        Ok(self
            .send_json(request, "Error fetching text-to-CUI details")
            .await?)
    }

    async fn add_mapping(
        &self,
        category: Category,
        payload: &MappingPayload,
    ) -> codemap_core::Result<()> {
        let request = self
            .client
            .post(self.url("add/add-code-mapping"))
            .json(&AddMappingRequest { category, payload });
        let message = self
            .send_text(request, "Error adding code mapping")
            .await?;
        debug!(%message, "Add code mapping response");
        Ok(())
    }

    async fn get_mapping_data(
        &self,
        item: &MasterItem,
        code: &Code,
        category: Category,
    ) -> codemap_core::Result<Vec<MappingRow>> {
        let request = self
            .client
            .post(self.url("get/code-mapping-data"))
            .json(&MappingKeyRequest {
                master_data_item: item,
                code_master: code,
                category,
            });
        Ok(self
            .send_json(request, "Error fetching code mapping data")
            .await?)
    }

    async fn delete_mapping(
        &self,
        item: &MasterItem,
        code: &Code,
        category: Category,
    ) -> codemap_core::Result<String> {
        let request = self
            .client
            .post(self.url("delete/code-mapping-data"))
            .json(&MappingKeyRequest {
                master_data_item: item,
                code_master: code,
                category,
            });
        Ok(self
            .send_text(request, "Error deleting code mapping")
            .await?)
    }

    async fn health(&self) -> codemap_core::Result<String> {
        Ok(self
            .send_text(self.client.get(self.url("health")), "Backend is down")
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_local_backend() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_non_http_base_urls() {
        let config = ClientConfig::new("localhost:8081");
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let config = ClientConfig {
            text_to_cui_base_url: Some("ftp://example".into()),
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ClientConfig {
            service_health_url: Some("localhost:7000/health".into()),
            ..ClientConfig::default()
        };
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("service_health_url"));
    }

    #[test]
    fn rejects_zero_timeout() {
        let config = ClientConfig {
            timeout: Duration::ZERO,
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let client = HttpMapperClient::new(ClientConfig::new("http://backend/research/")).unwrap();
        assert_eq!(client.base_url(), "http://backend/research");
        assert_eq!(client.url("codes"), "http://backend/research/codes");
        assert_eq!(client.text_to_cui_base_url, "http://backend/research");
    }

    #[test]
    fn client_errors_become_transport_errors() {
        let err: codemap_core::Error = Error::InvalidConfig("x".into()).into();
        assert!(matches!(err, codemap_core::Error::Transport(_)));
    }
}
