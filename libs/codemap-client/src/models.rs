//! Request bodies sent to the mapping backend, and the few response
//! shapes not shared with the core models

use codemap_core::{Category, Code, MappingPayload, MasterItem, SelectedItem};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitGroupRequest<'a> {
    pub code_id: i64,
    pub selected_items: &'a [SelectedItem],
    pub client: &'a str,
}

#[derive(Debug, Serialize)]
pub struct TextRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub struct AddMasterValueRequest<'a> {
    #[serde(rename = "type")]
    pub category: Category,
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub struct DeleteMasterValueRequest<'a> {
    #[serde(rename = "type")]
    pub category: Category,
    pub id: i64,
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CuiLookupRequest<'a> {
    pub master_item: &'a MasterItem,
    pub code: &'a Code,
    #[serde(rename = "type")]
    pub category: Category,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextToCuiRequest<'a> {
    #[serde(rename = "type")]
    pub category: Category,
    pub master_data_item: &'a MasterItem,
}

#[derive(Debug, Serialize)]
pub struct AddMappingRequest<'a> {
    #[serde(rename = "type")]
    pub category: Category,
    pub payload: &'a MappingPayload,
}

/// Identifies a mapping for lookup and deletion.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingKeyRequest<'a> {
    pub master_data_item: &'a MasterItem,
    pub code_master: &'a Code,
    #[serde(rename = "type")]
    pub category: Category,
}


#[derive(Debug, Deserialize)]
pub struct HealthMessage {
    pub message: String,
}
