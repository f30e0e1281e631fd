//! Mapping form: one master item + one code, with optional lab qualifiers

use tracing::{error, info};

use crate::api::MapperApi;
use crate::error::{Error, Result};
use crate::models::{Category, Code, CuiDetails, MappingPayload, MasterItem, Relationship};
use crate::selector::SearchableSelector;
use crate::workflows::load_pickers;

/// Free-text qualifiers a lab mapping carries. Values are opaque strings and are
/// never parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualifierFields {
    pub relationship: Relationship,
    pub value1: String,
    pub value2: String,
    pub unit: String,
    pub except_value: String,
    pub comment: String,
}

#[derive(Debug, Clone)]
pub struct MappingForm {
    category: Category,
    show_additional_fields: bool,
    pub items: SearchableSelector<MasterItem>,
    pub codes: SearchableSelector<Code>,
    fields: QualifierFields,
}

impl MappingForm {
    /// A form for `category`; qualifiers are shown when the category calls for them.
    pub fn new(category: Category) -> Self {
        Self::with_additional_fields(category, category.shows_additional_fields())
    }

    pub fn with_additional_fields(category: Category, show_additional_fields: bool) -> Self {
        Self {
            category,
            show_additional_fields,
            items: SearchableSelector::loading(),
            codes: SearchableSelector::loading(),
            fields: QualifierFields::default(),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn shows_additional_fields(&self) -> bool {
        self.show_additional_fields
    }

    /// Active only while both a master item and a code are selected.
    pub fn is_expanded(&self) -> bool {
        self.items.selection().is_some() && self.codes.selection().is_some()
    }

    /// Qualifiers as the user sees them: present only when the form is expanded
    /// and the category shows them.
    pub fn visible_fields(&self) -> Option<&QualifierFields> {
        (self.is_expanded() && self.show_additional_fields).then_some(&self.fields)
    }

    /// In-memory qualifier values, regardless of visibility.
    pub fn fields(&self) -> &QualifierFields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut QualifierFields {
        &mut self.fields
    }

    /// Fetch master items for the category and the code list concurrently.
    pub async fn load(&mut self, api: &dyn MapperApi) {
        load_pickers(api, self.category, &mut self.items, &mut self.codes).await;
    }

    pub fn build_payload(&self) -> Result<MappingPayload> {
        let (item, code) = self.selected_pair()?;
        let shown = |value: &str| self.show_additional_fields.then(|| value.to_string());
        Ok(MappingPayload {
            master_data_item: item.clone(),
            code_master: code.clone(),
            relationship: self
                .show_additional_fields
                .then_some(self.fields.relationship),
            value1: shown(&self.fields.value1),
            value2: shown(&self.fields.value2),
            unit: shown(&self.fields.unit),
            except_value: shown(&self.fields.except_value),
            comment: shown(&self.fields.comment),
        })
    }

    /// Create the mapping. On success the selections are cleared and the
    /// qualifiers reset; on failure the form is left as it was.
    pub async fn submit(&mut self, api: &dyn MapperApi) -> Result<()> {
        let payload = self.build_payload()?;
        match api.add_mapping(self.category, &payload).await {
            Ok(()) => {
                info!(
                    category = %self.category,
                    item_id = payload.master_data_item.id,
                    code_id = payload.code_master.id,
                    "Code mapping added"
                );
                self.reset_after_submit();
                Ok(())
            }
            Err(e) => {
                error!(category = %self.category, error = %e, "Failed to add code mapping");
                Err(e)
            }
        }
    }

    /// Post-submit reset. The relationship goes to `between`, not back to its
    /// initial `N/A`.
    pub fn reset_after_submit(&mut self) {
        self.items.clear();
        self.codes.clear();
        self.fields = QualifierFields {
            relationship: Relationship::Between,
            ..QualifierFields::default()
        };
    }

    /// CUIs attached to the selected item and code.
    pub async fn fetch_cuis(&self, api: &dyn MapperApi) -> Result<Vec<CuiDetails>> {
        let (item, code) = self.selected_pair()?;
        api.lookup_cuis(item, code, self.category)
            .await
            .inspect_err(|e| error!(category = %self.category, error = %e, "Failed to fetch CUIs"))
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
