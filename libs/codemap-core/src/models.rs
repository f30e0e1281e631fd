//! Data models exchanged with the mapping backend

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A top-level medical code (e.g. a diagnosis code) being configured.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Code {
    pub id: i64,
    pub code: String,
}

/// A reference-list entry. Identity is `(category, id)`; the category is carried
/// by whoever holds the item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MasterItem {
    pub id: i64,
    pub text: String,
}

/// Master list a [`MasterItem`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Labs,
    PhysicalExam,
    Treatment,
    Medications,
    MustRequiredCondition,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 5] = [
        Category::Labs,
        Category::PhysicalExam,
        Category::Treatment,
        Category::Medications,
        Category::MustRequiredCondition,
    ];

    /// Categories that can be mapped to codes and curated as master lists.
    pub const MAPPABLE: [Category; 4] = [
        Category::Labs,
        Category::PhysicalExam,
        Category::Treatment,
        Category::Medications,
    ];

    /// Wire name, also used as the path segment and request `type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Labs => "labs",
            Category::PhysicalExam => "physicalExam",
            Category::Treatment => "treatment",
            Category::Medications => "medications",
            Category::MustRequiredCondition => "mustRequiredCondition",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Category::Labs => "Labs",
            Category::PhysicalExam => "Physical Exam",
            Category::Treatment => "Treatment",
            Category::Medications => "Medications",
            Category::MustRequiredCondition => "Must Required Condition",
        }
    }

    /// Labs carry relationship/bounds/unit qualifiers on their mappings.
    pub fn shows_additional_fields(&self) -> bool {
        matches!(self, Category::Labs)
    }

    /// `mustRequiredCondition` selections are always recorded with frequency 1.
    pub fn has_frequency_counter(&self) -> bool {
        !matches!(self, Category::MustRequiredCondition)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::validation(format!("Unknown category: {s}")))
    }
}

/// Display title for the `categoryType` values stored on submitted groups.
pub fn category_type_title(category_type: &str) -> &str {
    match category_type {
        "LabData" => "Labs",
        "PhysicalExam" => "Physical Exam",
        "TreatmentPlan" => "Treatment",
        "Medications" => "Medications",
        other => other,
    }
}

/// A master item chosen for the current code, not yet submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedItem {
    pub id: i64,
    pub text: String,
    pub source_table: Category,
    pub frequency: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
}

impl SelectedItem {
    pub fn key(&self) -> SelectionKey {
        SelectionKey {
            category: self.source_table,
            id: self.id,
        }
    }
}

/// Identity of a selection within the selection set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionKey {
    pub category: Category,
    pub id: i64,
}

/// One row of a previously submitted group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MajorMaster {
    pub id: i64,
    pub group_id: i64,
    pub category_type: String,
    pub category_id: i64,
    pub code_id: i64,
    pub frequency: u32,
    #[serde(default)]
    pub text: Option<String>,
}

/// A previously submitted batch of selections for one code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeGroup {
    pub group_id: i64,
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub major_masters: Vec<MajorMaster>,
}

/// CUI attached to a (master item, code, category) triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuiDetails {
    pub cui: String,
    pub text: String,
    pub cui_type: String,
}

/// CUI resolved from a master item's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextToCui {
    pub id: i64,
    pub cui: String,
    pub text: String,
    pub cui_type: String,
}

/// Persisted mapping as returned by the mapping lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MappingRow {
    pub code: String,
    pub cui: String,
    pub text: String,
    pub cui_type: String,
    pub unit: Option<String>,
    pub value1: Option<String>,
    pub value2: Option<String>,
    pub code_id: i64,
    pub master_id: i64,
    pub relationship: Option<String>,
}

/// `{success, message?}` acknowledgement used by group submission and deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Acknowledgement {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Comparison between a lab value and the mapping bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Relationship {
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "between")]
    Between,
    #[default]
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl Relationship {
    pub const ALL: [Relationship; 6] = [
        Relationship::LessThan,
        Relationship::GreaterThan,
        Relationship::LessOrEqual,
        Relationship::GreaterOrEqual,
        Relationship::Between,
        Relationship::NotApplicable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::LessThan => "<",
            Relationship::GreaterThan => ">",
            Relationship::LessOrEqual => "<=",
            Relationship::GreaterOrEqual => ">=",
            Relationship::Between => "between",
            Relationship::NotApplicable => "N/A",
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Relationship {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Relationship::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::validation(format!("Unknown relationship: {s}")))
    }
}

/// Body of a mapping-creation request. The qualifier fields are `null` unless the
/// category shows additional fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingPayload {
    pub master_data_item: MasterItem,
    pub code_master: Code,
    pub relationship: Option<Relationship>,
    pub value1: Option<String>,
    pub value2: Option<String>,
    pub unit: Option<String>,
    pub except_value: Option<String>,
    pub comment: Option<String>,
}
