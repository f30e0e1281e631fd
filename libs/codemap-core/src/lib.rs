//! Medical code curation core
//!
//! State machines and workflows for picking a medical code, curating the master
//! lists (labs, physical exams, treatments, medications) and recording mappings
//! between master items and codes.
//!
//! - [`selector`]: searchable single-item picker.
//! - [`frequency`]: bounded per-item frequency counter.
//! - [`selection`]: the selection set for one code, grouped by category.
//! - [`mapping_form`]: master item + code mapping form with lab qualifiers.
//! - [`workflows`]: the above driven against a [`MapperApi`].
//!
//! # Example
//!
//! ```rust
//! use codemap_core::{Category, MasterItem, SelectionAggregator, Toggle};
//!
//! let mut selection = SelectionAggregator::new();
//! let cbc = MasterItem { id: 5, text: "CBC".into() };
//! selection.counter(Category::Labs).set(5, 3);
//!
//! assert_eq!(selection.select(&cbc, Category::Labs), Toggle::Added { frequency: 3 });
//! assert_eq!(selection.select(&cbc, Category::Labs), Toggle::Removed);
//! ```

pub mod api;
pub mod error;
pub mod frequency;
pub mod mapping_form;
pub mod models;
pub mod selection;
pub mod selector;
pub mod workflows;

pub use api::MapperApi;
pub use error::{Error, Result};
pub use frequency::FrequencyCounter;
pub use mapping_form::{MappingForm, QualifierFields};
pub use models::{
    category_type_title, Acknowledgement, Category, Code, CodeGroup, CuiDetails, MajorMaster,
    MappingPayload, MappingRow, MasterItem, Relationship, SelectedItem, SelectionKey, TextToCui,
};
pub use selection::{CategoryGroup, SelectionAggregator, Toggle};
pub use selector::{filter_candidates, DropdownView, SearchableSelector, Selectable, SelectionChange};
pub use workflows::{
    add_code, load_code_data, CodeData, CodeGroupsView, DataMappingSession, MappingViewer,
    MasterCuration, PendingDeletion, SubmissionReceipt,
};
