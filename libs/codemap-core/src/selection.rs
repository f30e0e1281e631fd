//! Selection set for a single code
//!
//! Holds the (item, category, frequency) triples chosen for the current code
//! before they are submitted as a group. Entries are keyed by
//! [`SelectionKey`] so re-selecting the same `(category, id)` removes it.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::frequency::{FrequencyCounter, DEFAULT_FREQUENCY};
use crate::models::{Category, MasterItem, SelectedItem, SelectionKey};

/// Result of [`SelectionAggregator::select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added { frequency: u32 },
    Removed,
}

/// Entries of one category, in insertion order.
#[derive(Debug, PartialEq, Eq)]
pub struct CategoryGroup<'a> {
    pub category: Category,
    pub items: Vec<&'a SelectedItem>,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionAggregator {
    entries: Vec<SelectedItem>,
    keys: HashSet<SelectionKey>,
    counters: HashMap<Category, FrequencyCounter>,
}

impl SelectionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frequency counter for `category`'s list.
    pub fn counter(&mut self, category: Category) -> &mut FrequencyCounter {
        self.counters.entry(category).or_default()
    }

    /// Frequency a new selection in `category` would be recorded with.
    pub fn frequency_for(&self, item_id: i64, category: Category) -> u32 {
        if !category.has_frequency_counter() {
            return DEFAULT_FREQUENCY;
        }
        self.counters
            .get(&category)
            .map_or(DEFAULT_FREQUENCY, |c| c.get(item_id))
    }

    /// Add `item` under `category`, or remove it if that key is already selected.
    pub fn select(&mut self, item: &MasterItem, category: Category) -> Toggle {
        let key = SelectionKey {
            category,
            id: item.id,
        };
        if self.keys.contains(&key) {
            self.remove_key(key);
            return Toggle::Removed;
        }

        let frequency = self.frequency_for(item.id, category);
        self.keys.insert(key);
        self.entries.push(SelectedItem {
            id: item.id,
            text: item.text.clone(),
            source_table: category,
            frequency,
            client: None,
        });
        Toggle::Added { frequency }
    }

    /// Remove the entry for `(category, item.id)`. Returns whether one existed.
    pub fn remove(&mut self, item: &MasterItem, category: Category) -> bool {
        self.remove_key(SelectionKey {
            category,
            id: item.id,
        })
    }

    pub fn remove_key(&mut self, key: SelectionKey) -> bool {
        if !self.keys.remove(&key) {
            return false;
        }
        self.entries.retain(|entry| entry.key() != key);
        true
    }

    pub fn contains(&self, item_id: i64, category: Category) -> bool {
        self.keys.contains(&SelectionKey {
            category,
            id: item_id,
        })
    }

    /// Ids selected in `category`, in insertion order.
    pub fn selected_ids(&self, category: Category) -> Vec<i64> {
        self.entries
            .iter()
            .filter(|e| e.source_table == category)
            .map(|e| e.id)
            .collect()
    }

    pub fn items(&self) -> &[SelectedItem] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries grouped by category. Categories appear in the order their first
    /// entry was added.
    pub fn group_by_category(&self) -> Vec<CategoryGroup<'_>> {
        let mut groups: Vec<CategoryGroup<'_>> = Vec::new();
        for entry in &self.entries {
            match groups.iter_mut().find(|g| g.category == entry.source_table) {
                Some(group) => group.items.push(entry),
                None => groups.push(CategoryGroup {
                    category: entry.source_table,
                    items: vec![entry],
                }),
            }
        }
        groups
    }

    /// Every entry annotated with `client`. Fails without side effects when the
    /// set is empty or no client is chosen.
    pub fn build_submission(&self, client: Option<&str>) -> Result<Vec<SelectedItem>> {
        if self.entries.is_empty() {
            return Err(Error::validation("Please select at least one item"));
        }
        let client = client
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| Error::validation("Please select a client"))?;

        Ok(self
            .entries
            .iter()
            .map(|entry| SelectedItem {
                client: Some(client.to_string()),
                ..entry.clone()
            })
            .collect())
    }

    /// Drop every entry. Called once a submission attempt completes, whatever
    /// its outcome.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, text: &str) -> MasterItem {
        MasterItem {
            id,
            text: text.into(),
        }
    }

    #[test]
    fn select_records_the_category_counter() {
        let mut selection = SelectionAggregator::new();
        let cbc = item(5, "CBC");
        selection.counter(Category::Labs).set(5, 3);

        assert_eq!(
            selection.select(&cbc, Category::Labs),
            Toggle::Added { frequency: 3 }
        );
        assert_eq!(
            selection.items(),
            &[SelectedItem {
                id: 5,
                text: "CBC".into(),
                source_table: Category::Labs,
                frequency: 3,
                client: None,
            }]
        );

        assert_eq!(selection.select(&cbc, Category::Labs), Toggle::Removed);
        assert!(selection.is_empty());
    }

    #[test]
    fn same_id_in_different_categories_is_distinct() {
        let mut selection = SelectionAggregator::new();
        selection.select(&item(1, "Aspirin"), Category::Medications);
        selection.select(&item(1, "Glucose"), Category::Labs);
        assert_eq!(selection.len(), 2);
        assert!(selection.contains(1, Category::Labs));
        assert!(selection.contains(1, Category::Medications));
    }

    #[test]
    fn must_required_condition_ignores_the_counter() {
        let mut selection = SelectionAggregator::new();
        for _ in 0..5 {
            selection.counter(Category::MustRequiredCondition).increment(9);
        }
        assert_eq!(
            selection.select(&item(9, "Pregnancy"), Category::MustRequiredCondition),
            Toggle::Added { frequency: 1 }
        );
    }

    #[test]
    fn remove_is_unconditional_and_reports_presence() {
        let mut selection = SelectionAggregator::new();
        let x = item(2, "Chest X-ray");
        assert!(!selection.remove(&x, Category::PhysicalExam));
        selection.select(&x, Category::PhysicalExam);
        assert!(selection.remove(&x, Category::PhysicalExam));
        assert!(!selection.remove(&x, Category::PhysicalExam));
    }

    #[test]
    fn groups_follow_first_insertion_order() {
        let mut selection = SelectionAggregator::new();
        selection.select(&item(1, "a"), Category::Treatment);
        selection.select(&item(2, "b"), Category::Labs);
        selection.select(&item(3, "c"), Category::Treatment);

        let groups = selection.group_by_category();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, Category::Treatment);
        assert_eq!(
            groups[0].items.iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert_eq!(groups[1].category, Category::Labs);
        assert_eq!(selection.selected_ids(Category::Treatment), vec![1, 3]);
    }

    #[test]
    fn submission_requires_items_and_client() {
        let mut selection = SelectionAggregator::new();
        assert!(matches!(
            selection.build_submission(Some("City Clinic")),
            Err(Error::Validation(_))
        ));

        selection.select(&item(1, "a"), Category::Labs);
        assert!(matches!(selection.build_submission(None), Err(Error::Validation(_))));
        assert!(matches!(
            selection.build_submission(Some("  ")),
            Err(Error::Validation(_))
        ));

        let payload = selection.build_submission(Some("City Clinic")).unwrap();
        assert_eq!(payload[0].client.as_deref(), Some("City Clinic"));
        // building does not consume the set
        assert_eq!(selection.len(), 1);
    }
}
