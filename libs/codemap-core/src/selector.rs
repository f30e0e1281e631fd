//! Searchable single-item selector
//!
//! A [`SearchableSelector`] picks one record out of a candidate list by
//! case-insensitive substring match on the record's display text. It is a
//! two-mode state machine:
//!
//! - [`SelectorMode::Browsing`]: free text, no selection.
//! - [`SelectorMode::Selected`]: the text mirrors the selection and cannot be
//!   edited; typing first clears the selection and drops back to browsing.
//!
//! The dropdown's open/closed state and the loading flag are tracked separately
//! from the mode, and [`SearchableSelector::view`] derives what the dropdown shows.

use crate::models::{Code, MasterItem};

/// A record that can be offered by a [`SearchableSelector`].
pub trait Selectable: Clone {
    /// Text the filter matches against and the input shows once selected.
    fn display_text(&self) -> &str;

    /// Stable identity within the candidate list.
    fn key(&self) -> i64;
}

impl Selectable for Code {
    fn display_text(&self) -> &str {
        &self.code
    }

    fn key(&self) -> i64 {
        self.id
    }
}

impl Selectable for MasterItem {
    fn display_text(&self) -> &str {
        &self.text
    }

    fn key(&self) -> i64 {
        self.id
    }
}

/// Case-insensitive substring filter over the full candidate list.
///
/// An empty query returns every candidate.
pub fn filter_candidates<'a, T: Selectable>(candidates: &'a [T], query: &str) -> Vec<&'a T> {
    let needle = query.to_lowercase();
    candidates
        .iter()
        .filter(|c| c.display_text().to_lowercase().contains(&needle))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorMode<T> {
    Browsing { query: String },
    Selected(T),
}

/// Change in selection emitted by a selector interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange<T> {
    Selected(T),
    Cleared,
}

/// What the open dropdown renders.
#[derive(Debug, PartialEq, Eq)]
pub enum DropdownView<'a, T> {
    Closed,
    Loading,
    NoResults,
    Results(Vec<&'a T>),
}

#[derive(Debug, Clone)]
pub struct SearchableSelector<T: Selectable> {
    candidates: Vec<T>,
    mode: SelectorMode<T>,
    open: bool,
    loading: bool,
}

impl<T: Selectable> Default for SearchableSelector<T> {
    fn default() -> Self {
        Self::loading()
    }
}

impl<T: Selectable> SearchableSelector<T> {
    pub fn new(candidates: Vec<T>) -> Self {
        Self {
            candidates,
            mode: SelectorMode::Browsing {
                query: String::new(),
            },
            open: false,
            loading: false,
        }
    }

    /// A selector whose candidates are still being fetched.
    pub fn loading() -> Self {
        Self {
            loading: true,
            ..Self::new(Vec::new())
        }
    }

    /// Build a selector with an initial selection. A selection that is not
    /// among the candidates is ignored.
    pub fn with_selection(candidates: Vec<T>, current: Option<T>) -> Self {
        let mut selector = Self::new(candidates);
        if let Some(item) = current {
            selector.set_selection(Some(item));
        }
        selector
    }

    pub fn candidates(&self) -> &[T] {
        &self.candidates
    }

    pub fn mode(&self) -> &SelectorMode<T> {
        &self.mode
    }

    pub fn selection(&self) -> Option<&T> {
        match &self.mode {
            SelectorMode::Selected(item) => Some(item),
            SelectorMode::Browsing { .. } => None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Text shown in the input: the selection's display text, or the query.
    pub fn text(&self) -> &str {
        match &self.mode {
            SelectorMode::Selected(item) => item.display_text(),
            SelectorMode::Browsing { query } => query,
        }
    }

    /// Replace the candidate list and leave the loading state.
    ///
    /// A held selection is swapped for the new candidate with the same key, or
    /// cleared if there is none.
    pub fn set_candidates(&mut self, candidates: Vec<T>) -> Option<SelectionChange<T>> {
        self.candidates = candidates;
        self.loading = false;
        let Some(key) = self.selection().map(Selectable::key) else {
            return None;
        };
        match self.candidate(key).cloned() {
            Some(fresh) => {
                self.mode = SelectorMode::Selected(fresh);
                None
            }
            None => {
                self.mode = SelectorMode::Browsing {
                    query: String::new(),
                };
                Some(SelectionChange::Cleared)
            }
        }
    }

    /// Stop loading without candidates (the fetch failed).
    pub fn finish_loading(&mut self) {
        self.loading = false;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Focus or click on the input.
    pub fn open(&mut self) {
        self.open = true;
    }

    /// Interaction outside the component.
    pub fn dismiss(&mut self) {
        self.open = false;
    }

    /// Keystroke in the input. Editing while a selection exists clears it first.
    pub fn input(&mut self, text: &str) -> Option<SelectionChange<T>> {
        let had_selection = matches!(self.mode, SelectorMode::Selected(_));
        self.mode = SelectorMode::Browsing {
            query: text.to_string(),
        };
        had_selection.then_some(SelectionChange::Cleared)
    }

    /// Pick the candidate with `key`. Only candidates matching the current
    /// query can be picked; anything else leaves the selector unchanged.
    pub fn choose(&mut self, key: i64) -> Option<SelectionChange<T>> {
        let item = self
            .filtered()
            .into_iter()
            .find(|c| c.key() == key)
            .cloned()?;
        self.mode = SelectorMode::Selected(item.clone());
        self.open = false;
        Some(SelectionChange::Selected(item))
    }

    /// Back to browsing with empty text.
    pub fn clear(&mut self) -> Option<SelectionChange<T>> {
        let had_selection = matches!(self.mode, SelectorMode::Selected(_));
        self.mode = SelectorMode::Browsing {
            query: String::new(),
        };
        had_selection.then_some(SelectionChange::Cleared)
    }

    /// Set the selection from outside (e.g. a form reset). The candidate with
    /// `item`'s key is stored. Returns false when there is none.
    pub fn set_selection(&mut self, item: Option<T>) -> bool {
        match item {
            None => {
                self.clear();
                true
            }
            Some(item) => match self.candidate(item.key()).cloned() {
                Some(candidate) => {
                    self.mode = SelectorMode::Selected(candidate);
                    true
                }
                None => false,
            },
        }
    }

    /// Candidates matching the current query. While a selection is held the
    /// query is empty, so every candidate is listed.
    pub fn filtered(&self) -> Vec<&T> {
        let query = match &self.mode {
            SelectorMode::Browsing { query } => query.as_str(),
            SelectorMode::Selected(_) => "",
        };
        filter_candidates(&self.candidates, query)
    }

    pub fn view(&self) -> DropdownView<'_, T> {
        if !self.open {
            return DropdownView::Closed;
        }
        if self.loading {
            return DropdownView::Loading;
        }
        let results = self.filtered();
        if results.is_empty() {
            DropdownView::NoResults
        } else {
            DropdownView::Results(results)
        }
    }

    /// Resolve free-form user input to one candidate: an exact display match
    /// (case-insensitive), then a numeric key, then a unique filter hit.
    pub fn resolve(&mut self, input: &str) -> Option<SelectionChange<T>> {
        let input = input.trim();
        let exact = self
            .candidates
            .iter()
            .find(|c| c.display_text().eq_ignore_ascii_case(input))
            .map(Selectable::key);
        let by_key = input
            .parse::<i64>()
            .ok()
            .filter(|key| self.contains(*key));

        self.input(input);
        if let Some(key) = exact.or(by_key) {
            self.input("");
            return self.choose(key);
        }

        let hits = self.filtered();
        if hits.len() == 1 {
            let key = hits[0].key();
            return self.choose(key);
        }
        None
    }

    fn contains(&self, key: i64) -> bool {
        self.candidates.iter().any(|c| c.key() == key)
    }

    fn candidate(&self, key: i64) -> Option<&T> {
        self.candidates.iter().find(|c| c.key() == key)
    }
}
