//! Per-item frequency counter for one selection list

use std::collections::HashMap;

pub const MIN_FREQUENCY: u32 = 1;
pub const MAX_FREQUENCY: u32 = 20;
pub const DEFAULT_FREQUENCY: u32 = MIN_FREQUENCY;

/// Counter keyed by item id, clamped to `[MIN_FREQUENCY, MAX_FREQUENCY]`.
///
/// Items that were never touched read as [`DEFAULT_FREQUENCY`]. Out-of-range
/// adjustments are clamped, never rejected.
#[derive(Debug, Clone, Default)]
pub struct FrequencyCounter {
    counts: HashMap<i64, u32>,
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, item_id: i64) -> u32 {
        self.counts
            .get(&item_id)
            .copied()
            .unwrap_or(DEFAULT_FREQUENCY)
    }

    pub fn increment(&mut self, item_id: i64) -> u32 {
        self.adjust(item_id, 1)
    }

    pub fn decrement(&mut self, item_id: i64) -> u32 {
        self.adjust(item_id, -1)
    }

    /// Set an explicit value; it is clamped into range.
    pub fn set(&mut self, item_id: i64, value: i64) -> u32 {
        let clamped = clamp(value);
        self.counts.insert(item_id, clamped);
        clamped
    }

    pub fn adjust(&mut self, item_id: i64, delta: i64) -> u32 {
        let current = i64::from(self.get(item_id));
        self.set(item_id, current.saturating_add(delta))
    }

    pub fn reset(&mut self) {
        self.counts.clear();
    }
}

fn clamp(value: i64) -> u32 {
    // lossless: the clamped value fits in u32
    value.clamp(i64::from(MIN_FREQUENCY), i64::from(MAX_FREQUENCY)) as u32
}
