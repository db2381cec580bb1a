//! Memoized row-height estimates keyed by item text.
//!
//! The estimate depends only on title and notes, so identical text reuses one
//! result. The cache is owned by the caller and passed in explicitly.

use std::collections::HashMap;

use crate::layout::row_height::{estimate, ItemLayout};
use crate::models::invoice::LineItem;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ItemTextKey {
    title: String,
    notes: Option<String>,
}

impl ItemTextKey {
    fn of(item: &LineItem) -> Self {
        Self {
            title: item.title.clone(),
            notes: item.notes.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct LayoutCache {
    entries: HashMap<ItemTextKey, ItemLayout>,
    hits: u64,
    misses: u64,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_estimate(&mut self, item: &LineItem) -> ItemLayout {
        let key = ItemTextKey::of(item);
        if let Some(layout) = self.entries.get(&key) {
            self.hits += 1;
            return *layout;
        }
        self.misses += 1;
        let layout = estimate(item);
        self.entries.insert(key, layout);
        layout
    }

    /// Layouts for `items`, in input order.
    pub fn estimate_all(&mut self, items: &[LineItem]) -> Vec<ItemLayout> {
        items.iter().map(|item| self.get_or_estimate(item)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
