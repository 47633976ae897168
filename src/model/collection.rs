//! The ordered annotation collection and its derived label queries.

use std::collections::BTreeSet;

use super::ids::{ItemId, RegionId};
use super::item::Item;

/// An ordered set of annotated items.
///
/// Item order is user-significant and is the only order; every derived
/// query below walks items first, then each item's regions.
///
/// The collection is a value. Edits produce a next-state collection
/// (see [`with_label_renamed`](Collection::with_label_renamed)) and the
/// caller swaps it in wholesale, which is what makes snapshot undo in
/// [`History`](super::History) trivial.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Collection {
    /// Items in insertion order.
    pub items: Vec<Item>,
}

impl Collection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection from items, preserving their order.
    pub fn from_items(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the collection holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of regions across all items.
    pub fn region_count(&self) -> usize {
        self.items.iter().map(|item| item.regions.len()).sum()
    }

    /// Distinct labels in first-seen order (item order, then region order
    /// within each item).
    pub fn labels(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for item in &self.items {
            for region in &item.regions {
                if seen.insert(region.label.as_str()) {
                    out.push(region.label.clone());
                }
            }
        }
        out
    }

    /// Every region carrying `label`, as `(ItemId, RegionId)` pairs in
    /// item order then region order.
    pub fn label_index(&self, label: &str) -> Vec<(ItemId, RegionId)> {
        let mut out = Vec::new();
        for item in &self.items {
            for region in &item.regions {
                if region.label == label {
                    out.push((item.id, region.id));
                }
            }
        }
        out
    }

    /// Returns the next-state collection with every region labeled `old`
    /// relabeled to `new`. Ids, geometry, rasters, and ordering are
    /// untouched, so renaming back restores the original exactly.
    pub fn with_label_renamed(&self, old: &str, new: &str) -> Self {
        let mut next = self.clone();
        for item in &mut next.items {
            for region in &mut item.regions {
                if region.label == old {
                    region.label = new.to_owned();
                }
            }
        }
        next
    }
}
