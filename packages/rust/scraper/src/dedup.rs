//! Identity-keyed, insertion-ordered tender collection.
//!
//! One [`TenderSet`] is owned by the run orchestrator and passed by
//! mutable reference into each department traversal — single writer,
//! no locking. If department fetches are ever parallelized this must
//! become a concurrent map with an explicit last-wins tie-break.

use std::collections::HashMap;

use civicwatch_shared::Tender;

/// Result of inserting a tender into the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insert {
    /// The identity was previously unseen.
    New,
    /// The identity was already present; the new payload replaced the
    /// old one (last-observed-wins). `prior_dept` is the department
    /// that supplied the superseded payload.
    Superseded { prior_dept: String },
}

/// Deduplicating store keyed on the source-assigned tender id.
///
/// Iteration order is first-insertion order; a superseding payload
/// keeps its identity's original position. Re-inserting an identity
/// replaces the payload and never grows the set.
#[derive(Debug, Default)]
pub struct TenderSet {
    index: HashMap<String, usize>,
    items: Vec<Tender>,
    sources: Vec<String>,
}

impl TenderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` has been observed in this run.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Insert a tender observed while scraping `dept`.
    pub fn insert(&mut self, tender: Tender, dept: &str) -> Insert {
        match self.index.get(&tender.id) {
            Some(&pos) => {
                let prior_dept = std::mem::replace(&mut self.sources[pos], dept.to_string());
                self.items[pos] = tender;
                Insert::Superseded { prior_dept }
            }
            None => {
                self.index.insert(tender.id.clone(), self.items.len());
                self.items.push(tender);
                self.sources.push(dept.to_string());
                Insert::New
            }
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tender> {
        self.items.iter()
    }

    /// Consume the set, yielding records in insertion order.
    pub fn into_vec(self) -> Vec<Tender> {
        self.items
    }
}
