//! Z-order bookkeeping for board elements.
//!
//! DESIGN
//! ======
//! Ranks are presentation state local to one client: never persisted, never
//! subscribed to, reset on board switch. Promotion assigns the running
//! maximum plus one, so the most recently promoted id always ranks strictly
//! above every other known id. When the running maximum reaches the ceiling,
//! the next promotion first compacts all ranks to a contiguous `1..N`
//! (ordered by prior rank, ties by id), which bounds rank growth without
//! ever reordering elements relative to each other. Ids with no entry rank
//! as 0, below everything promoted.

#[cfg(test)]
#[path = "stack_test.rs"]
mod stack_test;

use std::collections::HashMap;

use crate::consts::Z_RANK_CEILING;
use crate::element::ElementId;

/// Mapping from element id to z-rank, with bounded growth.
pub struct StackOrder {
    ranks: HashMap<ElementId, i64>,
    max_rank: i64,
    ceiling: i64,
}

impl StackOrder {
    /// Create an empty stack order with the standard ceiling.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ceiling(Z_RANK_CEILING)
    }

    /// Create an empty stack order that compacts once the running maximum
    /// reaches `ceiling`.
    #[must_use]
    pub fn with_ceiling(ceiling: i64) -> Self {
        Self { ranks: HashMap::new(), max_rank: 0, ceiling }
    }

    /// Bring an id to the front: assign it a rank strictly above every
    /// other known id. Returns the assigned rank.
    pub fn promote(&mut self, id: &ElementId) -> i64 {
        self.normalize_if_needed();
        self.max_rank += 1;
        self.ranks.insert(id.clone(), self.max_rank);
        self.max_rank
    }

    /// Compact ranks to a contiguous `1..N` when the running maximum has
    /// reached the ceiling. Relative order is preserved; ties on equal
    /// ranks break by id. Returns `true` if compaction ran.
    pub fn normalize_if_needed(&mut self) -> bool {
        if self.max_rank < self.ceiling {
            return false;
        }
        let mut order: Vec<(ElementId, i64)> = self.ranks.drain().collect();
        order.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        self.max_rank = 0;
        for (id, _) in order {
            self.max_rank += 1;
            self.ranks.insert(id, self.max_rank);
        }
        true
    }

    /// Drop an id's rank entry. Does not compact.
    pub fn forget(&mut self, id: &ElementId) {
        self.ranks.remove(id);
    }

    /// Clear all ranks and the running maximum.
    pub fn reset(&mut self) {
        self.ranks.clear();
        self.max_rank = 0;
    }

    /// Current rank of an id; 0 when unranked.
    #[must_use]
    pub fn rank(&self, id: &ElementId) -> i64 {
        self.ranks.get(id).copied().unwrap_or(0)
    }

    /// The running maximum rank.
    #[must_use]
    pub fn max_rank(&self) -> i64 {
        self.max_rank
    }

    /// Iterate over all ranked ids in arbitrary order.
    pub fn ids(&self) -> impl Iterator<Item = &ElementId> {
        self.ranks.keys()
    }

    /// Number of ranked ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Returns `true` if no id holds a rank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

impl Default for StackOrder {
    fn default() -> Self {
        Self::new()
    }
}
