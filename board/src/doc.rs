//! In-memory element store: this client's mirror of the shared element
//! collection.
//!
//! The store holds exactly one element per id. Local optimistic edits and
//! remote snapshots both land here; a snapshot replaces the whole set
//! (remote always wins), while patches mutate single elements field by
//! field. Rendering order is decided elsewhere, by rank.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;

use crate::element::{Element, ElementId, ElementPatch};

/// In-memory store of elements, keyed by id.
pub struct ElementStore {
    elements: HashMap<ElementId, Element>,
}

impl ElementStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { elements: HashMap::new() }
    }

    /// Insert or replace an element. An existing element with the same id
    /// is overwritten.
    pub fn insert(&mut self, element: Element) {
        self.elements.insert(element.id.clone(), element);
    }

    /// Remove an element by id, returning it if it was present.
    pub fn remove(&mut self, id: &ElementId) -> Option<Element> {
        self.elements.remove(id)
    }

    /// Return a reference to an element by id.
    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Apply a sparse update to an existing element. Geometry and color
    /// apply field by field; payload edits merge into the kind content.
    /// Returns `false` if no element has this id.
    pub fn apply_patch(&mut self, id: &ElementId, patch: &ElementPatch) -> bool {
        let Some(element) = self.elements.get_mut(id) else {
            return false;
        };
        if let Some(x) = patch.x {
            element.x = x;
        }
        if let Some(y) = patch.y {
            element.y = y;
        }
        if let Some(width) = patch.width {
            element.width = width;
        }
        if let Some(height) = patch.height {
            element.height = height;
        }
        if let Some(ref color) = patch.color {
            element.color = color.clone();
        }
        if !patch.fields.is_empty() {
            element.content.merge_fields(&patch.fields);
        }
        true
    }

    /// Replace all elements with a full snapshot.
    pub fn load_snapshot(&mut self, elements: Vec<Element>) {
        self.elements.clear();
        for element in elements {
            self.elements.insert(element.id.clone(), element);
        }
    }

    /// Iterate over all elements in arbitrary order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// Number of elements currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the store contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Default for ElementStore {
    fn default() -> Self {
        Self::new()
    }
}
