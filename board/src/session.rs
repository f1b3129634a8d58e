//! Per-board session: the facade the UI talks to.
//!
//! DESIGN
//! ======
//! One `BoardSession` exists per opened board and owns all per-board state:
//! the element mirror, the stack order, the active gesture, and the single
//! pending geometry write. Everything here is synchronous and runs on one
//! thread; cross-client concurrency is the document store's problem.
//!
//! Local mutations apply optimistically and return an [`Action`] describing
//! the one store write the host must perform. The host never reports
//! failures back into the session: a failed persist leaves the optimistic
//! state in place and surfaces on the host's error channel only. Remote
//! snapshots come back through [`BoardSession::apply_remote_snapshot`] and
//! replace the element set outright, even when they are staler than local
//! optimistic writes.
//!
//! Pointer moves never write geometry directly. Each move supersedes the
//! pending update and [`BoardSession::frame_tick`] drains it, so the store
//! sees at most one geometry write per rendered frame.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{Map, Value};

use crate::arrange;
use crate::consts::{MIN_ELEMENT_HEIGHT, MIN_ELEMENT_WIDTH};
use crate::doc::ElementStore;
use crate::element::{Element, ElementId, ElementKind, ElementPatch};
use crate::input::{GestureState, HitTarget, PointerSample};
use crate::stack::StackOrder;

/// Source of fresh element ids, injected by the host.
///
/// Ids must be unique and usable before any corresponding write is
/// acknowledged by the document store (push-id semantics).
pub trait IdSource {
    /// Produce a fresh element id.
    fn generate(&mut self) -> ElementId;
}

impl<F> IdSource for F
where
    F: FnMut() -> ElementId,
{
    fn generate(&mut self) -> ElementId {
        self()
    }
}

/// A persist intent returned from a session mutation, for the host to
/// perform against the document store.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Write the full record at the element's collection key.
    ElementCreated(Element),
    /// Merge the patch fields into the element's record.
    ElementUpdated { id: ElementId, fields: ElementPatch },
    /// Delete the element's record.
    ElementDeleted { id: ElementId },
    /// Delete the whole element collection.
    BoardCleared,
}

/// Session state for one opened board.
pub struct BoardSession {
    doc: ElementStore,
    stack: StackOrder,
    gesture: GestureState,
    pending: Option<(ElementId, ElementPatch)>,
    ids: Box<dyn IdSource + Send>,
}

impl BoardSession {
    /// Create a session drawing fresh ids from `ids`.
    #[must_use]
    pub fn new(ids: Box<dyn IdSource + Send>) -> Self {
        Self {
            doc: ElementStore::new(),
            stack: StackOrder::new(),
            gesture: GestureState::Idle,
            pending: None,
            ids,
        }
    }

    // --- Remote feed ---

    /// Replace the element set with a remote snapshot. The snapshot wins
    /// outright, including over fresher local optimistic writes. Ranks of
    /// ids the snapshot dropped are forgotten; an active gesture stays, its
    /// updates no-op if the target vanished.
    pub fn apply_remote_snapshot(&mut self, elements: Vec<Element>) {
        self.doc.load_snapshot(elements);
        let gone: Vec<ElementId> = self
            .stack
            .ids()
            .filter(|id| self.doc.get(id).is_none())
            .cloned()
            .collect();
        for id in &gone {
            self.stack.forget(id);
        }
    }

    /// Reset all per-board state for a board switch. Any active gesture is
    /// forced idle.
    pub fn switch_board(&mut self) {
        self.doc.load_snapshot(Vec::new());
        self.stack.reset();
        self.gesture = GestureState::Idle;
        self.pending = None;
    }

    // --- Local edits ---

    /// Create an element with its kind's defaults at the given position,
    /// merging `fields` into the payload. The returned id is usable for
    /// updates immediately, before the store echoes the write back.
    pub fn create_element(
        &mut self,
        kind: ElementKind,
        x: f64,
        y: f64,
        color: String,
        fields: Map<String, Value>,
    ) -> (ElementId, Action) {
        let id = self.ids.generate();
        let mut element = Element::seeded(id.clone(), kind, x, y, color);
        element.created_at = Some(epoch_millis());
        if !fields.is_empty() {
            element.content.merge_fields(&fields);
        }
        self.doc.insert(element.clone());
        (id, Action::ElementCreated(element))
    }

    /// Optimistically apply a sparse update and return the persist intent.
    /// Updates for unknown ids are dropped with `None`; the element may
    /// have been deleted by another client mid-edit.
    pub fn update_element(&mut self, id: &ElementId, fields: ElementPatch) -> Option<Action> {
        if !self.doc.apply_patch(id, &fields) {
            return None;
        }
        Some(Action::ElementUpdated { id: id.clone(), fields })
    }

    /// Remove an element locally and return the deletion intent. Deleting
    /// an unknown id is a no-op.
    pub fn delete_element(&mut self, id: &ElementId) -> Option<Action> {
        self.doc.remove(id)?;
        self.stack.forget(id);
        if self.pending.as_ref().is_some_and(|(pending, _)| pending == id) {
            self.pending = None;
        }
        Some(Action::ElementDeleted { id: id.clone() })
    }

    /// Remove every element and reset the stack order. Returns the intent
    /// that clears the whole collection.
    pub fn clear_board(&mut self) -> Action {
        self.doc.load_snapshot(Vec::new());
        self.stack.reset();
        self.pending = None;
        Action::BoardCleared
    }

    /// Lay out elements in rows, one group per row, in the given order.
    /// Ids that are no longer present are skipped.
    pub fn arrange_rows(&mut self, groups: &[Vec<ElementId>]) -> Vec<Action> {
        let mut actions = Vec::new();
        for (id, patch) in arrange::row_layout(groups) {
            if let Some(action) = self.update_element(&id, patch) {
                actions.push(action);
            }
        }
        actions
    }

    // --- Pointer events ---

    /// Pointer-down over an element. Claims the gesture if none is active,
    /// captures the anchor, and promotes the target. Downs on interactive
    /// child controls, on unknown ids, or while a gesture is already active
    /// are ignored (first gesture wins until release).
    pub fn pointer_down(&mut self, at: PointerSample, id: &ElementId, target: HitTarget) {
        if !self.gesture.is_idle() {
            return;
        }
        let Some(element) = self.doc.get(id) else {
            return;
        };
        self.gesture = match target {
            HitTarget::Control => return,
            HitTarget::Body => GestureState::Dragging {
                id: id.clone(),
                anchor: at,
                origin_x: element.x,
                origin_y: element.y,
            },
            HitTarget::ResizeHandle => GestureState::Resizing {
                id: id.clone(),
                anchor: at,
                origin_width: element.width,
                origin_height: element.height,
            },
        };
        self.stack.promote(id);
    }

    /// Pointer movement. Computes the new geometry from the anchor and
    /// queues it; each move supersedes the previous pending update. No-op
    /// while idle.
    pub fn pointer_move(&mut self, at: PointerSample) {
        let pending = match &self.gesture {
            GestureState::Idle => return,
            GestureState::Dragging { id, anchor, origin_x, origin_y } => {
                let x = origin_x + (at.x - anchor.x);
                let y = origin_y + (at.y - anchor.y);
                (id.clone(), ElementPatch::position(x, y))
            }
            GestureState::Resizing { id, anchor, origin_width, origin_height } => {
                let width = (origin_width + (at.x - anchor.x)).max(MIN_ELEMENT_WIDTH);
                let height = (origin_height + (at.y - anchor.y)).max(MIN_ELEMENT_HEIGHT);
                (id.clone(), ElementPatch::size(width, height))
            }
        };
        self.pending = Some(pending);
    }

    /// Drain the coalesced geometry update. The host calls this once per
    /// rendered frame, so the store sees at most one geometry write per
    /// frame regardless of pointer event rate.
    pub fn frame_tick(&mut self) -> Option<Action> {
        let (id, patch) = self.pending.take()?;
        self.update_element(&id, patch)
    }

    /// End the active gesture, wherever the pointer is. Flushes any pending
    /// geometry update before going idle.
    pub fn pointer_up(&mut self) -> Option<Action> {
        let action = self.frame_tick();
        self.gesture = GestureState::Idle;
        action
    }

    // --- Queries ---

    /// All elements with their ranks, ordered bottom to top for rendering.
    /// Unranked elements come first, ties break by id.
    #[must_use]
    pub fn current_elements(&self) -> Vec<(&Element, i64)> {
        let mut items: Vec<(&Element, i64)> = self
            .doc
            .elements()
            .map(|element| (element, self.stack.rank(&element.id)))
            .collect();
        items.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.id.cmp(&b.0.id)));
        items
    }

    /// Look up an element by id.
    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.doc.get(id)
    }

    /// Current rank of an id; 0 when unranked.
    #[must_use]
    pub fn rank(&self, id: &ElementId) -> i64 {
        self.stack.rank(id)
    }

    /// The active gesture state.
    #[must_use]
    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    /// Number of elements on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.doc.len()
    }

    /// Returns `true` when the board has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doc.is_empty()
    }
}

fn epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
}
