use super::*;

use serde_json::json;

use crate::element::Content;

fn counter_ids() -> Box<dyn IdSource + Send> {
    let mut next = 0_u32;
    Box::new(move || {
        next += 1;
        format!("el-{next}")
    })
}

fn session() -> BoardSession {
    BoardSession::new(counter_ids())
}

fn session_with(elements: Vec<Element>) -> BoardSession {
    let mut session = session();
    session.apply_remote_snapshot(elements);
    session
}

fn element_at(id: &str, x: f64, y: f64) -> Element {
    Element::seeded(id.to_owned(), ElementKind::Formula, x, y, "#FEF3C7".to_owned())
}

fn sized(id: &str, width: f64, height: f64) -> Element {
    let mut element = element_at(id, 0.0, 0.0);
    element.width = width;
    element.height = height;
    element
}

fn pt(x: f64, y: f64) -> PointerSample {
    PointerSample::new(x, y)
}

fn eid(name: &str) -> ElementId {
    name.to_owned()
}

// =============================================================
// Dragging
// =============================================================

#[test]
fn drag_moves_by_pointer_delta_from_anchor() {
    let mut session = session_with(vec![element_at("a", 100.0, 100.0)]);
    session.pointer_down(pt(50.0, 50.0), &eid("a"), HitTarget::Body);
    session.pointer_move(pt(80.0, 70.0));
    let action = session.frame_tick();
    assert_eq!(
        action,
        Some(Action::ElementUpdated {
            id: eid("a"),
            fields: ElementPatch::position(130.0, 120.0),
        })
    );
    let element = session.element(&eid("a")).unwrap();
    assert_eq!((element.x, element.y), (130.0, 120.0));
}

#[test]
fn drag_math_never_accumulates_across_moves() {
    let mut session = session_with(vec![element_at("a", 100.0, 100.0)]);
    session.pointer_down(pt(0.0, 0.0), &eid("a"), HitTarget::Body);
    for step in 1..=5 {
        let offset = f64::from(step) * 10.0;
        session.pointer_move(pt(offset, offset));
        session.frame_tick();
    }
    let element = session.element(&eid("a")).unwrap();
    assert_eq!((element.x, element.y), (150.0, 150.0));
}

#[test]
fn pointer_down_promotes_the_target() {
    let mut session = session_with(vec![element_at("a", 0.0, 0.0), element_at("b", 0.0, 0.0)]);
    session.pointer_down(pt(0.0, 0.0), &eid("a"), HitTarget::Body);
    assert!(session.rank(&eid("a")) > session.rank(&eid("b")));
}

#[test]
fn second_pointer_down_is_ignored_while_gesture_active() {
    let mut session = session_with(vec![element_at("a", 0.0, 0.0), element_at("b", 50.0, 50.0)]);
    session.pointer_down(pt(0.0, 0.0), &eid("a"), HitTarget::Body);
    session.pointer_down(pt(50.0, 50.0), &eid("b"), HitTarget::Body);
    assert_eq!(session.gesture().target(), Some(&eid("a")));
    // the losing down neither promoted nor anchored
    assert_eq!(session.rank(&eid("b")), 0);
    session.pointer_move(pt(10.0, 0.0));
    session.frame_tick();
    assert_eq!(session.element(&eid("a")).unwrap().x, 10.0);
    assert_eq!(session.element(&eid("b")).unwrap().x, 50.0);
}

#[test]
fn pointer_down_on_child_control_starts_nothing() {
    let mut session = session_with(vec![element_at("a", 0.0, 0.0)]);
    session.pointer_down(pt(0.0, 0.0), &eid("a"), HitTarget::Control);
    assert!(session.gesture().is_idle());
    assert_eq!(session.rank(&eid("a")), 0);
}

#[test]
fn pointer_down_on_unknown_id_is_ignored() {
    let mut session = session_with(vec![element_at("a", 0.0, 0.0)]);
    session.pointer_down(pt(0.0, 0.0), &eid("ghost"), HitTarget::Body);
    assert!(session.gesture().is_idle());
}

#[test]
fn pointer_move_without_gesture_is_a_noop() {
    let mut session = session_with(vec![element_at("a", 0.0, 0.0)]);
    session.pointer_move(pt(500.0, 500.0));
    assert_eq!(session.frame_tick(), None);
    assert_eq!(session.element(&eid("a")).unwrap().x, 0.0);
}

// =============================================================
// Resizing
// =============================================================

#[test]
fn resize_grows_from_anchor_size() {
    let mut session = session_with(vec![sized("a", 200.0, 150.0)]);
    session.pointer_down(pt(200.0, 150.0), &eid("a"), HitTarget::ResizeHandle);
    session.pointer_move(pt(260.0, 180.0));
    session.frame_tick();
    let element = session.element(&eid("a")).unwrap();
    assert_eq!((element.width, element.height), (260.0, 180.0));
}

#[test]
fn resize_clamps_to_floor_at_every_step() {
    let mut session = session_with(vec![sized("a", 200.0, 150.0)]);
    session.pointer_down(pt(0.0, 0.0), &eid("a"), HitTarget::ResizeHandle);
    for sample in [pt(-50.0, -10.0), pt(-120.0, -90.0), pt(-500.0, -500.0)] {
        session.pointer_move(sample);
        session.frame_tick();
        let element = session.element(&eid("a")).unwrap();
        assert!(element.width >= 100.0, "width fell below floor: {}", element.width);
        assert!(element.height >= 80.0, "height fell below floor: {}", element.height);
    }
    let element = session.element(&eid("a")).unwrap();
    assert_eq!((element.width, element.height), (100.0, 80.0));
}

#[test]
fn resize_handle_also_promotes() {
    let mut session = session_with(vec![element_at("a", 0.0, 0.0), element_at("b", 0.0, 0.0)]);
    session.pointer_down(pt(0.0, 0.0), &eid("b"), HitTarget::ResizeHandle);
    assert!(session.rank(&eid("b")) > session.rank(&eid("a")));
}

// =============================================================
// Coalescing and release
// =============================================================

#[test]
fn moves_coalesce_to_the_latest_only() {
    let mut session = session_with(vec![element_at("a", 0.0, 0.0)]);
    session.pointer_down(pt(0.0, 0.0), &eid("a"), HitTarget::Body);
    session.pointer_move(pt(10.0, 10.0));
    session.pointer_move(pt(20.0, 20.0));
    session.pointer_move(pt(30.0, 30.0));
    let action = session.frame_tick();
    assert_eq!(
        action,
        Some(Action::ElementUpdated {
            id: eid("a"),
            fields: ElementPatch::position(30.0, 30.0),
        })
    );
    // nothing left queued for the next frame
    assert_eq!(session.frame_tick(), None);
}

#[test]
fn pointer_up_flushes_pending_and_goes_idle() {
    let mut session = session_with(vec![element_at("a", 0.0, 0.0)]);
    session.pointer_down(pt(0.0, 0.0), &eid("a"), HitTarget::Body);
    session.pointer_move(pt(5.0, 5.0));
    let action = session.pointer_up();
    assert!(matches!(action, Some(Action::ElementUpdated { .. })));
    assert!(session.gesture().is_idle());
    assert_eq!(session.element(&eid("a")).unwrap().x, 5.0);
}

#[test]
fn pointer_up_without_movement_emits_nothing() {
    let mut session = session_with(vec![element_at("a", 0.0, 0.0)]);
    session.pointer_down(pt(0.0, 0.0), &eid("a"), HitTarget::Body);
    assert_eq!(session.pointer_up(), None);
    assert!(session.gesture().is_idle());
}

// =============================================================
// Remote snapshots
// =============================================================

#[test]
fn snapshot_inserts_unknown_ids() {
    let mut session = session();
    session.apply_remote_snapshot(vec![element_at("a", 0.0, 0.0)]);
    assert_eq!(session.len(), 1);
    assert!(session.element(&eid("a")).is_some());
}

#[test]
fn snapshot_removes_ids_it_omits() {
    let mut session = session_with(vec![element_at("a", 0.0, 0.0), element_at("b", 0.0, 0.0)]);
    session.apply_remote_snapshot(vec![element_at("b", 0.0, 0.0)]);
    assert_eq!(session.len(), 1);
    assert!(session.element(&eid("a")).is_none());
}

#[test]
fn snapshot_wins_over_local_optimistic_state() {
    let mut session = session_with(vec![element_at("a", 0.0, 0.0)]);
    session.update_element(&eid("a"), ElementPatch::position(500.0, 500.0));
    // a stale echo arrives reflecting the old position
    session.apply_remote_snapshot(vec![element_at("a", 0.0, 0.0)]);
    assert_eq!(session.element(&eid("a")).unwrap().x, 0.0);
}

#[test]
fn snapshot_forgets_ranks_of_dropped_ids() {
    let mut session = session_with(vec![element_at("a", 0.0, 0.0), element_at("b", 0.0, 0.0)]);
    session.pointer_down(pt(0.0, 0.0), &eid("a"), HitTarget::Body);
    session.pointer_up();
    assert_eq!(session.rank(&eid("a")), 1);
    session.apply_remote_snapshot(vec![element_at("b", 0.0, 0.0)]);
    assert_eq!(session.rank(&eid("a")), 0);
    assert_eq!(session.rank(&eid("b")), 0);
}

#[test]
fn vanished_gesture_target_drops_updates_silently() {
    let mut session = session_with(vec![element_at("a", 0.0, 0.0)]);
    session.pointer_down(pt(0.0, 0.0), &eid("a"), HitTarget::Body);
    session.apply_remote_snapshot(Vec::new());
    session.pointer_move(pt(10.0, 10.0));
    assert_eq!(session.frame_tick(), None);
    // the gesture itself survives until release
    assert_eq!(session.gesture().target(), Some(&eid("a")));
    assert_eq!(session.pointer_up(), None);
}

// =============================================================
// Local edits
// =============================================================

#[test]
fn create_seeds_defaults_and_returns_intent() {
    let mut session = session();
    let (id, action) =
        session.create_element(ElementKind::Formula, 10.0, 20.0, "#FEF3C7".to_owned(), serde_json::Map::new());
    assert_eq!(id, "el-1");
    let Action::ElementCreated(element) = action else {
        panic!("create must return the full record");
    };
    assert_eq!(element.id, "el-1");
    assert_eq!((element.x, element.y), (10.0, 20.0));
    assert_eq!((element.width, element.height), (224.0, 200.0));
    assert!(element.created_at.is_some());
    assert_eq!(session.len(), 1);
}

#[test]
fn create_merges_initial_fields() {
    let mut session = session();
    let mut fields = serde_json::Map::new();
    fields.insert("title".to_owned(), json!("Kinematics"));
    let (id, _) =
        session.create_element(ElementKind::Formula, 0.0, 0.0, "#DBEAFE".to_owned(), fields);
    let Content::Formula(payload) = &session.element(&id).unwrap().content else {
        panic!("created element has the wrong variant");
    };
    assert_eq!(payload.title, "Kinematics");
    assert_eq!(payload.latex, "F = ma");
}

#[test]
fn created_id_is_usable_before_the_echo() {
    let mut session = session();
    let (id, _) =
        session.create_element(ElementKind::Note, 0.0, 0.0, "#FCE7F3".to_owned(), serde_json::Map::new());
    let action = session.update_element(&id, ElementPatch::position(42.0, 42.0));
    assert!(action.is_some());
    assert_eq!(session.element(&id).unwrap().x, 42.0);
}

#[test]
fn update_merges_content_fields() {
    let mut session = session_with(vec![element_at("a", 0.0, 0.0)]);
    let mut fields = serde_json::Map::new();
    fields.insert("latex".to_owned(), json!("E = mc^2"));
    session.update_element(&eid("a"), ElementPatch::content(fields));
    let Content::Formula(payload) = &session.element(&eid("a")).unwrap().content else {
        panic!("element changed variant");
    };
    assert_eq!(payload.latex, "E = mc^2");
}

#[test]
fn update_unknown_id_returns_none() {
    let mut session = session();
    assert_eq!(session.update_element(&eid("ghost"), ElementPatch::position(0.0, 0.0)), None);
}

#[test]
fn delete_is_idempotent() {
    let mut session = session_with(vec![element_at("a", 0.0, 0.0)]);
    assert_eq!(session.delete_element(&eid("a")), Some(Action::ElementDeleted { id: eid("a") }));
    assert_eq!(session.delete_element(&eid("a")), None);
    assert!(session.is_empty());
}

#[test]
fn delete_drops_rank_and_pending_update() {
    let mut session = session_with(vec![element_at("a", 0.0, 0.0)]);
    session.pointer_down(pt(0.0, 0.0), &eid("a"), HitTarget::Body);
    session.pointer_move(pt(10.0, 10.0));
    session.delete_element(&eid("a"));
    assert_eq!(session.rank(&eid("a")), 0);
    assert_eq!(session.frame_tick(), None);
}

#[test]
fn clear_board_empties_everything() {
    let mut session = session_with(vec![element_at("a", 0.0, 0.0), element_at("b", 0.0, 0.0)]);
    session.pointer_down(pt(0.0, 0.0), &eid("a"), HitTarget::Body);
    session.pointer_up();
    let action = session.clear_board();
    assert_eq!(action, Action::BoardCleared);
    assert!(session.is_empty());
    assert_eq!(session.rank(&eid("a")), 0);
}

#[test]
fn switch_board_forces_gesture_idle_and_clears_state() {
    let mut session = session_with(vec![element_at("a", 0.0, 0.0)]);
    session.pointer_down(pt(0.0, 0.0), &eid("a"), HitTarget::Body);
    session.pointer_move(pt(10.0, 10.0));
    session.switch_board();
    assert!(session.gesture().is_idle());
    assert!(session.is_empty());
    assert_eq!(session.frame_tick(), None);
}

// =============================================================
// Queries and layout
// =============================================================

#[test]
fn current_elements_orders_unranked_by_id() {
    let session = session_with(vec![
        element_at("c", 0.0, 0.0),
        element_at("a", 0.0, 0.0),
        element_at("b", 0.0, 0.0),
    ]);
    let order: Vec<&str> = session.current_elements().iter().map(|(e, _)| e.id.as_str()).collect();
    assert_eq!(order, vec!["a", "b", "c"]);
}

#[test]
fn current_elements_puts_promoted_on_top() {
    let mut session = session_with(vec![
        element_at("a", 0.0, 0.0),
        element_at("b", 0.0, 0.0),
        element_at("c", 0.0, 0.0),
    ]);
    session.pointer_down(pt(0.0, 0.0), &eid("a"), HitTarget::Body);
    session.pointer_up();
    let ranked: Vec<(&str, i64)> = session
        .current_elements()
        .iter()
        .map(|(e, rank)| (e.id.as_str(), *rank))
        .collect();
    assert_eq!(ranked, vec![("b", 0), ("c", 0), ("a", 1)]);
}

#[test]
fn arrange_rows_places_groups_and_skips_unknown_ids() {
    let mut session = session_with(vec![
        element_at("a", 900.0, 900.0),
        element_at("b", 900.0, 900.0),
        element_at("c", 900.0, 900.0),
    ]);
    let groups = vec![vec![eid("a"), eid("ghost"), eid("b")], vec![eid("c")]];
    let actions = session.arrange_rows(&groups);
    assert_eq!(actions.len(), 3);
    let a = session.element(&eid("a")).unwrap();
    let b = session.element(&eid("b")).unwrap();
    let c = session.element(&eid("c")).unwrap();
    assert_eq!((a.x, a.y), (100.0, 100.0));
    assert_eq!((b.x, b.y), (600.0, 100.0));
    assert_eq!((c.x, c.y), (100.0, 350.0));
}
