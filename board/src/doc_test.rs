use super::*;
use crate::element::{Content, ElementKind};
use serde_json::json;

fn note(id: &str) -> Element {
    Element::seeded(id.to_owned(), ElementKind::Note, 10.0, 20.0, "#FCE7F3".to_owned())
}

// =============================================================
// Insert / remove / get
// =============================================================

#[test]
fn new_store_is_empty() {
    let store = ElementStore::new();
    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
}

#[test]
fn insert_then_get() {
    let mut store = ElementStore::new();
    store.insert(note("a"));
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(&"a".to_owned()).map(|e| e.x), Some(10.0));
}

#[test]
fn insert_overwrites_same_id() {
    let mut store = ElementStore::new();
    store.insert(note("a"));
    let mut replacement = note("a");
    replacement.x = 99.0;
    store.insert(replacement);
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(&"a".to_owned()).map(|e| e.x), Some(99.0));
}

#[test]
fn remove_returns_element_once() {
    let mut store = ElementStore::new();
    store.insert(note("a"));
    assert!(store.remove(&"a".to_owned()).is_some());
    assert!(store.remove(&"a".to_owned()).is_none());
    assert!(store.is_empty());
}

// =============================================================
// Patches
// =============================================================

#[test]
fn apply_patch_moves_geometry() {
    let mut store = ElementStore::new();
    store.insert(note("a"));
    assert!(store.apply_patch(&"a".to_owned(), &ElementPatch::position(130.0, 120.0)));
    let element = store.get(&"a".to_owned()).unwrap();
    assert_eq!(element.x, 130.0);
    assert_eq!(element.y, 120.0);
    // untouched fields stay
    assert_eq!(element.width, 224.0);
}

#[test]
fn apply_patch_resizes() {
    let mut store = ElementStore::new();
    store.insert(note("a"));
    assert!(store.apply_patch(&"a".to_owned(), &ElementPatch::size(300.0, 260.0)));
    let element = store.get(&"a".to_owned()).unwrap();
    assert_eq!(element.width, 300.0);
    assert_eq!(element.height, 260.0);
}

#[test]
fn apply_patch_recolors() {
    let mut store = ElementStore::new();
    store.insert(note("a"));
    let patch = ElementPatch { color: Some("#D1FAE5".to_owned()), ..Default::default() };
    assert!(store.apply_patch(&"a".to_owned(), &patch));
    assert_eq!(store.get(&"a".to_owned()).unwrap().color, "#D1FAE5");
}

#[test]
fn apply_patch_merges_content_fields() {
    let mut store = ElementStore::new();
    store.insert(note("a"));
    let mut fields = serde_json::Map::new();
    fields.insert("content".to_owned(), json!("buy milk"));
    assert!(store.apply_patch(&"a".to_owned(), &ElementPatch::content(fields)));
    let Content::Note(payload) = &store.get(&"a".to_owned()).unwrap().content else {
        panic!("note changed variant");
    };
    assert_eq!(payload.content, "buy milk");
}

#[test]
fn apply_patch_unknown_id_returns_false() {
    let mut store = ElementStore::new();
    assert!(!store.apply_patch(&"ghost".to_owned(), &ElementPatch::position(0.0, 0.0)));
}

// =============================================================
// Snapshots
// =============================================================

#[test]
fn load_snapshot_replaces_everything() {
    let mut store = ElementStore::new();
    store.insert(note("a"));
    store.insert(note("b"));
    store.load_snapshot(vec![note("b"), note("c")]);
    assert_eq!(store.len(), 2);
    assert!(store.get(&"a".to_owned()).is_none());
    assert!(store.get(&"c".to_owned()).is_some());
}

#[test]
fn load_snapshot_empty_clears() {
    let mut store = ElementStore::new();
    store.insert(note("a"));
    store.load_snapshot(Vec::new());
    assert!(store.is_empty());
}

#[test]
fn elements_iterates_all() {
    let mut store = ElementStore::new();
    store.insert(note("a"));
    store.insert(note("b"));
    let mut ids: Vec<&str> = store.elements().map(|e| e.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["a", "b"]);
}
