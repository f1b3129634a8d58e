//! Path algebra over a JSON document tree.
//!
//! Firebase-style stores address data by slash-separated paths into one big
//! JSON value. Both store implementations share this module: the in-memory
//! store applies writes to its root with it, and the REST store folds stream
//! events into its local mirror with it.
//!
//! DESIGN
//! ======
//! Null and absent are the same state. Writing null deletes the subtree and
//! prunes any object left empty on the way back up, so a document never
//! accumulates hollow branches. The empty path addresses the root itself.

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;

use serde_json::{Map, Value};

/// Split a slash path into its segments, ignoring empty ones.
///
/// `"users/u1/boards"`, `"/users/u1/boards/"` and `"users//u1/boards"` all
/// yield the same segments; the empty path yields none.
#[must_use]
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Join path segments back into a canonical slash path.
#[must_use]
pub fn join(segments: &[&str]) -> String {
    segments.join("/")
}

/// Borrow the value at `path`, if present.
#[must_use]
pub fn get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut node = root;
    for segment in split_path(path) {
        node = node.as_object()?.get(segment)?;
    }
    Some(node)
}

/// Owned copy of the value at `path`; null when absent.
#[must_use]
pub fn snapshot(root: &Value, path: &str) -> Value {
    get(root, path).cloned().unwrap_or(Value::Null)
}

/// Replace the value at `path`, creating intermediate objects as needed.
///
/// Writing null (or into a null that leaves nothing behind) deletes the
/// subtree and prunes empty parent objects. The empty path replaces the
/// whole root.
pub fn set(root: &mut Value, path: &str, value: Value) {
    let segments = split_path(path);
    if segments.is_empty() {
        *root = normalized(value);
        return;
    }
    set_at(root, &segments, value);
}

/// Merge fields into the object at `path`; null fields delete their keys.
///
/// Non-object values at `path` are displaced by the merged fields.
pub fn merge(root: &mut Value, path: &str, fields: Map<String, Value>) {
    let base = split_path(path);
    for (key, value) in fields {
        let mut segments = base.clone();
        segments.push(&key);
        set_at(root, &segments, value);
    }
}

/// Whether one path is a prefix of the other (or they are equal).
///
/// A write at `a` changes the value visible at `b` exactly when this holds.
#[must_use]
pub fn paths_intersect(a: &str, b: &str) -> bool {
    let a = split_path(a);
    let b = split_path(b);
    let shared = a.len().min(b.len());
    a[..shared] == b[..shared]
}

// Recursive worker behind `set` and `merge`. Returns true when the write
// left `node` empty and the caller should prune it.
fn set_at(node: &mut Value, segments: &[&str], value: Value) -> bool {
    let Some((head, rest)) = segments.split_first() else {
        *node = normalized(value);
        return node.is_null();
    };
    if !node.is_object() {
        if value.is_null() {
            // Deleting inside a leaf or absent branch is a no-op.
            return node.is_null();
        }
        *node = Value::Object(Map::new());
    }
    let Some(map) = node.as_object_mut() else {
        return false;
    };
    let child = map.entry((*head).to_string()).or_insert(Value::Null);
    if set_at(child, rest, value) {
        map.remove(*head);
    }
    if map.is_empty() {
        *node = Value::Null;
        return true;
    }
    false
}

// Empty objects count as deletions, matching the store's null-equals-absent
// model.
fn normalized(value: Value) -> Value {
    match value {
        Value::Object(map) if map.is_empty() => Value::Null,
        other => other,
    }
}
