//! In-process document store.
//!
//! Holds one JSON document behind an async mutex and notifies subscribers
//! whose paths intersect each write. Used by tests and the offline CLI mode;
//! it honors the same contract as the REST store, including null-equals-
//! absent and whole-subtree snapshots on every change.

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::{watch, Mutex};

use crate::push_id::PushIdGenerator;
use crate::{tree, DocumentStore, StoreError, Subscription};

pub struct MemoryStore {
    inner: Mutex<Inner>,
    ids: PushIdGenerator,
}

struct Inner {
    root: Value,
    watchers: Vec<Watcher>,
}

struct Watcher {
    path: String,
    tx: watch::Sender<Value>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                root: Value::Null,
                watchers: Vec::new(),
            }),
            ids: PushIdGenerator::new(),
        }
    }

    /// Current value at `path`; null when absent.
    pub async fn current(&self, path: &str) -> Value {
        let inner = self.inner.lock().await;
        tree::snapshot(&inner.root, path)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        tree::set(&mut inner.root, path, value);
        broadcast(&mut inner, path);
        Ok(())
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        tree::merge(&mut inner.root, path, fields);
        broadcast(&mut inner, path);
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        self.write(path, Value::Null).await
    }

    async fn subscribe(&self, path: &str) -> Result<Subscription, StoreError> {
        let mut inner = self.inner.lock().await;
        let (tx, rx) = watch::channel(tree::snapshot(&inner.root, path));
        inner.watchers.push(Watcher {
            path: path.to_string(),
            tx,
        });
        Ok(Subscription::new(rx))
    }

    fn generate_id(&self, _parent_path: &str) -> String {
        self.ids.generate()
    }
}

// Re-snapshot every watcher whose subtree the write could have touched,
// dropping watchers whose receivers are gone.
fn broadcast(inner: &mut Inner, changed_path: &str) {
    let Inner { root, watchers } = inner;
    watchers.retain(|watcher| {
        if !tree::paths_intersect(&watcher.path, changed_path) {
            return true;
        }
        watcher.tx.send(tree::snapshot(root, &watcher.path)).is_ok()
    });
}
