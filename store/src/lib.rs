//! Document-store collaborators for SnapBoard.
//!
//! The board core treats persistence as an external collaborator with a
//! minimal contract: path-addressed writes, merges, and deletes, plus
//! subscriptions that deliver the full current value of a subtree on every
//! change. This crate defines that contract ([`DocumentStore`]) and ships
//! two implementations: an in-process [`memory::MemoryStore`] for tests and
//! demos, and [`rest::RestStore`] speaking the Firebase Realtime Database
//! REST and event-stream dialect.
//!
//! SYSTEM CONTEXT
//! ==============
//! The store is the only thing serializing concurrent writes from different
//! clients; last write wins per field. Subscriptions are at-least-once with
//! no ordering guarantee relative to local writes, and intermediate values
//! may be coalesced; the latest value always arrives.


pub mod memory;
pub mod push_id;
pub mod rest;
pub mod tree;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::watch;

/// Failures surfaced by store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("store rejected {path}: status {status}")]
    Rejected { path: String, status: u16 },
    #[error("event stream closed before delivering a snapshot")]
    StreamClosed,
    #[error("malformed stream event: {0}")]
    MalformedEvent(String),
}

/// Path-addressed document store with whole-subtree subscriptions.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Replace the value at `path`. Writing null deletes the subtree.
    ///
    /// # Errors
    ///
    /// Returns an error when the store rejects or never receives the write;
    /// the caller's optimistic state is its own concern.
    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Merge fields into the object at `path`; a null value deletes its key.
    ///
    /// # Errors
    ///
    /// Returns an error when the store rejects or never receives the merge.
    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError>;

    /// Delete the subtree at `path`. Deleting an absent path succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error when the store rejects or never receives the delete.
    async fn delete(&self, path: &str) -> Result<(), StoreError>;

    /// Observe the full value at `path` on every change.
    ///
    /// # Errors
    ///
    /// Returns an error when the subscription cannot be established.
    async fn subscribe(&self, path: &str) -> Result<Subscription, StoreError>;

    /// Fresh unique child id under `parent_path`, generated client-side and
    /// usable before any corresponding write is acknowledged.
    fn generate_id(&self, parent_path: &str) -> String;
}

/// Live view of one subscribed subtree.
///
/// The first [`Subscription::next`] resolves immediately with the value the
/// store held at subscribe time; each later call resolves once the value
/// changes again. Intermediate values may be coalesced.
pub struct Subscription {
    rx: watch::Receiver<Value>,
    primed: bool,
}

impl Subscription {
    /// Wrap a watch receiver fed by a store implementation.
    #[must_use]
    pub fn new(rx: watch::Receiver<Value>) -> Self {
        Self { rx, primed: false }
    }

    /// The next snapshot of the subscribed subtree, or `None` once the
    /// store side has gone away.
    pub async fn next(&mut self) -> Option<Value> {
        if self.primed {
            if self.rx.changed().await.is_err() {
                return None;
            }
        } else {
            self.primed = true;
        }
        Some(self.rx.borrow_and_update().clone())
    }
}
