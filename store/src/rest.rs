//! REST document store speaking the Firebase Realtime Database dialect.
//!
//! DESIGN
//! ======
//! Writes use the plain REST verbs: `PUT`, `PATCH`, and `DELETE` against
//! `{base}/{path}.json`. Subscriptions use the server's event-stream
//! protocol: a long-lived GET with `Accept: text/event-stream` whose `put`
//! and `patch` events are folded into a local mirror of the subscribed
//! subtree, and every applied event publishes the whole mirror to the
//! subscriber. Pure event parsing is split from I/O for testability.
//!
//! Each connection opens with a full `put` of the subtree, so the mirror is
//! rebuilt from scratch on reconnect; dropped connections retry with
//! exponential backoff.

#[cfg(test)]
#[path = "rest_test.rs"]
mod rest_test;

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header;
use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::push_id::PushIdGenerator;
use crate::{tree, DocumentStore, StoreError, Subscription};

const CONNECT_TIMEOUT_SECS: u64 = 10;
const RECONNECT_BACKOFF_START_MS: u64 = 1_000;
const RECONNECT_BACKOFF_CAP_MS: u64 = 10_000;

// =============================================================================
// CLIENT
// =============================================================================

pub struct RestStore {
    http: reqwest::Client,
    base_url: String,
    auth: Option<String>,
    ids: PushIdGenerator,
}

impl RestStore {
    /// Client for the database rooted at `base_url`, authenticating with
    /// `auth` as a query token when present.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(base_url: &str, auth: Option<String>) -> Result<Self, StoreError> {
        // Connect timeout only: subscriptions hold their connection open.
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            ids: PushIdGenerator::new(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        let canonical = tree::join(&tree::split_path(path));
        let mut url = format!("{}/{canonical}.json", self.base_url);
        if let Some(token) = &self.auth {
            url.push_str("?auth=");
            url.push_str(token);
        }
        url
    }

    // Rejections carry the store path, never the URL with its auth token.
    fn check(path: &str, response: &reqwest::Response) -> Result<(), StoreError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(StoreError::Rejected {
                path: path.to_string(),
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl DocumentStore for RestStore {
    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let response = self.http.put(self.endpoint(path)).json(&value).send().await?;
        Self::check(path, &response)
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError> {
        let response = self
            .http
            .patch(self.endpoint(path))
            .json(&Value::Object(fields))
            .send()
            .await?;
        Self::check(path, &response)
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        let response = self.http.delete(self.endpoint(path)).send().await?;
        Self::check(path, &response)
    }

    async fn subscribe(&self, path: &str) -> Result<Subscription, StoreError> {
        let (tx, mut rx) = watch::channel(Value::Null);
        let http = self.http.clone();
        let url = self.endpoint(path);
        tokio::spawn(stream_snapshots(http, url, path.to_string(), tx));

        // Hold the caller until the opening `put` lands, so the first value
        // the subscription yields is the store's actual current state.
        if rx.changed().await.is_err() {
            return Err(StoreError::StreamClosed);
        }
        Ok(Subscription::new(rx))
    }

    fn generate_id(&self, _parent_path: &str) -> String {
        self.ids.generate()
    }
}

// =============================================================================
// STREAMING
// =============================================================================

enum PumpExit {
    /// Subscriber dropped; the stream task is done.
    Closed,
    /// Connection ended or the server cancelled it; reconnect.
    Retry,
}

async fn stream_snapshots(http: reqwest::Client, url: String, path: String, tx: watch::Sender<Value>) {
    let mut backoff_ms = RECONNECT_BACKOFF_START_MS;
    loop {
        match open_stream(&http, &url).await {
            Ok(response) => {
                info!(%path, "event stream connected");
                backoff_ms = RECONNECT_BACKOFF_START_MS;
                if matches!(pump(response, &path, &tx).await, PumpExit::Closed) {
                    return;
                }
            }
            Err(error) => {
                warn!(error = %error, %path, "event stream connect failed");
            }
        }

        // EDGE: bail out promptly when the subscriber is gone instead of
        // sleeping out the backoff first.
        tokio::select! {
            () = tx.closed() => return,
            () = tokio::time::sleep(Duration::from_millis(backoff_ms)) => {}
        }
        backoff_ms = (backoff_ms * 2).min(RECONNECT_BACKOFF_CAP_MS);
    }
}

async fn open_stream(http: &reqwest::Client, url: &str) -> Result<reqwest::Response, reqwest::Error> {
    let response = http
        .get(url)
        .header(header::ACCEPT, "text/event-stream")
        .send()
        .await?;
    response.error_for_status()
}

/// Fold one connection's events into a mirror of the subscribed subtree,
/// publishing the whole mirror after every applied event.
async fn pump(response: reqwest::Response, path: &str, tx: &watch::Sender<Value>) -> PumpExit {
    let mut bytes = response.bytes_stream();
    let mut assembler = EventAssembler::default();
    let mut mirror = Value::Null;

    loop {
        let chunk = tokio::select! {
            () = tx.closed() => return PumpExit::Closed,
            chunk = bytes.next() => chunk,
        };
        let chunk = match chunk {
            Some(Ok(chunk)) => chunk,
            Some(Err(error)) => {
                warn!(error = %error, %path, "event stream broke");
                return PumpExit::Retry;
            }
            None => {
                info!(%path, "event stream ended");
                return PumpExit::Retry;
            }
        };

        for event in assembler.push_chunk(&chunk) {
            match apply_stream_event(&mut mirror, &event) {
                Ok(EventOutcome::Applied) => {
                    if tx.send(mirror.clone()).is_err() {
                        return PumpExit::Closed;
                    }
                }
                Ok(EventOutcome::Ignored) => {}
                Ok(EventOutcome::Reconnect) => {
                    info!(event = %event.name, %path, "server closed the stream");
                    return PumpExit::Retry;
                }
                Err(error) => {
                    warn!(error = %error, %path, "dropping malformed stream event");
                }
            }
        }
    }
}

// =============================================================================
// EVENT PARSING
// =============================================================================

/// One server-sent event: name plus raw data payload.
#[derive(Debug, PartialEq, Eq)]
struct StreamEvent {
    name: String,
    data: String,
}

/// Reassembles events from arbitrarily chunked stream bytes.
#[derive(Default)]
struct EventAssembler {
    pending: String,
    name: Option<String>,
    data: Vec<String>,
}

impl EventAssembler {
    fn push_chunk(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.pending.push_str(&String::from_utf8_lossy(chunk));
        let mut events = Vec::new();
        while let Some(end) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=end).collect();
            if let Some(event) = self.push_line(line.trim_end_matches(['\r', '\n'])) {
                events.push(event);
            }
        }
        events
    }

    // A blank line terminates the pending event; `event:` and `data:` fields
    // accumulate into it, anything else is ignored.
    fn push_line(&mut self, line: &str) -> Option<StreamEvent> {
        if line.is_empty() {
            let data = std::mem::take(&mut self.data).join("\n");
            let name = self.name.take()?;
            return Some(StreamEvent { name, data });
        }
        if let Some(rest) = line.strip_prefix("event:") {
            self.name = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("data:") {
            self.data.push(rest.strip_prefix(' ').unwrap_or(rest).to_string());
        }
        None
    }
}

enum EventOutcome {
    Applied,
    Ignored,
    Reconnect,
}

fn apply_stream_event(mirror: &mut Value, event: &StreamEvent) -> Result<EventOutcome, StoreError> {
    match event.name.as_str() {
        "put" => {
            let body = event_body(&event.data)?;
            tree::set(mirror, &body.path, body.data);
            Ok(EventOutcome::Applied)
        }
        "patch" => {
            let body = event_body(&event.data)?;
            let Value::Object(fields) = body.data else {
                return Err(StoreError::MalformedEvent(format!(
                    "patch data at {} is not an object",
                    body.path
                )));
            };
            tree::merge(mirror, &body.path, fields);
            Ok(EventOutcome::Applied)
        }
        "keep-alive" => Ok(EventOutcome::Ignored),
        "cancel" | "auth_revoked" => Ok(EventOutcome::Reconnect),
        other => {
            debug!(event = other, "ignoring unrecognized stream event");
            Ok(EventOutcome::Ignored)
        }
    }
}

struct EventBody {
    path: String,
    data: Value,
}

// `put` and `patch` payloads are `{"path": "/a/b", "data": <value>}`, the
// path relative to the subscribed subtree.
fn event_body(data: &str) -> Result<EventBody, StoreError> {
    let value: Value =
        serde_json::from_str(data).map_err(|error| StoreError::MalformedEvent(error.to_string()))?;
    let Some(body) = value.as_object() else {
        return Err(StoreError::MalformedEvent(format!(
            "event body is not an object: {data}"
        )));
    };
    let Some(event_path) = body.get("path").and_then(Value::as_str) else {
        return Err(StoreError::MalformedEvent(format!(
            "event body missing path: {data}"
        )));
    };
    Ok(EventBody {
        path: event_path.to_string(),
        data: body.get("data").cloned().unwrap_or(Value::Null),
    })
}
