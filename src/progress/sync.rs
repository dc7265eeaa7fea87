//! Best-effort remote sync of the state blob.
//!
//! Push is fire-and-forget on a background thread. Pull can be awaited
//! (`fetch`) or polled (`spawn_pull`). Nothing here touches the engine's state
//! by itself; the owner decides when to apply a pulled blob.

use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use serde_json::Value;
use tracing::{debug, info, warn};

use super::error::ProgressError;

/// Default backend API root
pub const DEFAULT_API_URL: &str = "https://api.decentralizedrights.com/api/v1";

fn encode_url_path_segment(segment: &str) -> String {
    // RFC3986 unreserved = ALPHA / DIGIT / "-" / "." / "_" / "~"
    let mut out = String::with_capacity(segment.len());
    for &b in segment.as_bytes() {
        let is_unreserved =
            matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~');
        if is_unreserved {
            out.push(b as char);
        } else {
            out.push('%');
            out.push_str(&format!("{:02X}", b));
        }
    }
    out
}

/// Client for `/users/{id}/gamification`
#[derive(Clone)]
pub struct RemoteSync {
    base_url: String,
    client: ureq::Agent,
}

impl RemoteSync {
    pub fn new() -> Self {
        Self::with_url(DEFAULT_API_URL)
    }

    pub fn with_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: ureq::AgentBuilder::new().build(),
        }
    }

    pub fn endpoint(&self, user_id: &str) -> String {
        format!(
            "{}/users/{}/gamification",
            self.base_url,
            encode_url_path_segment(user_id)
        )
    }

    /// Upload the blob and wait for the answer
    pub fn push_blocking(&self, user_id: &str, blob: &Value) -> Result<(), ProgressError> {
        let url = self.endpoint(user_id);
        let body = serde_json::to_string(blob)
            .map_err(|e| ProgressError::SyncFailure(format!("Failed to serialize state: {e}")))?;
        self.client
            .post(&url)
            .set("Content-Type", "application/json")
            .send_string(&body)?;
        debug!("[progress:sync] Pushed state to {}", url);
        Ok(())
    }

    /// Upload the blob on a background thread. Failures are only logged.
    pub fn push(&self, user_id: &str, blob: Value) -> JoinHandle<()> {
        let this = self.clone();
        let user_id = user_id.to_string();
        thread::spawn(move || match this.push_blocking(&user_id, &blob) {
            Ok(()) => info!("[progress:sync] State pushed for user {}", user_id),
            Err(e) => warn!("[progress:sync] Push for user {} failed: {}", user_id, e),
        })
    }

    /// Download the remote blob. `Ok(None)` when the backend has none.
    pub fn fetch(&self, user_id: &str) -> Result<Option<Value>, ProgressError> {
        let url = self.endpoint(user_id);
        let response = match self.client.get(&url).call() {
            Ok(r) => r,
            Err(ureq::Error::Status(404, _)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let body = response
            .into_string()
            .map_err(|e| ProgressError::SyncFailure(format!("Failed to read response: {e}")))?;
        let value: Value = serde_json::from_str(&body)
            .map_err(|e| ProgressError::SyncFailure(format!("Failed to parse JSON: {e}")))?;
        if !value.is_object() {
            return Err(ProgressError::SyncFailure(
                "Remote state is not a JSON object".to_string(),
            ));
        }
        Ok(Some(value))
    }

    /// Start a download on a background thread
    pub fn spawn_pull(&self, user_id: &str) -> PendingPull {
        let (tx, rx) = channel();
        let this = self.clone();
        let user_id = user_id.to_string();
        thread::spawn(move || {
            let _ = tx.send(this.fetch(&user_id));
        });
        PendingPull { rx }
    }
}

impl Default for RemoteSync {
    fn default() -> Self {
        Self::new()
    }
}

/// State of a background pull
#[derive(Debug)]
pub enum PullStatus {
    Pending,
    Ready(Value),
    /// Backend has no state for this user
    Empty,
    Failed(ProgressError),
}

/// Download started by [`RemoteSync::spawn_pull`]
#[derive(Debug)]
pub struct PendingPull {
    rx: Receiver<Result<Option<Value>, ProgressError>>,
}

impl PendingPull {
    /// Non-blocking check. Once a final status was returned, later polls
    /// report `Failed`.
    pub fn poll(&self) -> PullStatus {
        match self.rx.try_recv() {
            Ok(result) => Self::status_of(result),
            Err(TryRecvError::Empty) => PullStatus::Pending,
            Err(TryRecvError::Disconnected) => {
                PullStatus::Failed(ProgressError::SyncFailure("pull already consumed".to_string()))
            }
        }
    }

    /// Block until the download finishes
    pub fn wait(self) -> PullStatus {
        match self.rx.recv() {
            Ok(result) => Self::status_of(result),
            Err(_) => PullStatus::Failed(ProgressError::SyncFailure(
                "pull worker exited without a result".to_string(),
            )),
        }
    }

    fn status_of(result: Result<Option<Value>, ProgressError>) -> PullStatus {
        match result {
            Ok(Some(value)) => PullStatus::Ready(value),
            Ok(None) => PullStatus::Empty,
            Err(e) => PullStatus::Failed(e),
        }
    }
}
