//! Error kinds of the progression engine.
//!
//! None of these reach engine callers: the engine logs them and keeps going
//! with its in-memory state.

#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error("Local storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Corrupt persisted state: {0}")]
    CorruptPersistedState(String),

    #[error("Remote sync failed: {0}")]
    SyncFailure(String),
}

impl From<ureq::Error> for ProgressError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, resp) => {
                let body = resp.into_string().unwrap_or_default();
                let body = body.trim();
                if body.is_empty() {
                    Self::SyncFailure(format!("HTTP {code}"))
                } else {
                    Self::SyncFailure(format!("HTTP {code}: {body}"))
                }
            }
            other => Self::SyncFailure(other.to_string()),
        }
    }
}
