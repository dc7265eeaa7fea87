//! Settings configuration types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::progress::{DEFAULT_API_URL, DEFAULT_STATE_KEY};

/// Where the state blob is kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Data directory (defaults to ~/.drp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Key of the state blob inside the store
    #[serde(default = "default_state_key")]
    pub key: String,
}

fn default_state_key() -> String {
    DEFAULT_STATE_KEY.to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: None,
            key: default_state_key(),
        }
    }
}

/// Remote sync backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// API root; `/users/{id}/gamification` is appended
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// User id used when push/pull are called without one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            user_id: None,
        }
    }
}
