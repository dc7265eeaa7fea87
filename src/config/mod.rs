//! Configuration loading and management

mod io;
mod settings;

pub use settings::{StorageSettings, SyncSettings};

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::progress::{
    FileStore, ModuleTopics, ProgressionEngine, RemoteSync, StatePersistence, TopicTag, XpRules,
};

/// Environment variable overriding `sync.api_url`
pub const API_URL_ENV: &str = "DRP_API_URL";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Local state storage
    #[serde(default)]
    pub storage: StorageSettings,

    /// XP amounts per action
    #[serde(default)]
    pub rewards: XpRules,

    /// Remote sync backend
    #[serde(default)]
    pub sync: SyncSettings,

    /// Extra module -> topic assignments, merged over the built-in table
    #[serde(default)]
    pub modules: BTreeMap<String, Vec<TopicTag>>,
}

impl Config {
    /// Directory holding the state blob
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(Self::global_config_dir)
    }

    /// Built-in topic table with configured assignments on top
    pub fn module_topics(&self) -> ModuleTopics {
        let mut topics = ModuleTopics::default();
        topics.extend(
            self.modules
                .iter()
                .map(|(module, tags)| (module.clone(), tags.clone())),
        );
        topics
    }

    pub fn remote_sync(&self) -> RemoteSync {
        RemoteSync::with_url(self.sync.api_url.clone())
    }

    /// Apply environment overrides from a lookup function
    pub fn apply_env_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.sync.api_url = url.trim().to_string();
        }
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_from(|key| std::env::var(key).ok());
    }

    /// Engine backed by the configured file store
    pub fn open_engine(&self) -> ProgressionEngine {
        let store = FileStore::new(self.data_dir());
        let persistence = StatePersistence::with_key(Box::new(store), self.storage.key.clone());
        ProgressionEngine::new(persistence)
            .with_rules(self.rewards.clone())
            .with_topics(self.module_topics())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.rewards.streak_day, 15);
        assert_eq!(config.storage.key, "drp_gamification");
        assert_eq!(config.sync.api_url, crate::progress::DEFAULT_API_URL);
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
            [rewards]
            complete_module = 500

            [storage]
            data_dir = "/var/lib/drp"

            [modules]
            "llm-basics" = ["ai"]
            "green-ledgers" = ["sdg", "quantum"]
            "#,
        )
        .unwrap();

        assert_eq!(config.rewards.complete_module, 500);
        assert_eq!(config.rewards.complete_lesson, 50);
        assert_eq!(config.data_dir(), PathBuf::from("/var/lib/drp"));

        let topics = config.module_topics();
        assert!(topics.has_topic("llm-basics", TopicTag::Ai));
        assert!(topics.has_topic("green-ledgers", TopicTag::Quantum));
        assert!(topics.has_topic("post-module", TopicTag::Post));
    }

    #[test]
    fn test_unknown_topic_is_rejected() {
        let result: Result<Config, _> = toml::from_str(
            r#"
            [modules]
            "x" = ["astrology"]
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_env_override() {
        let mut config = Config::default();
        config.apply_env_overrides_from(|key| {
            (key == API_URL_ENV).then(|| " http://localhost:8080/api/v1 ".to_string())
        });
        assert_eq!(config.sync.api_url, "http://localhost:8080/api/v1");

        config.apply_env_overrides_from(|_| Some(String::new()));
        assert_eq!(config.sync.api_url, "http://localhost:8080/api/v1");
    }
}
