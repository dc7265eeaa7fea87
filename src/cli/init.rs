//! Init command implementation

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use drp_progress::config::Config;

/// Default configuration content for drp-progress init
pub const DEFAULT_CONFIG: &str = r#"# DRP Learning Progress Configuration
# ===================================

# Local state storage
[storage]
# data_dir = "/path/to/data"     # defaults to ~/.drp
key = "drp_gamification"

# XP granted per action
[rewards]
complete_lesson = 50
watch_video = 20
quiz_pass = 100
quiz_pass_threshold = 80          # percent
streak_day = 15                   # bonus for extending the daily streak
complete_module = 200

# Remote sync (push/pull of the full state)
# DRP_API_URL overrides api_url
[sync]
api_url = "https://api.decentralizedrights.com/api/v1"
# user_id = "your-user-id"

# Topic tags of modules, used by topic badges.
# Tags: post, poat, ai, sdg, quantum
[modules]
# "my-module-id" = ["ai"]
"#;

/// Write a fresh config file
pub fn init_command(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Config::global_config_path);

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    if let Some(parent) = config_path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Created: {}", config_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses_to_defaults() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, Config::default());
    }
}
