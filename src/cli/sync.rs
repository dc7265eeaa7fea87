//! Remote push/pull commands

use anyhow::{anyhow, Result};

use drp_progress::config::Config;

fn resolve_user(config: &Config, user_id: Option<String>) -> Result<String> {
    user_id
        .or_else(|| config.sync.user_id.clone())
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| anyhow!("No user id given and sync.user_id is not configured"))
}

/// Upload the local state and wait for the background upload to finish
pub fn push_command(config: &Config, user_id: Option<String>) -> Result<()> {
    let user_id = resolve_user(config, user_id)?;
    let engine = config.open_engine();
    let sync = config.remote_sync();

    println!("Pushing state to {}", sync.endpoint(&user_id));
    if let Some(handle) = engine.push(&sync, &user_id) {
        // The CLI would otherwise exit before the upload thread runs
        if handle.join().is_err() {
            tracing::warn!("Push worker panicked");
        }
    }

    Ok(())
}

/// Merge the remote state into the local one
pub fn pull_command(config: &Config, user_id: Option<String>) -> Result<()> {
    let user_id = resolve_user(config, user_id)?;
    let mut engine = config.open_engine();
    let sync = config.remote_sync();

    if engine.pull(&sync, &user_id) {
        println!("Merged remote state: {} XP, level {}", engine.xp(), engine.level());
    } else {
        println!("Local state unchanged");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_user() {
        let mut config = Config::default();
        assert!(resolve_user(&config, None).is_err());
        assert!(resolve_user(&config, Some("  ".to_string())).is_err());

        config.sync.user_id = Some("from-config".to_string());
        assert_eq!(resolve_user(&config, None).unwrap(), "from-config");
        assert_eq!(
            resolve_user(&config, Some("explicit".to_string())).unwrap(),
            "explicit"
        );
    }
}
