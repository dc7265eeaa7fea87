//! XP and Level system
//!
//! Levels are a flat tier every 1000 XP. Nothing here is stored: the level is
//! always recomputed from the XP total.

use serde::{Deserialize, Serialize};

/// XP width of a single level
pub const XP_PER_LEVEL: u64 = 1000;

/// Calculate the level for a given XP total (never below 1)
pub fn calculate_level(xp: u64) -> u64 {
    xp / XP_PER_LEVEL + 1
}

/// XP threshold at which `level` is left, i.e. the "next level" target
pub fn xp_for_level(level: u64) -> u64 {
    level.saturating_mul(XP_PER_LEVEL)
}

/// Progress through `level` in percent (0.0 - 100.0)
pub fn progress_within_level(level: u64, xp: u64) -> f64 {
    let floor = xp_for_level(level.saturating_sub(1));
    let next = xp_for_level(level);
    let needed = next.saturating_sub(floor);
    if needed == 0 {
        return 100.0;
    }

    let gained = xp.saturating_sub(floor).min(needed);
    (gained as f64 / needed as f64) * 100.0
}

/// Level snapshot for display
#[derive(Debug, Clone, PartialEq)]
pub struct LevelProgress {
    pub xp: u64,
    pub level: u64,
    /// XP at which the current level started
    pub current_level_xp: u64,
    /// XP at which the next level starts
    pub next_level_xp: u64,
    pub percent: f64,
}

impl LevelProgress {
    pub fn new(xp: u64) -> Self {
        let level = calculate_level(xp);
        Self {
            xp,
            level,
            current_level_xp: xp_for_level(level - 1),
            next_level_xp: xp_for_level(level),
            percent: progress_within_level(level, xp),
        }
    }

    /// XP still missing until the next level
    pub fn xp_to_next(&self) -> u64 {
        self.next_level_xp.saturating_sub(self.xp)
    }
}

/// XP rewards for learner actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XpRules {
    pub complete_lesson: u64,
    pub watch_video: u64,
    /// Granted for a quiz scored at or above `quiz_pass_threshold`
    pub quiz_pass: u64,
    /// Percent
    pub quiz_pass_threshold: u8,
    /// Bonus for extending the daily streak
    pub streak_day: u64,
    pub complete_module: u64,
}

impl Default for XpRules {
    fn default() -> Self {
        Self {
            complete_lesson: 50,
            watch_video: 20,
            quiz_pass: 100,
            quiz_pass_threshold: 80,
            streak_day: 15,
            complete_module: 200,
        }
    }
}

impl XpRules {
    pub fn quiz_passed(&self, score_percent: u8) -> bool {
        score_percent >= self.quiz_pass_threshold
    }
}
