//! Progression state and its JSON record
//!
//! The record is decoded field by field so that one bad field (wrong type,
//! older schema) only resets that field instead of the whole state.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ProgressError;
use super::levels::calculate_level;
use super::streaks::{format_date, parse_date, StreakState, StreakTransition};

/// Weekly quest tracker, carried through untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeeklyQuest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub xp_reward: u64,
    pub progress: u64,
    pub target: u64,
    pub completed: bool,
}

/// Time-limited challenge, carried through untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimeChallenge {
    pub id: String,
    pub title: String,
    pub description: String,
    pub deadline: String,
    pub xp_reward: u64,
    pub completed: bool,
}

/// Everything the engine knows about one learner
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressionState {
    xp: u64,
    streak: StreakState,
    badges: Vec<String>,
    modules_completed: Vec<String>,
    badge_unlocked_at: BTreeMap<String, DateTime<Utc>>,
    weekly_quests: Vec<WeeklyQuest>,
    time_based_challenges: Vec<TimeChallenge>,
}

/// Serialized shape of [`ProgressionState`]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRecord<'a> {
    pub xp: u64,
    /// Redundant; ignored on load
    pub level: u64,
    pub streak: u32,
    pub badges: &'a [String],
    pub modules_completed: &'a [String],
    pub last_activity_date: String,
    pub weekly_quests: &'a [WeeklyQuest],
    pub time_based_challenges: &'a [TimeChallenge],
    pub badge_unlocked_at: &'a BTreeMap<String, DateTime<Utc>>,
}

/// Decoded state plus the names of fields that had to be dropped
#[derive(Debug)]
pub struct Salvaged {
    pub state: ProgressionState,
    pub discarded: Vec<&'static str>,
}

impl ProgressionState {
    pub fn xp(&self) -> u64 {
        self.xp
    }

    /// Always derived from XP
    pub fn level(&self) -> u64 {
        calculate_level(self.xp)
    }

    pub fn streak(&self) -> u32 {
        self.streak.current
    }

    pub fn last_activity_date(&self) -> Option<NaiveDate> {
        self.streak.last_activity
    }

    pub fn badges(&self) -> &[String] {
        &self.badges
    }

    pub fn has_badge(&self, id: &str) -> bool {
        self.badges.iter().any(|b| b == id)
    }

    pub fn badge_unlocked_at(&self, id: &str) -> Option<DateTime<Utc>> {
        self.badge_unlocked_at.get(id).copied()
    }

    pub fn modules_completed(&self) -> &[String] {
        &self.modules_completed
    }

    pub fn has_completed_module(&self, id: &str) -> bool {
        self.modules_completed.iter().any(|m| m == id)
    }

    pub fn weekly_quests(&self) -> &[WeeklyQuest] {
        &self.weekly_quests
    }

    pub fn time_based_challenges(&self) -> &[TimeChallenge] {
        &self.time_based_challenges
    }

    /// Attach auxiliary trackers (state is otherwise built through the engine)
    pub fn with_quests(
        mut self,
        weekly_quests: Vec<WeeklyQuest>,
        time_based_challenges: Vec<TimeChallenge>,
    ) -> Self {
        self.weekly_quests = weekly_quests;
        self.time_based_challenges = time_based_challenges;
        self
    }

    // ========================================
    // MUTATION (engine only)
    // ========================================

    pub(crate) fn add_xp(&mut self, amount: u64) {
        self.xp = self.xp.saturating_add(amount);
    }

    pub(crate) fn record_activity(&mut self, today: NaiveDate) -> StreakTransition {
        self.streak.record_activity(today)
    }

    /// Returns false if the module was already completed
    pub(crate) fn insert_module(&mut self, id: &str) -> bool {
        if self.has_completed_module(id) {
            return false;
        }
        self.modules_completed.push(id.to_string());
        true
    }

    /// Returns false if the badge was already unlocked
    pub(crate) fn insert_badge(&mut self, id: &str, at: DateTime<Utc>) -> bool {
        if self.has_badge(id) {
            return false;
        }
        self.badges.push(id.to_string());
        self.badge_unlocked_at.insert(id.to_string(), at);
        true
    }

    /// Drop unlock times of badges that are not unlocked
    fn prune_unlock_times(&mut self) {
        let badges = &self.badges;
        self.badge_unlocked_at.retain(|id, _| badges.iter().any(|b| b == id));
    }

    // ========================================
    // SERIALIZATION
    // ========================================

    pub fn to_record(&self) -> StateRecord<'_> {
        StateRecord {
            xp: self.xp,
            level: self.level(),
            streak: self.streak.current,
            badges: &self.badges,
            modules_completed: &self.modules_completed,
            last_activity_date: self
                .streak
                .last_activity
                .map(format_date)
                .unwrap_or_default(),
            weekly_quests: &self.weekly_quests,
            time_based_challenges: &self.time_based_challenges,
            badge_unlocked_at: &self.badge_unlocked_at,
        }
    }

    pub fn to_json(&self) -> Result<String, ProgressError> {
        serde_json::to_string(&self.to_record())
            .map_err(|e| ProgressError::CorruptPersistedState(e.to_string()))
    }

    pub fn to_value(&self) -> Result<Value, ProgressError> {
        serde_json::to_value(self.to_record())
            .map_err(|e| ProgressError::CorruptPersistedState(e.to_string()))
    }

    /// Decode a stored blob, merging whatever is usable over defaults
    pub fn from_json(raw: &str) -> Result<Salvaged, ProgressError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ProgressError::CorruptPersistedState(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Decode a JSON object, merging whatever is usable over defaults.
    ///
    /// Fails only when the value is not an object at all.
    pub fn from_value(value: &Value) -> Result<Salvaged, ProgressError> {
        let obj = value.as_object().ok_or_else(|| {
            ProgressError::CorruptPersistedState(format!(
                "expected a JSON object, found {}",
                json_kind(value)
            ))
        })?;

        let mut discarded = Vec::new();
        let mut state = Self::default();

        if let Some(xp) = count_field(obj, "xp", &mut discarded) {
            state.xp = xp;
        }
        if let Some(streak) = count_field(obj, "streak", &mut discarded) {
            state.streak.current = u32::try_from(streak).unwrap_or(u32::MAX);
        }
        match obj.get("lastActivityDate") {
            None | Some(Value::Null) => {}
            Some(Value::String(s)) => state.streak.last_activity = parse_date(s),
            Some(_) => discarded.push("lastActivityDate"),
        }
        if let Some(badges) = string_set_field(obj, "badges", &mut discarded) {
            state.badges = badges;
        }
        if let Some(modules) = string_set_field(obj, "modulesCompleted", &mut discarded) {
            state.modules_completed = modules;
        }
        if let Some(quests) = list_field(obj, "weeklyQuests", &mut discarded) {
            state.weekly_quests = quests;
        }
        if let Some(challenges) = list_field(obj, "timeBasedChallenges", &mut discarded) {
            state.time_based_challenges = challenges;
        }
        match obj.get("badgeUnlockedAt") {
            None | Some(Value::Null) => {}
            Some(Value::Object(times)) => {
                for (id, at) in times {
                    match serde_json::from_value::<DateTime<Utc>>(at.clone()) {
                        Ok(at) => {
                            state.badge_unlocked_at.insert(id.clone(), at);
                        }
                        Err(_) => discarded.push("badgeUnlockedAt"),
                    }
                }
            }
            Some(_) => discarded.push("badgeUnlockedAt"),
        }

        state.prune_unlock_times();
        discarded.dedup();
        Ok(Salvaged { state, discarded })
    }

    /// Merge a remote blob over this state.
    ///
    /// Remote values win for fields it carries, except where that would break
    /// an invariant: sets are unioned, XP never decreases, and the streak is
    /// only taken along with an activity date that is not older than ours.
    pub fn merge_remote(&mut self, remote: &Value) -> Result<Vec<&'static str>, ProgressError> {
        let Salvaged {
            state: incoming,
            discarded,
        } = Self::from_value(remote)?;
        let obj = remote.as_object().cloned().unwrap_or_default();
        let present = |key: &str| obj.get(key).is_some_and(|v| !v.is_null());

        if present("xp") {
            self.xp = self.xp.max(incoming.xp);
        }

        for badge in &incoming.badges {
            if !self.has_badge(badge) {
                self.badges.push(badge.clone());
            }
        }
        for (id, at) in &incoming.badge_unlocked_at {
            self.badge_unlocked_at.entry(id.clone()).or_insert(*at);
        }
        for module in &incoming.modules_completed {
            if !self.has_completed_module(module) {
                self.modules_completed.push(module.clone());
            }
        }

        if let Some(remote_day) = incoming.streak.last_activity {
            let newer = self
                .streak
                .last_activity
                .is_none_or(|local_day| remote_day >= local_day);
            if newer {
                self.streak = incoming.streak;
            }
        }

        self.prune_unlock_times();

        if present("weeklyQuests") && !discarded.contains(&"weeklyQuests") {
            self.weekly_quests = incoming.weekly_quests;
        }
        if present("timeBasedChallenges") && !discarded.contains(&"timeBasedChallenges") {
            self.time_based_challenges = incoming.time_based_challenges;
        }

        Ok(discarded)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Non-negative integer field. Whole floats (older clients) are accepted.
fn count_field(
    obj: &Map<String, Value>,
    key: &'static str,
    discarded: &mut Vec<&'static str>,
) -> Option<u64> {
    let value = obj.get(key)?;
    if value.is_null() {
        return None;
    }
    let count = value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
            .map(|f| f as u64)
    });
    if count.is_none() {
        discarded.push(key);
    }
    count
}

/// Array of string ids; non-string entries and duplicates are dropped
fn string_set_field(
    obj: &Map<String, Value>,
    key: &'static str,
    discarded: &mut Vec<&'static str>,
) -> Option<Vec<String>> {
    let value = obj.get(key)?;
    let Some(items) = value.as_array() else {
        if !value.is_null() {
            discarded.push(key);
        }
        return None;
    };

    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        match item.as_str() {
            Some(s) if !out.iter().any(|o| o == s) => out.push(s.to_string()),
            Some(_) => {}
            None => discarded.push(key),
        }
    }
    Some(out)
}

/// Array of records; entries that don't decode are dropped
fn list_field<T: DeserializeOwned>(
    obj: &Map<String, Value>,
    key: &'static str,
    discarded: &mut Vec<&'static str>,
) -> Option<Vec<T>> {
    let value = obj.get(key)?;
    let Some(items) = value.as_array() else {
        if !value.is_null() {
            discarded.push(key);
        }
        return None;
    };

    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<T>(item.clone()) {
            Ok(record) => out.push(record),
            Err(_) => discarded.push(key),
        }
    }
    Some(out)
}
