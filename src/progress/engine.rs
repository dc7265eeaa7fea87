//! Progression engine - core gamification logic
//!
//! Owns the progression state and is the only thing that mutates it. Every
//! award runs the same pipeline:
//!
//! 1. streak transition and XP delta (grant + streak bonus) in one step
//! 2. badge evaluation
//! 3. persist
//! 4. notify observers
//!
//! The streak bonus is folded into the triggering grant, so an award never
//! recurses into another award.

use std::thread::JoinHandle;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::checker::newly_unlocked;
use super::definitions::{BadgeDefinition, BadgeId, ModuleTopics, BADGES};
use super::events::{EventNotifier, ProgressEvent, ProgressObserver, SubscriptionId};
use super::levels::{LevelProgress, XpRules};
use super::state::ProgressionState;
use super::store::StatePersistence;
use super::streaks::{Clock, StreakTransition, SystemClock};
use super::sync::RemoteSync;

/// Result of one XP award
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardOutcome {
    pub xp: u64,
    pub level: u64,
    pub level_up: bool,
    /// Daily streak bonus included in this award (0 if none)
    pub streak_bonus: u64,
    pub unlocked: Vec<BadgeId>,
}

/// Catalog entry with the learner's unlock status
#[derive(Debug, Clone)]
pub struct BadgeStatus {
    pub definition: &'static BadgeDefinition,
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// Main entry point for collaborators (lesson, quiz and module UIs)
pub struct ProgressionEngine {
    state: ProgressionState,
    persistence: StatePersistence,
    notifier: EventNotifier,
    clock: Box<dyn Clock>,
    rules: XpRules,
    topics: ModuleTopics,
}

impl ProgressionEngine {
    /// Create an engine, loading whatever state the store holds
    pub fn new(persistence: StatePersistence) -> Self {
        let state = persistence.load();
        debug!(
            "[progress:engine] Loaded state: {} XP, level {}, streak {}",
            state.xp(),
            state.level(),
            state.streak()
        );
        Self {
            state,
            persistence,
            notifier: EventNotifier::new(),
            clock: Box::new(SystemClock),
            rules: XpRules::default(),
            topics: ModuleTopics::default(),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_rules(mut self, rules: XpRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_topics(mut self, topics: ModuleTopics) -> Self {
        self.topics = topics;
        self
    }

    // ========================================
    // READ ACCESS
    // ========================================

    /// Snapshot of the current state
    pub fn state(&self) -> ProgressionState {
        self.state.clone()
    }

    pub fn xp(&self) -> u64 {
        self.state.xp()
    }

    pub fn level(&self) -> u64 {
        self.state.level()
    }

    pub fn level_progress(&self) -> LevelProgress {
        LevelProgress::new(self.state.xp())
    }

    pub fn rules(&self) -> &XpRules {
        &self.rules
    }

    pub fn topics(&self) -> &ModuleTopics {
        &self.topics
    }

    /// Whole badge catalog with unlock status
    pub fn badges(&self) -> Vec<BadgeStatus> {
        BADGES
            .iter()
            .map(|definition| {
                let id = definition.id.as_str();
                BadgeStatus {
                    definition,
                    unlocked: self.state.has_badge(id),
                    unlocked_at: self.state.badge_unlocked_at(id),
                }
            })
            .collect()
    }

    // ========================================
    // OBSERVERS
    // ========================================

    pub fn subscribe(&mut self, observer: impl ProgressObserver + 'static) -> SubscriptionId {
        self.notifier.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    // ========================================
    // XP PIPELINE
    // ========================================

    /// Award XP and run the streak, badge and persistence steps
    pub fn award_xp(&mut self, amount: u64, reason: &str) -> AwardOutcome {
        let old_level = self.state.level();

        let transition = self.state.record_activity(self.clock.today());
        let streak_bonus = if transition.earns_bonus() {
            self.rules.streak_day
        } else {
            0
        };
        self.state.add_xp(amount.saturating_add(streak_bonus));

        match transition {
            StreakTransition::Continued { streak } => {
                debug!("[progress:engine] Streak extended to {} (+{} XP)", streak, streak_bonus)
            }
            StreakTransition::Reset => debug!("[progress:engine] Streak started"),
            StreakTransition::Unchanged => {}
        }
        debug!("[progress:engine] +{} XP: {}", amount, reason);

        let unlocked = self.evaluate_badges();
        self.persistence.save(&self.state);

        let xp = self.state.xp();
        let level = self.state.level();
        let level_up = level > old_level;
        if level_up {
            info!("[progress:engine] Level up: {} -> {}", old_level, level);
        }
        self.notifier.publish(&ProgressEvent::XpUpdated { xp, level });

        AwardOutcome {
            xp,
            level,
            level_up,
            streak_bonus,
            unlocked,
        }
    }

    /// Re-evaluate badges outside of an award. Persists only if something unlocked.
    pub fn check_badges(&mut self) -> Vec<BadgeId> {
        let unlocked = self.evaluate_badges();
        if !unlocked.is_empty() {
            self.persistence.save(&self.state);
        }
        unlocked
    }

    /// Unlock every badge whose predicate newly holds, one event per unlock
    fn evaluate_badges(&mut self) -> Vec<BadgeId> {
        let candidates = newly_unlocked(&self.state, &self.topics);
        let now = Utc::now();
        let mut unlocked = Vec::with_capacity(candidates.len());

        for id in candidates {
            if !self.state.insert_badge(id.as_str(), now) {
                continue;
            }
            info!("[progress:engine] Badge unlocked: {}", id);
            self.notifier.publish(&ProgressEvent::BadgeUnlocked {
                badge_id: id.as_str().to_string(),
            });
            unlocked.push(id);
        }

        unlocked
    }

    // ========================================
    // COLLABORATOR ENTRY POINTS
    // ========================================

    /// Lesson finished; `xp` overrides the default lesson reward
    pub fn complete_lesson(&mut self, lesson_id: &str, xp: Option<u64>) -> AwardOutcome {
        let amount = xp.unwrap_or(self.rules.complete_lesson);
        self.award_xp(amount, &format!("Completed lesson: {lesson_id}"))
    }

    /// Quiz finished. Only a passing score earns XP.
    pub fn complete_quiz(&mut self, lesson_id: &str, score_percent: u8) -> Option<AwardOutcome> {
        if !self.rules.quiz_passed(score_percent) {
            debug!(
                "[progress:engine] Quiz {} scored {}%, below {}%",
                lesson_id, score_percent, self.rules.quiz_pass_threshold
            );
            return None;
        }
        let amount = self.rules.quiz_pass;
        Some(self.award_xp(amount, &format!("Quiz passed: {lesson_id}")))
    }

    pub fn watch_video(&mut self, video_id: &str) -> AwardOutcome {
        let amount = self.rules.watch_video;
        self.award_xp(amount, &format!("Watched video: {video_id}"))
    }

    /// Module finished. Completing the same module again does nothing.
    pub fn complete_module(&mut self, module_id: &str) -> Option<AwardOutcome> {
        if !self.state.insert_module(module_id) {
            debug!("[progress:engine] Module {} already completed", module_id);
            return None;
        }

        let amount = self.rules.complete_module;
        let outcome = self.award_xp(amount, &format!("Completed module: {module_id}"));
        self.notifier.publish(&ProgressEvent::ModuleCompleted {
            module_id: module_id.to_string(),
            level_up: outcome.level_up,
        });
        Some(outcome)
    }

    // ========================================
    // REMOTE SYNC
    // ========================================

    /// Send the current state in the background
    pub fn push(&self, sync: &RemoteSync, user_id: &str) -> Option<JoinHandle<()>> {
        match self.state.to_value() {
            Ok(blob) => Some(sync.push(user_id, blob)),
            Err(e) => {
                warn!("[progress:sync] Not pushing: {}", e);
                None
            }
        }
    }

    /// Fetch the remote state and merge it. Returns true if anything was applied.
    pub fn pull(&mut self, sync: &RemoteSync, user_id: &str) -> bool {
        match sync.fetch(user_id) {
            Ok(Some(remote)) => self.apply_remote(&remote),
            Ok(None) => {
                info!("[progress:sync] No remote state for user {}", user_id);
                false
            }
            Err(e) => {
                warn!("[progress:sync] Pull for user {} failed: {}", user_id, e);
                false
            }
        }
    }

    /// Merge a pulled blob over local state, re-evaluate badges, then persist
    /// and notify
    pub fn apply_remote(&mut self, remote: &Value) -> bool {
        match self.state.merge_remote(remote) {
            Ok(discarded) => {
                if !discarded.is_empty() {
                    warn!("[progress:sync] Ignored unreadable remote fields {:?}", discarded);
                }
                self.evaluate_badges();
                self.persistence.save(&self.state);
                self.notifier.publish(&ProgressEvent::XpUpdated {
                    xp: self.state.xp(),
                    level: self.state.level(),
                });
                true
            }
            Err(e) => {
                warn!("[progress:sync] Remote state rejected: {}", e);
                false
            }
        }
    }
}
