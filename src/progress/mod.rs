//! Gamification engine: XP, levels, daily streaks, badges
//!
//! # Architecture
//!
//! ```text
//!   lesson / quiz / module UI
//!              │
//!              ▼
//! ┌──────────────────────┐  events  ┌─────────────┐
//! │  ProgressionEngine   │─────────►│  observers  │
//! │  streak → badges     │          └─────────────┘
//! └───────┬────────┬─────┘
//!         │        │ push / pull (optional)
//!         ▼        ▼
//!  KeyValueStore  RemoteSync
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let store = FileStore::new(config.data_dir());
//! let mut engine = ProgressionEngine::new(StatePersistence::new(Box::new(store)));
//! engine.subscribe(|event: &ProgressEvent| println!("{}", event.kind()));
//! engine.complete_module("post-module");
//! ```

mod checker;
mod definitions;
mod engine;
mod error;
mod events;
mod levels;
mod state;
mod store;
mod streaks;
mod sync;

pub use checker::{check_count_badges, check_topic_badges, newly_unlocked, predicate_holds};
pub use definitions::{BadgeDefinition, BadgeId, BadgePredicate, ModuleTopics, TopicTag, BADGES};
pub use engine::{AwardOutcome, BadgeStatus, ProgressionEngine};
pub use error::ProgressError;
pub use events::{EventNotifier, ProgressEvent, ProgressObserver, SubscriptionId};
pub use levels::{
    calculate_level, progress_within_level, xp_for_level, LevelProgress, XpRules, XP_PER_LEVEL,
};
pub use state::{ProgressionState, Salvaged, StateRecord, TimeChallenge, WeeklyQuest};
pub use store::{FileStore, KeyValueStore, MemoryStore, StatePersistence, DEFAULT_STATE_KEY};
pub(crate) use store::write_atomic;
pub use streaks::{
    format_date, next_transition, parse_date, Clock, ManualClock, StreakState,
    StreakTransition, SystemClock,
};
pub use sync::{PendingPull, PullStatus, RemoteSync, DEFAULT_API_URL};
