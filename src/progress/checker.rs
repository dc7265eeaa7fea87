//! Badge checking logic
//!
//! Pure functions deciding which badges should be unlocked. Already unlocked
//! badges are never returned again.

use super::definitions::{BadgeId, BadgePredicate, ModuleTopics, TopicTag, BADGES};
use super::state::ProgressionState;

/// Whether a single predicate holds for the state
pub fn predicate_holds(
    predicate: BadgePredicate,
    state: &ProgressionState,
    topics: &ModuleTopics,
) -> bool {
    match predicate {
        BadgePredicate::ModulesCompleted(min) => state.modules_completed().len() >= min,
        BadgePredicate::Topic(tag) => has_module_with_topic(state, topics, tag),
    }
}

fn has_module_with_topic(state: &ProgressionState, topics: &ModuleTopics, tag: TopicTag) -> bool {
    state
        .modules_completed()
        .iter()
        .any(|module| topics.has_topic(module, tag))
}

/// Check module-count badges
pub fn check_count_badges(state: &ProgressionState) -> Vec<BadgeId> {
    check_matching(state, &ModuleTopics::empty(), |p| {
        matches!(p, BadgePredicate::ModulesCompleted(_))
    })
}

/// Check topic badges
pub fn check_topic_badges(state: &ProgressionState, topics: &ModuleTopics) -> Vec<BadgeId> {
    check_matching(state, topics, |p| matches!(p, BadgePredicate::Topic(_)))
}

/// Every badge whose predicate holds but that isn't unlocked yet.
///
/// Count badges come first, then topic badges, each group in catalog order.
pub fn newly_unlocked(state: &ProgressionState, topics: &ModuleTopics) -> Vec<BadgeId> {
    let mut unlocked = check_count_badges(state);
    unlocked.extend(check_topic_badges(state, topics));
    unlocked
}

fn check_matching(
    state: &ProgressionState,
    topics: &ModuleTopics,
    filter: impl Fn(BadgePredicate) -> bool,
) -> Vec<BadgeId> {
    BADGES
        .iter()
        .filter(|badge| filter(badge.predicate))
        .filter(|badge| !state.has_badge(badge.id.as_str()))
        .filter(|badge| predicate_holds(badge.predicate, state, topics))
        .map(|badge| badge.id)
        .collect()
}
