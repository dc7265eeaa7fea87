//! DRP Learning Progress
//!
//! The progression engine behind the DRP learning portal: learners earn XP
//! from lessons, quizzes, videos and modules, climb a level every 1000 XP,
//! keep a daily streak alive and unlock badges. State is kept in a local
//! key-value store and can be pushed to / pulled from the backend.
//!
//! ## Collaborators
//!
//! Lesson and quiz UIs call into a [`progress::ProgressionEngine`] they were
//! handed; widgets that show XP or badges subscribe to its events. The engine
//! never calls back into either.

pub mod config;
pub mod progress;

pub use progress::{ProgressEvent, ProgressionEngine, ProgressionState};
