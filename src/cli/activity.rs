//! Learner activity commands (lesson, quiz, video, module)

use anyhow::Result;

use drp_progress::config::Config;
use drp_progress::progress::{AwardOutcome, ProgressEvent, ProgressionEngine};

/// Learner action to record
#[derive(Debug, Clone)]
pub enum Activity {
    Lesson { id: String, xp: Option<u64> },
    Quiz { id: String, score: u8 },
    Video { id: String },
    Module { id: String },
}

fn print_event(event: &ProgressEvent, json: bool) {
    if json {
        match serde_json::to_string(event) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::warn!("Failed to encode event: {}", e),
        }
        return;
    }

    match event {
        ProgressEvent::XpUpdated { xp, level } => println!("XP: {} (level {})", xp, level),
        ProgressEvent::BadgeUnlocked { badge_id } => println!("Badge unlocked: {}", badge_id),
        ProgressEvent::ModuleCompleted { module_id, level_up } => {
            println!("Module completed: {}", module_id);
            if *level_up {
                println!("Level up!");
            }
        }
    }
}

fn print_outcome(outcome: &AwardOutcome) {
    if outcome.streak_bonus > 0 {
        println!("Streak bonus: +{} XP", outcome.streak_bonus);
    }
    if outcome.level_up {
        println!("Reached level {}", outcome.level);
    }
}

fn record(engine: &mut ProgressionEngine, activity: Activity) -> Option<AwardOutcome> {
    match activity {
        Activity::Lesson { id, xp } => Some(engine.complete_lesson(&id, xp)),
        Activity::Quiz { id, score } => {
            let outcome = engine.complete_quiz(&id, score);
            if outcome.is_none() {
                println!(
                    "Quiz score {}% is below the {}% needed for XP",
                    score,
                    engine.rules().quiz_pass_threshold
                );
            }
            outcome
        }
        Activity::Video { id } => Some(engine.watch_video(&id)),
        Activity::Module { id } => {
            let outcome = engine.complete_module(&id);
            if outcome.is_none() {
                println!("Module {} was already completed", id);
            }
            outcome
        }
    }
}

/// Record one activity and print the events it produced
pub fn activity_command(config: &Config, activity: Activity, json: bool) -> Result<()> {
    let mut engine = config.open_engine();
    engine.subscribe(move |event: &ProgressEvent| print_event(event, json));

    if let Some(outcome) = record(&mut engine, activity) {
        if !json {
            print_outcome(&outcome);
        }
    }

    Ok(())
}
