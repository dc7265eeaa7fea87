//! Status and badge listing

use anyhow::Result;

use drp_progress::config::Config;

const BAR_WIDTH: usize = 20;

fn progress_bar(percent: f64) -> String {
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// Show XP, level, streak and module counts
pub fn status_command(config: &Config) -> Result<()> {
    let engine = config.open_engine();
    let state = engine.state();
    let progress = engine.level_progress();

    println!(
        "Level {}  {}  {:.0}%",
        progress.level,
        progress_bar(progress.percent),
        progress.percent
    );
    println!(
        "  XP: {} ({} to level {})",
        progress.xp,
        progress.xp_to_next(),
        progress.level.saturating_add(1)
    );

    match state.last_activity_date() {
        Some(day) => println!("  Streak: {} day(s), last active {}", state.streak(), day),
        None => println!("  Streak: no activity yet"),
    }

    println!("  Modules completed: {}", state.modules_completed().len());
    for module in state.modules_completed() {
        println!("    - {}", module);
    }

    let unlocked = engine.badges().iter().filter(|b| b.unlocked).count();
    println!("  Badges: {}/{}", unlocked, engine.badges().len());

    if !state.weekly_quests().is_empty() {
        println!("  Weekly quests:");
        for quest in state.weekly_quests() {
            println!(
                "    {} {} ({}/{})",
                if quest.completed { "[x]" } else { "[ ]" },
                quest.title,
                quest.progress,
                quest.target
            );
        }
    }

    Ok(())
}

/// List the badge catalog with unlock status
pub fn badges_command(config: &Config) -> Result<()> {
    let engine = config.open_engine();

    for badge in engine.badges() {
        let marker = if badge.unlocked { "[x]" } else { "[ ]" };
        println!("{} {} ({})", marker, badge.definition.name, badge.definition.id);
        println!("    {}", badge.definition.description);
        if let Some(at) = badge.unlocked_at {
            println!("    Unlocked {}", at.format("%Y-%m-%d %H:%M UTC"));
        }
    }

    Ok(())
}
