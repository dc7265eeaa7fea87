use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use drp_progress::config::Config;

mod cli;

use cli::activity::Activity;

#[derive(Parser)]
#[command(name = "drp-progress")]
#[command(about = "Track learning XP, levels, streaks and badges")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.drp/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the progress state (overrides storage.data_dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print events as JSON lines
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show XP, level, streak and completed modules
    Status,

    /// List all badges and which ones are unlocked
    Badges,

    /// Record a completed lesson
    Lesson {
        lesson_id: String,
        /// XP to grant instead of the configured lesson reward
        #[arg(long)]
        xp: Option<u64>,
    },

    /// Record a quiz result (XP only for a passing score)
    Quiz {
        lesson_id: String,
        /// Score in percent
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        score: u8,
    },

    /// Record a watched video
    Video { video_id: String },

    /// Record a completed module
    Module { module_id: String },

    /// Upload the local state to the backend
    Push { user_id: Option<String> },

    /// Merge the backend state into the local one
    Pull { user_id: Option<String> },

    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Some(Commands::Init { force }) = cli.command {
        return cli::init::init_command(cli.config, force);
    }

    let mut config = Config::load_from(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = Some(dir);
    }

    match cli.command {
        Some(Commands::Status) | None => cli::status::status_command(&config)?,
        Some(Commands::Badges) => cli::status::badges_command(&config)?,
        Some(Commands::Lesson { lesson_id, xp }) => {
            let activity = Activity::Lesson { id: lesson_id, xp };
            cli::activity::activity_command(&config, activity, cli.json)?;
        }
        Some(Commands::Quiz { lesson_id, score }) => {
            let activity = Activity::Quiz {
                id: lesson_id,
                score,
            };
            cli::activity::activity_command(&config, activity, cli.json)?;
        }
        Some(Commands::Video { video_id }) => {
            let activity = Activity::Video { id: video_id };
            cli::activity::activity_command(&config, activity, cli.json)?;
        }
        Some(Commands::Module { module_id }) => {
            let activity = Activity::Module { id: module_id };
            cli::activity::activity_command(&config, activity, cli.json)?;
        }
        Some(Commands::Push { user_id }) => cli::sync::push_command(&config, user_id)?,
        Some(Commands::Pull { user_id }) => cli::sync::pull_command(&config, user_id)?,
        // Handled before loading the config
        Some(Commands::Init { .. }) => {}
    }

    Ok(())
}
