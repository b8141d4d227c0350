use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::frequent::{DEFAULT_MAX_ITEMS, DEFAULT_MIN_OCCURRENCES, DEFAULT_SIMILARITY_THRESHOLD};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Quick-add suggestions and goal progress from a food log",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Suggest quick-add items from repeatedly logged food
    Frequent {
        #[command(flatten)]
        log: LogArgs,
        #[arg(long, default_value_t = DEFAULT_MIN_OCCURRENCES)]
        min_occurrences: usize,
        #[arg(long, default_value_t = DEFAULT_MAX_ITEMS)]
        max_items: usize,
        /// Name similarity needed to group two entries, in (0, 1]
        #[arg(long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
        threshold: f64,
    },
    /// Seven-day report with per-day statuses and the deficit summary
    Weekly {
        #[command(flatten)]
        log: LogArgs,
        #[command(flatten)]
        goals: GoalArgs,
        /// Any day of the week to report on (defaults to today)
        #[arg(long)]
        week_of: Option<NaiveDate>,
    },
    /// Progress for a single day
    Today {
        #[command(flatten)]
        log: LogArgs,
        #[command(flatten)]
        goals: GoalArgs,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Estimate calories and protein for a meal with the analysis model
    Analyze {
        /// Free-text description of the meal
        #[arg(short, long, default_value = "")]
        text: String,
        /// Photo of the meal
        #[arg(short, long)]
        photo: Option<PathBuf>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Args, Debug)]
pub struct LogArgs {
    /// Path to the food log CSV (date,name,calories,protein[,image_ref,note])
    #[arg(short, long)]
    pub log: PathBuf,
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Goal overrides; unset values fall back to the environment config.
#[derive(Args, Debug, Default)]
pub struct GoalArgs {
    #[arg(long)]
    pub target_calories: Option<f64>,
    #[arg(long)]
    pub target_protein: Option<f64>,
    #[arg(long)]
    pub maintenance_calories: Option<f64>,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
