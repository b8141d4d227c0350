pub mod api_connection;
pub mod cli;
pub mod config;
pub mod errors;
pub mod food_log;
pub mod frequent;
pub mod goals;
pub mod log_loader;
pub mod logging;
pub mod meal_analyzer;

pub use errors::ValidationError;
pub use food_log::{daily_totals, DailyTotals, NutritionRecord};
pub use frequent::{find_frequent_items, ClusterOptions, FrequentItemCluster};
pub use goals::{classify_calories, classify_protein, GoalContext, GoalStatus, WeeklySummary};
