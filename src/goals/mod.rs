pub mod classifier;
pub mod progress;
pub mod targets;
pub mod weekly;

pub use classifier::{classify_calories, classify_protein, Bands, ClassifierThresholds, GoalStatus};
pub use progress::{day_progress, DayProgress};
pub use targets::{GoalContext, GoalDirection};
pub use weekly::{summarize, weekly_report, DayReport, WeekWindow, WeeklyReport, WeeklySummary};
