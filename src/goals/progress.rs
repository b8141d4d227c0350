use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::classifier::{ClassifierThresholds, GoalStatus};
use super::targets::GoalContext;
use crate::errors::ValidationError;
use crate::food_log::{daily_totals, DailyTotals, NutritionRecord};

/// Running totals for a single day, as shown on the home screen ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayProgress {
    pub totals: DailyTotals,
    pub remaining_calories: f64,
    pub remaining_protein: f64,
    pub calorie_status: GoalStatus,
    pub protein_status: GoalStatus,
}

pub fn day_progress(
    records: &[NutritionRecord],
    goals: &GoalContext,
    date: NaiveDate,
    thresholds: &ClassifierThresholds,
) -> Result<DayProgress, ValidationError> {
    let todays: Vec<NutritionRecord> =
        records.iter().filter(|r| r.occurred_on() == date).cloned().collect();
    let totals = daily_totals(&todays).pop().unwrap_or(DailyTotals::empty(date));

    Ok(DayProgress {
        totals,
        remaining_calories: (goals.target_calories() - totals.calories).max(0.0),
        remaining_protein: (goals.target_protein() - totals.protein).max(0.0),
        calorie_status: thresholds.classify_calories(totals.calories, goals)?,
        protein_status: thresholds.classify_protein(totals.protein, goals.target_protein())?,
    })
}
