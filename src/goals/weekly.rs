use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::classifier::{ClassifierThresholds, GoalStatus};
use super::targets::GoalContext;
use crate::errors::{ensure_non_negative, ValidationError};
use crate::food_log::{daily_totals, DailyTotals, NutritionRecord};

/// Average intake over logged days and the resulting energy balance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub average_calories: f64,
    pub average_protein: f64,
    pub days_logged: usize,
    /// Average minus maintenance; negative is a deficit.
    pub daily_deficit: f64,
    pub weekly_deficit: f64,
}

/// Averages daily totals over the days that carry calories. Days with nothing
/// logged are left out of the mean instead of counting as zero.
pub fn summarize(
    records: &[NutritionRecord],
    maintenance_calories: f64,
) -> Result<WeeklySummary, ValidationError> {
    let maintenance = ensure_non_negative("maintenance_calories", maintenance_calories)?;
    Ok(summarize_days(&daily_totals(records), maintenance))
}

fn summarize_days(days: &[DailyTotals], maintenance: f64) -> WeeklySummary {
    let logged: Vec<&DailyTotals> = days.iter().filter(|d| d.is_logged()).collect();
    let days_logged = logged.len();

    let (average_calories, average_protein) = if days_logged == 0 {
        (0.0, 0.0)
    } else {
        let n = days_logged as f64;
        (
            logged.iter().map(|d| d.calories).sum::<f64>() / n,
            logged.iter().map(|d| d.protein).sum::<f64>() / n,
        )
    };

    // With no logged days there is nothing to compare against maintenance.
    let daily_deficit = if days_logged == 0 { 0.0 } else { average_calories - maintenance };

    WeeklySummary {
        average_calories,
        average_protein,
        days_logged,
        daily_deficit,
        weekly_deficit: daily_deficit * days_logged as f64,
    }
}

/// Seven consecutive days starting on a Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekWindow {
    pub start: NaiveDate,
}

impl WeekWindow {
    pub fn containing(date: NaiveDate) -> Self {
        let offset = date.weekday().num_days_from_monday() as i64;
        Self {
            start: date - Duration::days(offset),
        }
    }

    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(6)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end()
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..7).map(move |i| start + Duration::days(i))
    }
}

/// One chart bar: a day's totals and how they grade against the goals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayReport {
    pub totals: DailyTotals,
    pub calorie_status: GoalStatus,
    pub protein_status: GoalStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub window: WeekWindow,
    pub goals: GoalContext,
    pub days: Vec<DayReport>,
    pub summary: WeeklySummary,
}

/// Builds the 7-day report for the week containing `any_day`. Records outside
/// the window are ignored; empty days appear with `NoData` statuses.
pub fn weekly_report(
    records: &[NutritionRecord],
    goals: &GoalContext,
    any_day: NaiveDate,
    thresholds: &ClassifierThresholds,
) -> Result<WeeklyReport, ValidationError> {
    let window = WeekWindow::containing(any_day);
    let in_window: Vec<NutritionRecord> =
        records.iter().filter(|r| window.contains(r.occurred_on())).cloned().collect();
    let totals = daily_totals(&in_window);

    let mut days = Vec::with_capacity(7);
    for date in window.days() {
        let day = totals
            .iter()
            .find(|t| t.date == date)
            .copied()
            .unwrap_or(DailyTotals::empty(date));
        days.push(DayReport {
            totals: day,
            calorie_status: thresholds.classify_calories(day.calories, goals)?,
            protein_status: thresholds.classify_protein(day.protein, goals.target_protein())?,
        });
    }

    let summary = summarize_days(&totals, goals.maintenance_calories());
    debug!(
        week_start = %window.start,
        records = in_window.len(),
        days_logged = summary.days_logged,
        "Built weekly report"
    );
    Ok(WeeklyReport {
        window,
        goals: *goals,
        days,
        summary,
    })
}
