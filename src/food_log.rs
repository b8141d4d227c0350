use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{ensure_non_negative, ValidationError};

/// One logged food item.
///
/// Calories and protein are checked on construction (and on deserialization),
/// so every record reaching the clustering engine or the aggregator is valid.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(try_from = "RawNutritionRecord")]
pub struct NutritionRecord {
    name: String,
    calories: f64,
    protein: f64,
    occurred_on: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

// Unvalidated mirror used only as the serde entry point.
#[derive(Debug, Deserialize)]
struct RawNutritionRecord {
    name: String,
    calories: f64,
    protein: f64,
    occurred_on: NaiveDate,
    #[serde(default)]
    image_ref: Option<String>,
    #[serde(default)]
    note: Option<String>,
}

impl TryFrom<RawNutritionRecord> for NutritionRecord {
    type Error = ValidationError;

    fn try_from(raw: RawNutritionRecord) -> Result<Self, Self::Error> {
        Ok(NutritionRecord::new(raw.name, raw.calories, raw.protein, raw.occurred_on)?
            .with_image_ref(raw.image_ref)
            .with_note(raw.note))
    }
}

impl NutritionRecord {
    pub fn new(
        name: impl Into<String>,
        calories: f64,
        protein: f64,
        occurred_on: NaiveDate,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: name.into(),
            calories: ensure_non_negative("calories", calories)?,
            protein: ensure_non_negative("protein", protein)?,
            occurred_on,
            image_ref: None,
            note: None,
        })
    }

    /// Attaches an opaque photo reference, stored exactly as given.
    pub fn with_image_ref(mut self, image_ref: Option<String>) -> Self {
        self.image_ref = image_ref;
        self
    }

    /// Blank notes are treated as absent.
    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn calories(&self) -> f64 {
        self.calories
    }

    pub fn protein(&self) -> f64 {
        self.protein
    }

    pub fn occurred_on(&self) -> NaiveDate {
        self.occurred_on
    }

    pub fn image_ref(&self) -> Option<&str> {
        self.image_ref.as_deref()
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

/// Per-date sums of calories and protein.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub calories: f64,
    pub protein: f64,
    pub entries: usize,
}

impl DailyTotals {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            calories: 0.0,
            protein: 0.0,
            entries: 0,
        }
    }

    /// A day counts as logged only when it carries some calories.
    pub fn is_logged(&self) -> bool {
        self.calories > 0.0
    }
}

/// Groups records by `occurred_on` and sums each day. Output is ordered by date.
pub fn daily_totals(records: &[NutritionRecord]) -> Vec<DailyTotals> {
    let mut by_date: BTreeMap<NaiveDate, DailyTotals> = BTreeMap::new();
    for record in records {
        let day = by_date
            .entry(record.occurred_on)
            .or_insert_with(|| DailyTotals::empty(record.occurred_on));
        day.calories += record.calories;
        day.protein += record.protein;
        day.entries += 1;
    }
    by_date.into_values().collect()
}
