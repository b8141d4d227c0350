use serde::{Deserialize, Serialize};

use crate::errors::{ensure_non_negative, ValidationError};

/// Which way the calorie target sits relative to maintenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalDirection {
    Deficit,
    Surplus,
    Maintenance,
}

/// A user's daily goals, supplied by the settings store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGoalContext")]
pub struct GoalContext {
    target_calories: f64,
    target_protein: f64,
    maintenance_calories: f64,
}

#[derive(Debug, Deserialize)]
struct RawGoalContext {
    target_calories: f64,
    target_protein: f64,
    maintenance_calories: f64,
}

impl TryFrom<RawGoalContext> for GoalContext {
    type Error = ValidationError;

    fn try_from(raw: RawGoalContext) -> Result<Self, Self::Error> {
        GoalContext::new(raw.target_calories, raw.target_protein, raw.maintenance_calories)
    }
}

impl GoalContext {
    pub fn new(
        target_calories: f64,
        target_protein: f64,
        maintenance_calories: f64,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            target_calories: ensure_non_negative("target_calories", target_calories)?,
            target_protein: ensure_non_negative("target_protein", target_protein)?,
            maintenance_calories: ensure_non_negative(
                "maintenance_calories",
                maintenance_calories,
            )?,
        })
    }

    pub fn target_calories(&self) -> f64 {
        self.target_calories
    }

    pub fn target_protein(&self) -> f64 {
        self.target_protein
    }

    pub fn maintenance_calories(&self) -> f64 {
        self.maintenance_calories
    }

    pub fn direction(&self) -> GoalDirection {
        if self.target_calories < self.maintenance_calories {
            GoalDirection::Deficit
        } else if self.target_calories > self.maintenance_calories {
            GoalDirection::Surplus
        } else {
            GoalDirection::Maintenance
        }
    }
}
