//! Three-tier goal adherence used to colour progress bars and chart bars.
//!
//! Calorie bands are asymmetric: when intake misses the target in the
//! direction the goal is heading (under target while cutting, over target
//! while bulking) the bands are twice as wide as when it misses the other
//! way. Pure maintenance goals always get the narrow bands.

use serde::{Deserialize, Serialize};

use super::targets::{GoalContext, GoalDirection};
use crate::errors::{ensure_non_negative, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    OnTrack,
    Approaching,
    OffTrack,
    /// Nothing logged, or no target set.
    NoData,
}

impl GoalStatus {
    pub fn label(&self) -> &'static str {
        match self {
            GoalStatus::OnTrack => "On track",
            GoalStatus::Approaching => "Approaching",
            GoalStatus::OffTrack => "Off track",
            GoalStatus::NoData => "No data",
        }
    }

    /// Presentation colour token.
    pub fn color(&self) -> &'static str {
        match self {
            GoalStatus::OnTrack => "green",
            GoalStatus::Approaching => "yellow",
            GoalStatus::OffTrack => "red",
            GoalStatus::NoData => "gray",
        }
    }
}

/// Green/yellow band widths in percentage points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub green: f64,
    pub yellow: f64,
}

impl Bands {
    fn grade(&self, diff: f64) -> GoalStatus {
        if diff <= self.green {
            GoalStatus::OnTrack
        } else if diff <= self.yellow {
            GoalStatus::Approaching
        } else {
            GoalStatus::OffTrack
        }
    }
}

pub const GOOD_DIRECTION_BANDS: Bands = Bands {
    green: 5.0,
    yellow: 7.5,
};
pub const STRICT_BANDS: Bands = Bands {
    green: 2.5,
    yellow: 5.0,
};
/// Protein shortfall (percent of target) still graded as approaching.
pub const PROTEIN_APPROACHING_SHORTFALL: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierThresholds {
    pub good_direction: Bands,
    pub strict: Bands,
    pub protein_approaching: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            good_direction: GOOD_DIRECTION_BANDS,
            strict: STRICT_BANDS,
            protein_approaching: PROTEIN_APPROACHING_SHORTFALL,
        }
    }
}

impl ClassifierThresholds {
    pub fn classify_calories(
        &self,
        actual: f64,
        goals: &GoalContext,
    ) -> Result<GoalStatus, ValidationError> {
        let actual = ensure_non_negative("actual_calories", actual)?;
        let target = goals.target_calories();
        if actual == 0.0 || target == 0.0 {
            return Ok(GoalStatus::NoData);
        }

        let diff = (actual / target * 100.0 - 100.0).abs();
        let good_direction = match goals.direction() {
            GoalDirection::Deficit => actual < target,
            GoalDirection::Surplus => actual > target,
            GoalDirection::Maintenance => false,
        };
        let bands = if good_direction {
            self.good_direction
        } else {
            self.strict
        };
        Ok(bands.grade(diff))
    }

    /// Protein has no penalty for overshooting; only the shortfall is graded.
    pub fn classify_protein(
        &self,
        actual: f64,
        target: f64,
    ) -> Result<GoalStatus, ValidationError> {
        let actual = ensure_non_negative("actual_protein", actual)?;
        let target = ensure_non_negative("target_protein", target)?;
        if actual == 0.0 || target == 0.0 {
            return Ok(GoalStatus::NoData);
        }

        let percent_below = (target - actual) / target * 100.0;
        Ok(if percent_below <= 0.0 {
            GoalStatus::OnTrack
        } else if percent_below <= self.protein_approaching {
            GoalStatus::Approaching
        } else {
            GoalStatus::OffTrack
        })
    }
}

/// Classifies calorie intake with the default bands.
pub fn classify_calories(actual: f64, goals: &GoalContext) -> Result<GoalStatus, ValidationError> {
    ClassifierThresholds::default().classify_calories(actual, goals)
}

/// Classifies protein intake with the default shortfall band.
pub fn classify_protein(actual: f64, target: f64) -> Result<GoalStatus, ValidationError> {
    ClassifierThresholds::default().classify_protein(actual, target)
}
