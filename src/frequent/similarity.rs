//! Name-token and nutritional similarity primitives used by the clustering engine.

use std::collections::HashSet;

use crate::errors::ValidationError;
use crate::food_log::NutritionRecord;

/// Articles and prepositions that say nothing about what was eaten.
pub const DEFAULT_STOP_WORDS: &[&str] =
    &["a", "an", "the", "of", "with", "and", "or", "in", "on", "at", "to", "for"];

/// Words of this many characters or fewer are dropped ("2", "g", "xl").
pub const MAX_IGNORED_WORD_LEN: usize = 2;

/// Relative calorie difference must stay strictly below this.
pub const DEFAULT_CALORIE_TOLERANCE: f64 = 0.15;
/// Relative protein difference must stay strictly below this.
pub const DEFAULT_PROTEIN_TOLERANCE: f64 = 0.15;

/// Splits food names into comparable word sets.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stop_words: HashSet<String>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::with_stop_words(DEFAULT_STOP_WORDS.iter().copied())
    }
}

impl Tokenizer {
    pub fn with_stop_words<'a>(stop_words: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            stop_words: stop_words.into_iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    /// Lowercased words of `name`, split on anything that is not a letter or digit.
    pub fn tokenize(&self, name: &str) -> HashSet<String> {
        name.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| word.chars().count() > MAX_IGNORED_WORD_LEN)
            .filter(|word| !self.stop_words.contains(*word))
            .map(str::to_string)
            .collect()
    }
}

/// Jaccard index of two token sets. An empty union scores 0, so names with no
/// meaningful words never look alike.
pub fn jaccard_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

/// Tolerances for the nutritional closeness gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutritionTolerance {
    pub calories: f64,
    pub protein: f64,
}

impl Default for NutritionTolerance {
    fn default() -> Self {
        Self {
            calories: DEFAULT_CALORIE_TOLERANCE,
            protein: DEFAULT_PROTEIN_TOLERANCE,
        }
    }
}

impl NutritionTolerance {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [("calories", self.calories), ("protein", self.protein)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ValidationError::InvalidTolerance { field, value });
            }
        }
        Ok(())
    }

    /// Boolean gate: true when `candidate` and `anchor` are within tolerance on
    /// both calories and protein.
    ///
    /// Calories are compared relative to the larger of the two values. Protein is
    /// compared relative to the candidate's protein, floored at 1 g so that
    /// zero-protein foods do not divide by zero.
    pub fn is_similar(&self, candidate: &NutritionRecord, anchor: &NutritionRecord) -> bool {
        let calorie_base = candidate.calories().max(anchor.calories());
        let calorie_diff = if calorie_base > 0.0 {
            (candidate.calories() - anchor.calories()).abs() / calorie_base
        } else {
            0.0
        };

        let protein_diff =
            (candidate.protein() - anchor.protein()).abs() / candidate.protein().max(1.0);

        calorie_diff < self.calories && protein_diff < self.protein
    }
}
