use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use super::similarity::{jaccard_similarity, NutritionTolerance, Tokenizer};
use crate::errors::ValidationError;
use crate::food_log::NutritionRecord;

pub const DEFAULT_MIN_OCCURRENCES: usize = 2;
pub const DEFAULT_MAX_ITEMS: usize = 8;
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;

/// Knobs for one clustering run. Build with [`ClusterOptions::default`] and the
/// `with_*` setters; [`find_frequent_items`] validates before running.
#[derive(Debug, Clone)]
pub struct ClusterOptions {
    pub min_occurrences: usize,
    pub max_items: usize,
    pub similarity_threshold: f64,
    pub tolerance: NutritionTolerance,
    pub tokenizer: Tokenizer,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            min_occurrences: DEFAULT_MIN_OCCURRENCES,
            max_items: DEFAULT_MAX_ITEMS,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            tolerance: NutritionTolerance::default(),
            tokenizer: Tokenizer::default(),
        }
    }
}

impl ClusterOptions {
    pub fn with_min_occurrences(mut self, min_occurrences: usize) -> Self {
        self.min_occurrences = min_occurrences;
        self
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_tolerance(mut self, tolerance: NutritionTolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let t = self.similarity_threshold;
        if !(t > 0.0 && t <= 1.0) {
            return Err(ValidationError::ThresholdOutOfRange(t));
        }
        self.tolerance.validate()
    }
}

/// A quick-add suggestion: a group of records judged to be the same food.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FrequentItemCluster {
    pub representative_name: String,
    pub average_calories: f64,
    pub average_protein: f64,
    pub occurrence_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

// The seed is the fixed comparison anchor for the cluster's whole life.
struct Cluster<'a> {
    seed: &'a NutritionRecord,
    seed_tokens: HashSet<String>,
    members: Vec<&'a NutritionRecord>,
}

impl<'a> Cluster<'a> {
    fn admits(
        &self,
        record: &NutritionRecord,
        tokens: &HashSet<String>,
        options: &ClusterOptions,
    ) -> bool {
        jaccard_similarity(tokens, &self.seed_tokens) >= options.similarity_threshold
            && options.tolerance.is_similar(record, self.seed)
    }

    fn finish(self) -> FrequentItemCluster {
        let count = self.members.len();
        let total_calories: f64 = self.members.iter().map(|r| r.calories()).sum();
        let total_protein: f64 = self.members.iter().map(|r| r.protein()).sum();
        FrequentItemCluster {
            representative_name: self.seed.name().to_string(),
            average_calories: round_half_up(total_calories / count as f64),
            average_protein: round_half_up(total_protein / count as f64),
            occurrence_count: count,
            image_ref: self.seed.image_ref().map(str::to_string),
            note: self.seed.note().map(str::to_string),
        }
    }
}

// Inputs are non-negative, so rounding half away from zero is half-up.
fn round_half_up(value: f64) -> f64 {
    value.round()
}

/// Groups repeated log entries into ranked quick-add suggestions.
///
/// Records are scanned once in input order. Each record joins the first
/// existing cluster whose seed record is both name-similar (Jaccard >=
/// threshold) and nutritionally similar; otherwise it seeds a new cluster.
/// Clusters below `min_occurrences` are dropped, the rest are stably sorted by
/// size (ties keep creation order) and truncated to `max_items`.
pub fn find_frequent_items(
    records: &[NutritionRecord],
    options: &ClusterOptions,
) -> Result<Vec<FrequentItemCluster>, ValidationError> {
    options.validate()?;

    let mut clusters: Vec<Cluster<'_>> = Vec::new();
    for record in records {
        let tokens = options.tokenizer.tokenize(record.name());
        match clusters.iter_mut().find(|c| c.admits(record, &tokens, options)) {
            Some(cluster) => cluster.members.push(record),
            None => clusters.push(Cluster {
                seed: record,
                seed_tokens: tokens,
                members: vec![record],
            }),
        }
    }
    let formed = clusters.len();

    let mut items: Vec<FrequentItemCluster> = clusters
        .into_iter()
        .filter(|c| c.members.len() >= options.min_occurrences)
        .map(Cluster::finish)
        .collect();
    items.sort_by(|a, b| b.occurrence_count.cmp(&a.occurrence_count));
    items.truncate(options.max_items);

    debug!(
        records = records.len(),
        clusters = formed,
        returned = items.len(),
        "Clustered food log into frequent items"
    );
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(name: &str, calories: f64, protein: f64) -> NutritionRecord {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        NutritionRecord::new(name, calories, protein, date).unwrap()
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let items = find_frequent_items(&[], &ClusterOptions::default()).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_chicken_rice_example() {
        let records = vec![
            record("chicken rice", 400.0, 30.0),
            record("chicken rice bowl", 410.0, 31.0),
            record("salad", 150.0, 5.0),
        ];
        let options = ClusterOptions::default().with_similarity_threshold(0.5);
        let items = find_frequent_items(&records, &options).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].representative_name, "chicken rice");
        assert_eq!(items[0].occurrence_count, 2);
        assert_eq!(items[0].average_calories, 405.0);
        assert_eq!(items[0].average_protein, 31.0);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // {"greek", "yogurt"} vs {"greek", "yogurt", "honey", "granola"}: 2 / 4 = 0.5
        let records = vec![
            record("greek yogurt", 200.0, 18.0),
            record("greek yogurt honey granola", 210.0, 18.0),
        ];
        let at = ClusterOptions::default().with_similarity_threshold(0.5);
        assert_eq!(find_frequent_items(&records, &at).unwrap().len(), 1);

        let above = ClusterOptions::default().with_similarity_threshold(0.51);
        assert!(find_frequent_items(&records, &above).unwrap().is_empty());
    }

    #[test]
    fn test_names_match_but_nutrition_differs() {
        let records = vec![record("pasta", 400.0, 12.0), record("pasta", 800.0, 24.0)];
        let items = find_frequent_items(&records, &ClusterOptions::default()).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_compares_against_seed_not_running_average() {
        // 100 -> 110 joins (10/110), 110 -> 120 would be fine against the
        // previous member but 20/120 against the 100 kcal seed is not.
        let records = vec![
            record("protein shake", 100.0, 20.0),
            record("protein shake", 110.0, 20.0),
            record("protein shake", 120.0, 20.0),
        ];
        let items = find_frequent_items(&records, &ClusterOptions::default()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].occurrence_count, 2);
        assert_eq!(items[0].average_calories, 105.0);
    }

    #[test]
    fn test_joins_first_matching_cluster() {
        let records = vec![
            record("banana", 100.0, 1.0),
            record("banana", 130.0, 1.0),
            // within tolerance of both seeds; must land in the first
            record("banana", 115.0, 1.0),
        ];
        let options = ClusterOptions::default().with_min_occurrences(1);
        let items = find_frequent_items(&records, &options).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].average_calories, 108.0);
        assert_eq!(items[0].occurrence_count, 2);
        assert_eq!(items[1].occurrence_count, 1);
    }

    #[test]
    fn test_empty_token_names_never_merge() {
        let records = vec![
            record("", 100.0, 5.0),
            record("", 100.0, 5.0),
            record("a an", 100.0, 5.0),
        ];
        let options = ClusterOptions::default().with_min_occurrences(1);
        let items = find_frequent_items(&records, &options).unwrap();
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|c| c.occurrence_count == 1));
    }

    #[test]
    fn test_carries_image_and_note_from_seed() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let seed = NutritionRecord::new("overnight oats", 350.0, 15.0, date)
            .unwrap()
            .with_image_ref(Some("photos/oats.jpg".to_string()))
            .with_note(Some("with berries".to_string()));
        let records = vec![seed, record("overnight oats", 360.0, 15.0)];
        let items = find_frequent_items(&records, &ClusterOptions::default()).unwrap();
        assert_eq!(items[0].image_ref.as_deref(), Some("photos/oats.jpg"));
        assert_eq!(items[0].note.as_deref(), Some("with berries"));
    }

    #[test]
    fn test_invalid_threshold_is_rejected() {
        for threshold in [0.0, -0.2, 1.01, f64::NAN] {
            let options = ClusterOptions::default().with_similarity_threshold(threshold);
            assert!(find_frequent_items(&[], &options).is_err());
        }
        let options = ClusterOptions::default().with_similarity_threshold(1.0);
        assert!(find_frequent_items(&[], &options).is_ok());
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(30.5), 31.0);
        assert_eq!(round_half_up(30.49), 30.0);
        assert_eq!(round_half_up(0.0), 0.0);
    }
}
