//! Quick-add suggestions derived from repeated food log entries.

pub mod clustering;
pub mod similarity;

pub use clustering::{
    find_frequent_items, ClusterOptions, FrequentItemCluster, DEFAULT_MAX_ITEMS,
    DEFAULT_MIN_OCCURRENCES, DEFAULT_SIMILARITY_THRESHOLD,
};
pub use similarity::{jaccard_similarity, NutritionTolerance, Tokenizer, DEFAULT_STOP_WORDS};
