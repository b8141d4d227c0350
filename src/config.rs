use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::api_connection::endpoints::DEFAULT_ANALYSIS_MODEL;
use crate::goals::GoalContext;

// Environment variable names
pub const API_KEY_ENV_VAR: &str = "OPENROUTER_API_KEY";
const LOG_LEVEL_ENV_VAR: &str = "MEAL_INSIGHTS_LOG_LEVEL";
const LOG_FORMAT_ENV_VAR: &str = "MEAL_INSIGHTS_LOG_FORMAT";
const TARGET_CALORIES_ENV_VAR: &str = "MEAL_INSIGHTS_TARGET_CALORIES";
const TARGET_PROTEIN_ENV_VAR: &str = "MEAL_INSIGHTS_TARGET_PROTEIN";
const MAINTENANCE_ENV_VAR: &str = "MEAL_INSIGHTS_MAINTENANCE_CALORIES";
const MODEL_ENV_VAR: &str = "MEAL_INSIGHTS_MODEL";

pub const DEFAULT_TARGET_CALORIES: f64 = 2000.0;
pub const DEFAULT_TARGET_PROTEIN: f64 = 120.0;
pub const DEFAULT_MAINTENANCE_CALORIES: f64 = 2000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Invalid {
                key: LOG_FORMAT_ENV_VAR,
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for `{key}`: `{value}`")]
    Invalid { key: &'static str, value: String },
    #[error("invalid goals: {0}")]
    Goals(#[from] crate::errors::ValidationError),
}

/// Runtime settings for the binary. The library functions take their inputs
/// explicitly and never read the environment.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub log_level: String,
    pub log_format: LogFormat,
    pub model: String,
    pub target_calories: f64,
    pub target_protein: f64,
    pub maintenance_calories: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
            model: DEFAULT_ANALYSIS_MODEL.to_string(),
            target_calories: DEFAULT_TARGET_CALORIES,
            target_protein: DEFAULT_TARGET_PROTEIN,
            maintenance_calories: DEFAULT_MAINTENANCE_CALORIES,
        }
    }
}

fn parse_number(key: &'static str, value: &str) -> Result<f64, ConfigError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ConfigError::Invalid {
            key,
            value: value.to_string(),
        })
}

impl AppConfig {
    /// Loads `.env` if present, then applies environment overrides on top of defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, so tests need not touch
    /// the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(level) = lookup(LOG_LEVEL_ENV_VAR) {
            config.log_level = level.trim().to_string();
        }
        if let Some(format) = lookup(LOG_FORMAT_ENV_VAR) {
            config.log_format = format.parse()?;
        }
        if let Some(model) = lookup(MODEL_ENV_VAR) {
            config.model = model.trim().to_string();
        }
        if let Some(value) = lookup(TARGET_CALORIES_ENV_VAR) {
            config.target_calories = parse_number(TARGET_CALORIES_ENV_VAR, &value)?;
        }
        if let Some(value) = lookup(TARGET_PROTEIN_ENV_VAR) {
            config.target_protein = parse_number(TARGET_PROTEIN_ENV_VAR, &value)?;
        }
        if let Some(value) = lookup(MAINTENANCE_ENV_VAR) {
            config.maintenance_calories = parse_number(MAINTENANCE_ENV_VAR, &value)?;
        }

        config.goals()?;
        Ok(config)
    }

    pub fn goals(&self) -> Result<GoalContext, ConfigError> {
        Ok(GoalContext::new(self.target_calories, self.target_protein, self.maintenance_calories)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (TARGET_CALORIES_ENV_VAR, "1800"),
            (TARGET_PROTEIN_ENV_VAR, " 150 "),
            (MAINTENANCE_ENV_VAR, "2200"),
            (LOG_FORMAT_ENV_VAR, "JSON"),
            (LOG_LEVEL_ENV_VAR, "debug"),
        ]))
        .unwrap();
        assert_eq!(config.target_calories, 1800.0);
        assert_eq!(config.target_protein, 150.0);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.goals().unwrap().direction(), crate::goals::GoalDirection::Deficit);
    }

    #[test]
    fn test_invalid_number_is_reported() {
        let err =
            AppConfig::from_lookup(lookup_from(&[(TARGET_PROTEIN_ENV_VAR, "lots")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: TARGET_PROTEIN_ENV_VAR,
                value: "lots".to_string(),
            }
        );
    }

    #[test]
    fn test_negative_goal_is_reported() {
        let err =
            AppConfig::from_lookup(lookup_from(&[(MAINTENANCE_ENV_VAR, "-2000")])).unwrap_err();
        assert!(matches!(err, ConfigError::Goals(_)));
    }

    #[test]
    fn test_unknown_log_format() {
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
