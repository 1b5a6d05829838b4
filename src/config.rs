//! YAML configuration file support.
//!
//! One YAML document tunes the whole matching engine: classification and
//! notification thresholds, comparator tiers, batch parallelism and,
//! optionally, replacement weight tables.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "campus-default"
//!
//! matcher:
//!   strong_threshold: 80
//!   possible_threshold: 60
//!   notify_threshold: 70
//!   parallelism: 4
//!   bucket_by_category: true
//!   place:
//!     vocabulary: [building, floor, room, hall, campus, area, street, road, block]
//!   date:
//!     near_days: 3
//!     week_days: 7
//!
//! # Optional: omit to use the built-in tables.
//! scoring:
//!   tables:
//!     - category: "ID Cards"
//!       rules:
//!         - { field: roll_number, comparator: { type: text, partial_ratio: 0.6 }, max_points: 60 }
//!         - { field: person_name, comparator: { type: text, partial_ratio: 0.75 }, max_points: 20 }
//!         - { field: place, comparator: { type: place }, max_points: 20 }
//! ```
//!
//! A partial `scoring` section replaces only the tables it names; the other
//! categories keep their built-in tables.

use std::fs;
use std::path::Path;

use matcher::{MatchConfig, MatchError, Matcher, ScoringPolicy, WeightTable};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(#[from] MatchError),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for the matching engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LostFoundConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    /// Thresholds, comparator tiers and batch settings
    #[serde(default)]
    pub matcher: MatchConfig,

    /// Weight-table overrides, merged over the built-in tables by category
    #[serde(default)]
    pub scoring: Option<ScoringOverrides>,
}

/// Replacement weight tables keyed by their category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringOverrides {
    #[serde(default)]
    pub tables: Vec<WeightTable>,
}

impl LostFoundConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: LostFoundConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.matcher.validate()?;
        self.scoring_policy().validate()?;
        Ok(())
    }

    /// Built-in weight tables with any configured overrides applied.
    pub fn scoring_policy(&self) -> ScoringPolicy {
        let mut policy = ScoringPolicy::default();
        let Some(overrides) = &self.scoring else {
            return policy;
        };
        for table in &overrides.tables {
            match policy
                .tables
                .iter_mut()
                .find(|t| t.category == table.category)
            {
                Some(slot) => *slot = table.clone(),
                None => policy.tables.push(table.clone()),
            }
        }
        policy
    }

    /// Build a matcher from this configuration.
    pub fn build_matcher(&self) -> Result<Matcher, ConfigLoadError> {
        let matcher = Matcher::with_policy(self.matcher.clone(), self.scoring_policy())?;
        tracing::debug!(
            name = self.name.as_deref().unwrap_or("unnamed"),
            parallelism = self.matcher.parallelism,
            bucket_by_category = self.matcher.bucket_by_category,
            "matcher built from config"
        );
        Ok(matcher)
    }
}

impl Default for LostFoundConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            matcher: MatchConfig::default(),
            scoring: None,
        }
    }
}
