use serde::{Deserialize, Serialize};

use crate::types::{Classification, MatchError};

/// Tuning knobs for the comparators, classification and the batch run.
///
/// Every heuristic constant lives here so tests and deployments can override
/// them without touching comparator code. `MatchConfig` is cheap to clone and
/// serde-friendly; missing keys fall back to the production defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchConfig {
    /// Scores at or above this are a strong match.
    #[serde(default = "MatchConfig::default_strong_threshold")]
    pub strong_threshold: u32,
    /// Scores at or above this (and below `strong_threshold`) are a possible match.
    #[serde(default = "MatchConfig::default_possible_threshold")]
    pub possible_threshold: u32,
    /// Pairs at or above this are eligible for owner notification.
    #[serde(default = "MatchConfig::default_notify_threshold")]
    pub notify_threshold: u32,
    #[serde(default)]
    pub text: TextTiers,
    #[serde(default)]
    pub place: PlaceTiers,
    #[serde(default)]
    pub date: DateTiers,
    #[serde(default)]
    pub amount: AmountTiers,
    /// Worker threads for batch scoring: `0` uses the shared rayon pool,
    /// `1` scores sequentially, `n` builds a dedicated pool of `n` threads.
    #[serde(default)]
    pub parallelism: usize,
    /// Skip pairs whose categories differ instead of scoring them to zero.
    #[serde(default)]
    pub bucket_by_category: bool,
}

impl MatchConfig {
    pub(crate) fn default_strong_threshold() -> u32 {
        80
    }

    pub(crate) fn default_possible_threshold() -> u32 {
        60
    }

    pub(crate) fn default_notify_threshold() -> u32 {
        70
    }

    /// Map a final score onto its tier.
    pub fn classify(&self, score: u32) -> Classification {
        if score >= self.strong_threshold {
            Classification::StrongMatch
        } else if score >= self.possible_threshold {
            Classification::PossibleMatch
        } else {
            Classification::WeakOrNoMatch
        }
    }

    /// Validate thresholds and tier settings.
    pub fn validate(&self) -> Result<(), MatchError> {
        for (name, value) in [
            ("strong_threshold", self.strong_threshold),
            ("possible_threshold", self.possible_threshold),
            ("notify_threshold", self.notify_threshold),
        ] {
            if value > 100 {
                return Err(MatchError::InvalidConfig(format!(
                    "{name} must be <= 100"
                )));
            }
        }
        if self.possible_threshold > self.strong_threshold {
            return Err(MatchError::InvalidConfig(
                "possible_threshold must not exceed strong_threshold".into(),
            ));
        }

        check_ratio("text.keyword_ratio", self.text.keyword_ratio)?;
        if self.text.keyword_min_shared == 0 {
            return Err(MatchError::InvalidConfig(
                "text.keyword_min_shared must be >= 1".into(),
            ));
        }

        check_ratio("place.partial_ratio", self.place.partial_ratio)?;
        check_ratio("place.vocabulary_ratio", self.place.vocabulary_ratio)?;

        check_ratio("date.near_ratio", self.date.near_ratio)?;
        check_ratio("date.week_ratio", self.date.week_ratio)?;
        if self.date.near_days > self.date.week_days {
            return Err(MatchError::InvalidConfig(
                "date.near_days must not exceed date.week_days".into(),
            ));
        }

        let mut previous = 0.0_f64;
        for band in &self.amount.bands {
            check_ratio("amount.bands[].ratio", band.ratio)?;
            if !(band.max_percent_diff > 0.0 && band.max_percent_diff <= 100.0) {
                return Err(MatchError::InvalidConfig(
                    "amount.bands[].max_percent_diff must be in (0, 100]".into(),
                ));
            }
            if band.max_percent_diff <= previous {
                return Err(MatchError::InvalidConfig(
                    "amount.bands must be sorted by ascending max_percent_diff".into(),
                ));
            }
            previous = band.max_percent_diff;
        }

        Ok(())
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            strong_threshold: Self::default_strong_threshold(),
            possible_threshold: Self::default_possible_threshold(),
            notify_threshold: Self::default_notify_threshold(),
            text: TextTiers::default(),
            place: PlaceTiers::default(),
            date: DateTiers::default(),
            amount: AmountTiers::default(),
            parallelism: 0,
            bucket_by_category: false,
        }
    }
}

fn check_ratio(name: &str, value: f64) -> Result<(), MatchError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(MatchError::InvalidConfig(format!(
            "{name} must be between 0.0 and 1.0"
        )));
    }
    Ok(())
}

/// Shared-keyword tier of the free-text comparator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextTiers {
    pub keyword_ratio: f64,
    /// Tokens shorter than this (in characters) are ignored.
    pub keyword_min_len: usize,
    pub keyword_min_shared: usize,
    /// How many shared keywords to list in the reason.
    pub keyword_reason_limit: usize,
}

impl Default for TextTiers {
    fn default() -> Self {
        Self {
            keyword_ratio: 0.3,
            keyword_min_len: 4,
            keyword_min_shared: 2,
            keyword_reason_limit: 3,
        }
    }
}

/// Place comparator tiers and its locative vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlaceTiers {
    pub partial_ratio: f64,
    pub vocabulary_ratio: f64,
    pub vocabulary: Vec<String>,
}

impl Default for PlaceTiers {
    fn default() -> Self {
        Self {
            partial_ratio: 0.75,
            vocabulary_ratio: 0.5,
            vocabulary: [
                "building", "floor", "room", "hall", "campus", "area", "street", "road",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Date proximity windows, in whole days.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DateTiers {
    pub near_days: i64,
    pub near_ratio: f64,
    pub week_days: i64,
    pub week_ratio: f64,
}

impl Default for DateTiers {
    fn default() -> Self {
        Self {
            near_days: 3,
            near_ratio: 0.67,
            week_days: 7,
            week_ratio: 0.33,
        }
    }
}

/// One closeness band of the amount comparator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AmountBand {
    /// Inclusive upper bound on the percentage difference.
    pub max_percent_diff: f64,
    pub ratio: f64,
}

/// Amount closeness bands, checked in ascending order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AmountTiers {
    pub bands: Vec<AmountBand>,
}

impl Default for AmountTiers {
    fn default() -> Self {
        Self {
            bands: vec![
                AmountBand {
                    max_percent_diff: 10.0,
                    ratio: 0.8,
                },
                AmountBand {
                    max_percent_diff: 25.0,
                    ratio: 0.6,
                },
                AmountBand {
                    max_percent_diff: 50.0,
                    ratio: 0.4,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = MatchConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.notify_threshold, 70);
        assert_eq!(cfg.place.vocabulary.len(), 8);
    }

    #[test]
    fn classify_uses_tier_boundaries() {
        let cfg = MatchConfig::default();
        assert_eq!(cfg.classify(100), Classification::StrongMatch);
        assert_eq!(cfg.classify(80), Classification::StrongMatch);
        assert_eq!(cfg.classify(79), Classification::PossibleMatch);
        assert_eq!(cfg.classify(60), Classification::PossibleMatch);
        assert_eq!(cfg.classify(59), Classification::WeakOrNoMatch);
        assert_eq!(cfg.classify(0), Classification::WeakOrNoMatch);
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let cfg = MatchConfig {
            possible_threshold: 90,
            ..MatchConfig::default()
        };
        let err = cfg.validate().expect_err("config should be invalid");
        match err {
            MatchError::InvalidConfig(msg) => assert!(msg.contains("possible_threshold")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn out_of_range_ratio_rejected() {
        let mut cfg = MatchConfig::default();
        cfg.place.partial_ratio = 1.5;
        let err = cfg.validate().expect_err("config should be invalid");
        match err {
            MatchError::InvalidConfig(msg) => assert!(msg.contains("place.partial_ratio")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unsorted_amount_bands_rejected() {
        let mut cfg = MatchConfig::default();
        cfg.amount.bands.reverse();
        assert!(matches!(
            cfg.validate(),
            Err(MatchError::InvalidConfig(msg)) if msg.contains("ascending")
        ));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: MatchConfig =
            serde_json::from_str(r#"{"notify_threshold": 75, "date": {"near_days": 2}}"#).unwrap();
        assert_eq!(cfg.notify_threshold, 75);
        assert_eq!(cfg.strong_threshold, 80);
        assert_eq!(cfg.date.near_days, 2);
        assert_eq!(cfg.date.week_days, 7);
        assert!(cfg.validate().is_ok());
    }
}
