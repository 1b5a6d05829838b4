//! Workspace umbrella crate for lost & found matching.
//!
//! Re-exports the matching engine and adds file-based configuration so
//! callers (the HTTP server, batch jobs, benches) can build a fully tuned
//! [`Matcher`] from a single YAML document.

pub mod config;

pub use config::{ConfigLoadError, LostFoundConfig};
pub use matcher::{
    BatchOutcome, BatchStats, Category, Classification, Comparator, Field, FieldRule,
    MatchConfig, MatchError, MatchMetrics, MatchResult, Matcher, MoneyDenomination,
    PairCandidate, ReportKind, ReportRecord, ScoringPolicy, WeightTable, set_match_metrics,
};

/// Build a matcher with default configuration and weight tables.
pub fn default_matcher() -> Result<Matcher, MatchError> {
    Matcher::new(MatchConfig::default())
}

/// Score a full lost × found batch with default settings.
pub fn run_default_batch(
    lost: &[ReportRecord],
    found: &[ReportRecord],
) -> Result<BatchOutcome, MatchError> {
    Ok(default_matcher()?.run_batch(lost, found))
}
