//! # Lost & Found Matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` scores how well a *lost* report matches a *found* report and
//! ranks every pairing of two report lists. It is pure: no I/O, no clock, no
//! shared mutable state beyond an optional metrics hook.
//!
//! ## Layers
//!
//! - [`compare`]: field comparators (text, place, date, denominations,
//!   amount) that award partial points plus a human-readable reason.
//! - [`scorer`]: declarative per-category [`WeightTable`]s consumed by one
//!   generic scorer, producing a capped 0–100 [`MatchResult`] with a
//!   [`Classification`] tier.
//! - [`Matcher`]: the batch orchestrator. Scores the lost × found cross
//!   product (optionally on a worker pool), drops zero scores, orders by
//!   descending score with input-order tie-breaks, and exposes the
//!   notification subset.
//!
//! ## Example Usage
//!
//! ```no_run
//! use matcher::{Category, MatchConfig, Matcher, ReportRecord};
//!
//! let matcher = Matcher::new(MatchConfig::default()).expect("valid config");
//!
//! let mut lost = ReportRecord::lost("LOST-0001", Category::Books);
//! lost.book_title = "Introduction to Algorithms".into();
//! let mut found = ReportRecord::found("FOUND-0001", Category::Books);
//! found.book_title = "Introduction to Algorithms".into();
//!
//! let outcome = matcher.run_batch(&[lost], &[found]);
//! for pair in outcome.notification_subset() {
//!     println!("{} -> {} ({}%)", pair.lost.id, pair.found.id, pair.score());
//! }
//! ```
//!
//! ## Observability
//!
//! Install a [`MatchMetrics`] implementation via [`set_match_metrics`] to
//! record per-batch sizes and latency. Batch summaries are also emitted as
//! `tracing` events.

pub mod compare;
pub mod config;
pub mod engine;
pub mod metrics;
pub mod scorer;
pub mod types;

pub use crate::config::{AmountBand, AmountTiers, DateTiers, MatchConfig, PlaceTiers, TextTiers};
pub use crate::engine::Matcher;
pub use crate::metrics::{set_match_metrics, BatchStats, MatchMetrics};
pub use crate::scorer::{
    Comparator, Field, FieldRule, ScoringPolicy, WeightTable, CATEGORY_MISMATCH, UNKNOWN_CATEGORY,
};
pub use crate::types::{
    BatchOutcome, Category, Classification, MatchError, MatchResult, MoneyDenomination,
    PairCandidate, ReportKind, ReportRecord,
};
