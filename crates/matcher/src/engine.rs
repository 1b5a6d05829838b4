use std::collections::HashMap;
use std::time::Instant;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info};

use crate::config::MatchConfig;
use crate::metrics::{metrics_recorder, BatchStats};
use crate::scorer::ScoringPolicy;
use crate::types::{BatchOutcome, Category, MatchError, MatchResult, PairCandidate, ReportRecord};


/// Batch orchestrator: scores every (lost, found) pair and ranks the survivors.
///
/// A `Matcher` holds only immutable configuration (plus an optional worker
/// pool), so one instance can be shared across threads and requests. Each
/// call to [`Matcher::run_batch`] is independent and reproducible.
pub struct Matcher {
    config: MatchConfig,
    policy: ScoringPolicy,
    pool: Option<ThreadPool>,
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher")
            .field("config", &self.config)
            .field("tables", &self.policy.tables.len())
            .field("dedicated_pool", &self.pool.is_some())
            .finish()
    }
}

impl Matcher {
    /// Construct a matcher with the default weight tables.
    pub fn new(config: MatchConfig) -> Result<Self, MatchError> {
        Self::with_policy(config, ScoringPolicy::default())
    }

    /// Construct a matcher from explicit config and weight tables.
    pub fn with_policy(config: MatchConfig, policy: ScoringPolicy) -> Result<Self, MatchError> {
        config.validate()?;
        policy.validate()?;

        let pool = if config.parallelism > 1 {
            let pool = ThreadPoolBuilder::new()
                .num_threads(config.parallelism)
                .thread_name(|i| format!("lostfound-match-{i}"))
                .build()
                .map_err(|e| MatchError::ThreadPool(e.to_string()))?;
            Some(pool)
        } else {
            None
        };

        Ok(Self {
            config,
            policy,
            pool,
        })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Score a single pair.
    pub fn score(&self, lost: &ReportRecord, found: &ReportRecord) -> MatchResult {
        self.policy.score(lost, found, &self.config)
    }

    /// Score the full lost × found cross product.
    ///
    /// Pairs scoring zero are dropped. Survivors are ordered by descending
    /// score; equal scores keep input order (lost outer, found inner) no
    /// matter how the work was scheduled.
    pub fn run_batch(&self, lost: &[ReportRecord], found: &[ReportRecord]) -> BatchOutcome {
        let start = Instant::now();
        let _span = tracing::debug_span!(
            "run_batch",
            lost = lost.len(),
            found = found.len()
        )
        .entered();

        let pairs = self.plan_pairs(lost, found);
        let pairs_evaluated = pairs.len();
        debug!(pairs = pairs_evaluated, "scoring pairs");

        let evaluate = |&(li, fi): &(usize, usize)| -> Option<(usize, PairCandidate)> {
            let (l, f) = (&lost[li], &found[fi]);
            let result = self.score(l, f);
            (result.score > 0).then(|| {
                (
                    li * found.len() + fi,
                    PairCandidate {
                        lost: l.clone(),
                        found: f.clone(),
                        result,
                    },
                )
            })
        };

        let mut scored: Vec<(usize, PairCandidate)> = match (&self.pool, self.config.parallelism) {
            (_, 1) => pairs.iter().filter_map(evaluate).collect(),
            (Some(pool), _) => pool.install(|| pairs.par_iter().filter_map(evaluate).collect()),
            (None, _) => pairs.par_iter().filter_map(evaluate).collect(),
        };

        // Fan-in: every pair is fully scored before ordering. The ordinal
        // restores input order among equal scores.
        scored.sort_by(|(ord_a, a), (ord_b, b)| {
            b.result
                .score
                .cmp(&a.result.score)
                .then_with(|| ord_a.cmp(ord_b))
        });

        let outcome = BatchOutcome {
            candidates: scored.into_iter().map(|(_, c)| c).collect(),
            notify_threshold: self.config.notify_threshold,
            pairs_evaluated,
        };

        let notify_eligible = outcome.high_confidence_count();
        let latency = start.elapsed();
        info!(
            lost = lost.len(),
            found = found.len(),
            evaluated = pairs_evaluated,
            retained = outcome.total_matches(),
            notify_eligible,
            latency_ms = latency.as_millis() as u64,
            "batch matched"
        );

        if let Some(recorder) = metrics_recorder() {
            recorder.record_batch(&BatchStats {
                lost: lost.len(),
                found: found.len(),
                evaluated: pairs_evaluated,
                retained: outcome.total_matches(),
                notify_eligible,
                latency,
            });
        }

        outcome
    }

    /// Index pairs to score, in lost-outer / found-inner order.
    fn plan_pairs(&self, lost: &[ReportRecord], found: &[ReportRecord]) -> Vec<(usize, usize)> {
        if !self.config.bucket_by_category {
            return (0..lost.len())
                .flat_map(|li| (0..found.len()).map(move |fi| (li, fi)))
                .collect();
        }

        let mut buckets: HashMap<Category, Vec<usize>> = HashMap::new();
        for (fi, record) in found.iter().enumerate() {
            buckets.entry(record.category).or_default().push(fi);
        }
        lost.iter()
            .enumerate()
            .flat_map(|(li, record)| {
                buckets
                    .get(&record.category)
                    .into_iter()
                    .flatten()
                    .map(move |&fi| (li, fi))
            })
            .collect()
    }
}
