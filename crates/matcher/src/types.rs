use chrono::{DateTime, Utc};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed classification of a report. Drives which weight table applies.
///
/// Wire labels follow the reporting forms (`"ID Cards"`, `"Others"`); labels
/// outside the set deserialize to [`Category::Unknown`] so a stray record
/// degrades to a labeled zero score instead of failing the whole batch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Money,
    Electronics,
    Accessories,
    Books,
    #[serde(rename = "ID Cards", alias = "IDCard", alias = "ID Card")]
    IdCard,
    #[serde(rename = "Others", alias = "Other")]
    Other,
    #[serde(other)]
    Unknown,
}

impl Category {
    /// Every category that has a weight table.
    pub const KNOWN: [Category; 6] = [
        Category::Money,
        Category::Electronics,
        Category::Accessories,
        Category::Books,
        Category::IdCard,
        Category::Other,
    ];

    pub fn is_known(self) -> bool {
        !matches!(self, Category::Unknown)
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Money => "Money",
            Category::Electronics => "Electronics",
            Category::Accessories => "Accessories",
            Category::Books => "Books",
            Category::IdCard => "ID Cards",
            Category::Other => "Others",
            Category::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which side of the board a report was filed on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Lost,
    Found,
}

impl ReportKind {
    /// Prefix used for human-facing report identifiers.
    pub fn id_prefix(self) -> &'static str {
        match self {
            ReportKind::Lost => "LOST",
            ReportKind::Found => "FOUND",
        }
    }
}

/// One line of a money report: a currency-unit label and how many notes/coins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoneyDenomination {
    pub denomination: String,
    pub count: u32,
}

impl MoneyDenomination {
    pub fn new(denomination: impl Into<String>, count: u32) -> Self {
        Self {
            denomination: denomination.into(),
            count,
        }
    }
}

/// A lost or found report as supplied by the persistence layer.
///
/// Free-text fields default to empty; an empty (or blank) field counts as
/// absent for every comparator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    #[serde(alias = "customId")]
    pub id: String,
    pub kind: ReportKind,
    pub category: Category,
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub book_title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub roll_number: String,
    #[serde(default, alias = "name")]
    pub person_name: String,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub money_denominations: Vec<MoneyDenomination>,
    /// Stored as reported; never re-derived from `money_denominations`.
    #[serde(default)]
    pub total_amount: u64,
    #[serde(default, alias = "lostPlace", alias = "foundPlace")]
    pub place: String,
    #[serde(default, alias = "lostDateTime", alias = "foundDateTime")]
    pub occurred_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl ReportRecord {
    /// Empty record of the given kind and category.
    pub fn new(id: impl Into<String>, kind: ReportKind, category: Category) -> Self {
        Self {
            id: id.into(),
            kind,
            category,
            item_name: String::new(),
            brand: String::new(),
            model: String::new(),
            book_title: String::new(),
            author: String::new(),
            roll_number: String::new(),
            person_name: String::new(),
            material: String::new(),
            description: String::new(),
            money_denominations: Vec::new(),
            total_amount: 0,
            place: String::new(),
            occurred_at: None,
            created_by: None,
        }
    }

    pub fn lost(id: impl Into<String>, category: Category) -> Self {
        Self::new(id, ReportKind::Lost, category)
    }

    pub fn found(id: impl Into<String>, category: Category) -> Self {
        Self::new(id, ReportKind::Found, category)
    }

    /// Best short name for messages: item name, then book title.
    pub fn display_name(&self) -> Option<&str> {
        [self.item_name.as_str(), self.book_title.as_str()]
            .into_iter()
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

/// Tier label attached to every score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Classification {
    #[serde(rename = "Strong Match")]
    StrongMatch,
    #[serde(rename = "Possible Match")]
    PossibleMatch,
    #[serde(rename = "Weak or No Match")]
    WeakOrNoMatch,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Classification::StrongMatch => "Strong Match",
            Classification::PossibleMatch => "Possible Match",
            Classification::WeakOrNoMatch => "Weak or No Match",
        };
        f.write_str(label)
    }
}

/// Score of one (lost, found) pair. A computed view; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchResult {
    /// Final score in `0..=100`.
    pub score: u32,
    /// Human-readable reasons in weight-table order.
    pub reasons: Vec<String>,
    pub classification: Classification,
}

impl MatchResult {
    /// Zero-score result carrying a single explanatory reason.
    pub fn rejected(reason: &str) -> Self {
        Self {
            score: 0,
            reasons: vec![reason.to_string()],
            classification: Classification::WeakOrNoMatch,
        }
    }
}

/// One scored (lost, found) combination from a batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct PairCandidate {
    pub lost: ReportRecord,
    pub found: ReportRecord,
    pub result: MatchResult,
}

impl PairCandidate {
    pub fn score(&self) -> u32 {
        self.result.score
    }
}

/// Wire shape consumed by the presentation layer.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PairCandidateView<'a> {
    match_percentage: u32,
    reasons: &'a [String],
    classification: Classification,
    lost_item: &'a ReportRecord,
    found_item: &'a ReportRecord,
}

impl Serialize for PairCandidate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PairCandidateView {
            match_percentage: self.result.score,
            reasons: &self.result.reasons,
            classification: self.result.classification,
            lost_item: &self.lost,
            found_item: &self.found,
        }
        .serialize(serializer)
    }
}

/// Output of [`Matcher::run_batch`](crate::Matcher::run_batch).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    /// Retained pairs (score > 0), best first, ties in input order.
    pub candidates: Vec<PairCandidate>,
    /// Threshold the notification subset was cut at.
    pub notify_threshold: u32,
    /// Number of pairs actually scored (smaller than the cross product only
    /// when category bucketing is enabled).
    pub pairs_evaluated: usize,
}

impl BatchOutcome {
    /// Pairs eligible for notification, in ranking order.
    pub fn notification_subset(&self) -> impl Iterator<Item = &PairCandidate> {
        let threshold = self.notify_threshold;
        self.candidates
            .iter()
            .filter(move |c| c.result.score >= threshold)
    }

    pub fn total_matches(&self) -> usize {
        self.candidates.len()
    }

    pub fn high_confidence_count(&self) -> usize {
        self.notification_subset().count()
    }
}

/// Errors produced by the matching layer.
///
/// Scoring never fails; these only surface while building a [`Matcher`](crate::Matcher).
#[derive(Debug, Error)]
pub enum MatchError {
    /// Invalid thresholds, tiers or parallelism settings.
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
    /// A weight table is missing, malformed or does not total 100.
    #[error("invalid scoring policy: {0}")]
    InvalidPolicy(String),
    /// Dedicated worker pool could not be started.
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}
