//! Category scoring driven by declarative weight tables.
//!
//! A [`ScoringPolicy`] holds one [`WeightTable`] per category. Each table is
//! an ordered list of [`FieldRule`]s naming a report field, the comparator
//! applied to it and the points it is worth; a single generic scorer walks
//! the table. Reasons come out in rule order.

use serde::{Deserialize, Serialize};

use crate::compare::{
    compare_amounts, compare_dates, compare_denominations, compare_places, compare_text,
    FieldScore,
};
use crate::config::MatchConfig;
use crate::types::{Category, MatchError, MatchResult, ReportRecord};

pub const CATEGORY_MISMATCH: &str = "Categories do not match";
pub const UNKNOWN_CATEGORY: &str = "Unknown category";

/// Report field a rule reads from both sides.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    ItemName,
    Brand,
    Model,
    BookTitle,
    Author,
    RollNumber,
    PersonName,
    Material,
    Description,
    Place,
    OccurredAt,
    Denominations,
    TotalAmount,
}

impl Field {
    /// Label used at the start of text reasons.
    pub fn label(self) -> &'static str {
        match self {
            Field::ItemName => "Item name",
            Field::Brand => "Brand",
            Field::Model => "Model",
            Field::BookTitle => "Book title",
            Field::Author => "Author",
            Field::RollNumber => "Roll number",
            Field::PersonName => "Name",
            Field::Material => "Material",
            Field::Description => "Description",
            Field::Place => "Location",
            Field::OccurredAt => "Date",
            Field::Denominations => "Denominations",
            Field::TotalAmount => "Total amount",
        }
    }

    fn text_of(self, record: &ReportRecord) -> Option<&str> {
        let value = match self {
            Field::ItemName => &record.item_name,
            Field::Brand => &record.brand,
            Field::Model => &record.model,
            Field::BookTitle => &record.book_title,
            Field::Author => &record.author,
            Field::RollNumber => &record.roll_number,
            Field::PersonName => &record.person_name,
            Field::Material => &record.material,
            Field::Description => &record.description,
            Field::Place => &record.place,
            Field::OccurredAt | Field::Denominations | Field::TotalAmount => return None,
        };
        Some(value.as_str())
    }
}

/// Comparator applied by a rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Comparator {
    /// Exact / containment / shared-keyword text comparison.
    Text {
        /// Share of the points awarded when one value contains the other.
        partial_ratio: f64,
    },
    Place,
    Date,
    Denominations,
    Amount,
}

impl Comparator {
    /// Text comparator with the usual containment share for names and titles.
    pub const NAME: Comparator = Comparator::Text {
        partial_ratio: 0.75,
    };
    /// Text comparator with the containment share used for descriptions.
    pub const DESCRIPTION: Comparator = Comparator::Text { partial_ratio: 0.7 };

    fn accepts(self, field: Field) -> bool {
        match self {
            Comparator::Text { .. } => {
                !matches!(field, Field::OccurredAt | Field::Denominations | Field::TotalAmount)
            }
            Comparator::Place => field == Field::Place,
            Comparator::Date => field == Field::OccurredAt,
            Comparator::Denominations => field == Field::Denominations,
            Comparator::Amount => field == Field::TotalAmount,
        }
    }
}

/// One weighted line of a category table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FieldRule {
    pub field: Field,
    pub comparator: Comparator,
    pub max_points: u32,
}

impl FieldRule {
    pub const fn new(field: Field, comparator: Comparator, max_points: u32) -> Self {
        Self {
            field,
            comparator,
            max_points,
        }
    }

    /// Evaluate this rule against one pair.
    pub fn evaluate(
        &self,
        lost: &ReportRecord,
        found: &ReportRecord,
        cfg: &MatchConfig,
    ) -> FieldScore {
        match self.comparator {
            Comparator::Text { partial_ratio } => {
                match (self.field.text_of(lost), self.field.text_of(found)) {
                    (Some(a), Some(b)) => compare_text(
                        self.field.label(),
                        a,
                        b,
                        self.max_points,
                        partial_ratio,
                        &cfg.text,
                    ),
                    _ => FieldScore::none(),
                }
            }
            Comparator::Place => compare_places(&lost.place, &found.place, self.max_points, &cfg.place),
            Comparator::Date => {
                compare_dates(lost.occurred_at, found.occurred_at, self.max_points, &cfg.date)
            }
            Comparator::Denominations => compare_denominations(
                &lost.money_denominations,
                &found.money_denominations,
                self.max_points,
            ),
            Comparator::Amount => compare_amounts(
                lost.total_amount,
                found.total_amount,
                self.max_points,
                &cfg.amount,
            ),
        }
    }
}

/// Ordered rules for one category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightTable {
    pub category: Category,
    pub rules: Vec<FieldRule>,
}

impl WeightTable {
    pub fn new(category: Category, rules: Vec<FieldRule>) -> Self {
        Self { category, rules }
    }

    /// Sum of every rule's `max_points`.
    pub fn total_points(&self) -> u32 {
        self.rules.iter().map(|r| r.max_points).sum()
    }

    fn validate(&self) -> Result<(), MatchError> {
        if !self.category.is_known() {
            return Err(MatchError::InvalidPolicy(
                "weight tables cannot target the unknown category".into(),
            ));
        }
        for rule in &self.rules {
            if !rule.comparator.accepts(rule.field) {
                return Err(MatchError::InvalidPolicy(format!(
                    "{}: comparator {:?} cannot score field {:?}",
                    self.category, rule.comparator, rule.field
                )));
            }
            if let Comparator::Text { partial_ratio } = rule.comparator {
                if !(0.0..=1.0).contains(&partial_ratio) {
                    return Err(MatchError::InvalidPolicy(format!(
                        "{}: partial_ratio for {:?} must be between 0.0 and 1.0",
                        self.category, rule.field
                    )));
                }
            }
        }
        let total = self.total_points();
        if total != 100 {
            return Err(MatchError::InvalidPolicy(format!(
                "{}: rule points total {total}, expected 100",
                self.category
            )));
        }
        Ok(())
    }
}

/// Weight tables for every category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringPolicy {
    pub tables: Vec<WeightTable>,
}

impl ScoringPolicy {
    pub fn table(&self, category: Category) -> Option<&WeightTable> {
        self.tables.iter().find(|t| t.category == category)
    }

    /// Require exactly one well-formed table per known category.
    pub fn validate(&self) -> Result<(), MatchError> {
        for table in &self.tables {
            table.validate()?;
        }
        for category in Category::KNOWN {
            let count = self.tables.iter().filter(|t| t.category == category).count();
            if count != 1 {
                return Err(MatchError::InvalidPolicy(format!(
                    "expected exactly one table for {category}, found {count}"
                )));
            }
        }
        Ok(())
    }

    /// Score one lost report against one found report.
    pub fn score(&self, lost: &ReportRecord, found: &ReportRecord, cfg: &MatchConfig) -> MatchResult {
        if lost.category != found.category {
            return MatchResult::rejected(CATEGORY_MISMATCH);
        }
        let Some(table) = self.table(lost.category) else {
            return MatchResult::rejected(UNKNOWN_CATEGORY);
        };

        let mut total = 0u32;
        let mut reasons = Vec::new();
        for rule in &table.rules {
            let FieldScore { points, reason } = rule.evaluate(lost, found, cfg);
            total += points;
            if let Some(reason) = reason {
                reasons.push(reason);
            }
        }

        // Rounded sub-scores may overshoot; cap after summing.
        let score = total.min(100);
        MatchResult {
            score,
            reasons,
            classification: cfg.classify(score),
        }
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        use Comparator::{Amount, Date, Denominations, Place};
        use Field::*;

        let name = Comparator::NAME;
        let desc = Comparator::DESCRIPTION;

        Self {
            tables: vec![
                WeightTable::new(
                    Category::Money,
                    vec![
                        FieldRule::new(ItemName, name, 10),
                        FieldRule::new(Field::Denominations, Denominations, 20),
                        FieldRule::new(TotalAmount, Amount, 25),
                        FieldRule::new(Field::Place, Place, 20),
                        FieldRule::new(OccurredAt, Date, 15),
                        FieldRule::new(Description, desc, 10),
                    ],
                ),
                WeightTable::new(
                    Category::Electronics,
                    vec![
                        FieldRule::new(ItemName, name, 30),
                        FieldRule::new(Brand, name, 30),
                        FieldRule::new(Model, name, 20),
                        FieldRule::new(Field::Place, Place, 10),
                        FieldRule::new(OccurredAt, Date, 10),
                    ],
                ),
                WeightTable::new(
                    Category::Accessories,
                    vec![
                        FieldRule::new(ItemName, name, 40),
                        FieldRule::new(Description, desc, 30),
                        FieldRule::new(Field::Place, Place, 15),
                        FieldRule::new(OccurredAt, Date, 15),
                    ],
                ),
                WeightTable::new(
                    Category::Books,
                    vec![
                        FieldRule::new(BookTitle, name, 40),
                        FieldRule::new(Author, name, 30),
                        FieldRule::new(Field::Place, Place, 15),
                        FieldRule::new(OccurredAt, Date, 15),
                    ],
                ),
                WeightTable::new(
                    Category::IdCard,
                    vec![
                        FieldRule::new(RollNumber, name, 50),
                        FieldRule::new(PersonName, name, 30),
                        FieldRule::new(Field::Place, Place, 20),
                    ],
                ),
                WeightTable::new(
                    Category::Other,
                    vec![
                        FieldRule::new(ItemName, name, 40),
                        FieldRule::new(Description, desc, 30),
                        FieldRule::new(Field::Place, Place, 15),
                        FieldRule::new(OccurredAt, Date, 15),
                    ],
                ),
            ],
        }
    }
}
