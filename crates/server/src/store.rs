//! Report persistence.
//!
//! [`ReportStore`] is the seam the HTTP layer talks to; the bundled
//! [`InMemoryReportStore`] keeps reports in process memory and hands out
//! sequential `LOST-0001` / `FOUND-0001` style identifiers.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use matcher::{Category, MoneyDenomination, ReportKind, ReportRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid report: {0}")]
    Validation(String),
}

/// Submitted report, before an id is assigned.
///
/// Accepts both the neutral field names and the side-specific ones
/// (`lostPlace`, `foundDateTime`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
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
    #[serde(default)]
    pub total_amount: u64,
    #[serde(default, alias = "lostPlace", alias = "foundPlace")]
    pub place: String,
    #[serde(default, alias = "lostDateTime", alias = "foundDateTime")]
    pub occurred_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl NewReport {
    pub fn new(category: Category, place: impl Into<String>) -> Self {
        Self {
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
            place: place.into(),
            occurred_at: None,
            created_by: None,
        }
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if !self.category.is_known() {
            return Err(StoreError::Validation(format!(
                "category must be one of: {}",
                Category::KNOWN
                    .iter()
                    .map(|c| c.label())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
        if self.place.trim().is_empty() {
            return Err(StoreError::Validation("place is required".into()));
        }
        if let Some(d) = self.money_denominations.iter().find(|d| d.count == 0) {
            return Err(StoreError::Validation(format!(
                "denomination {} must have a count of at least 1",
                d.denomination
            )));
        }
        Ok(())
    }

    /// Materialise into a stored record. A missing timestamp becomes `now`.
    fn into_record(self, id: String, kind: ReportKind, now: DateTime<Utc>) -> ReportRecord {
        let mut record = ReportRecord::new(id, kind, self.category);
        record.item_name = self.item_name;
        record.brand = self.brand;
        record.model = self.model;
        record.book_title = self.book_title;
        record.author = self.author;
        record.roll_number = self.roll_number;
        record.person_name = self.person_name;
        record.material = self.material;
        record.description = self.description;
        record.money_denominations = self.money_denominations;
        record.total_amount = self.total_amount;
        record.place = self.place;
        record.occurred_at = Some(self.occurred_at.unwrap_or(now));
        record.created_by = self.created_by;
        record
    }
}

/// Persistence for lost and found reports.
pub trait ReportStore: Send + Sync {
    /// Validate and store a report, returning it with its assigned id.
    fn insert(&self, report: NewReport, kind: ReportKind) -> Result<ReportRecord, StoreError>;

    fn get(&self, kind: ReportKind, id: &str) -> Option<ReportRecord>;

    /// All reports of one kind in insertion order.
    fn list(&self, kind: ReportKind) -> Vec<ReportRecord>;

    /// Drop a report so later batches no longer see it.
    fn remove(&self, kind: ReportKind, id: &str) -> Option<ReportRecord>;

    fn len(&self, kind: ReportKind) -> usize;

    /// Report counts per known category, omitting empty ones.
    fn category_counts(&self, kind: ReportKind) -> Vec<CategoryCount>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

#[derive(Debug, Default)]
struct Shelf {
    next: AtomicU64,
    records: DashMap<String, (u64, ReportRecord)>,
}

impl Shelf {
    fn insert(&self, report: NewReport, kind: ReportKind) -> ReportRecord {
        let seq = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        let id = format!("{}-{:04}", kind.id_prefix(), seq);
        let record = report.into_record(id.clone(), kind, Utc::now());
        self.records.insert(id, (seq, record.clone()));
        record
    }

    fn list(&self) -> Vec<ReportRecord> {
        let mut rows: Vec<(u64, ReportRecord)> = self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by_key(|(seq, _)| *seq);
        rows.into_iter().map(|(_, record)| record).collect()
    }

    fn category_counts(&self) -> Vec<CategoryCount> {
        let mut counts = [0usize; Category::KNOWN.len()];
        for entry in self.records.iter() {
            let category = entry.value().1.category;
            if let Some(slot) = Category::KNOWN.iter().position(|c| *c == category) {
                counts[slot] += 1;
            }
        }
        Category::KNOWN
            .iter()
            .zip(counts)
            .filter(|(_, count)| *count > 0)
            .map(|(category, count)| CategoryCount {
                category: *category,
                count,
            })
            .collect()
    }
}

/// Process-local store backed by concurrent maps.
#[derive(Debug, Default)]
pub struct InMemoryReportStore {
    lost: Shelf,
    found: Shelf,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn shelf(&self, kind: ReportKind) -> &Shelf {
        match kind {
            ReportKind::Lost => &self.lost,
            ReportKind::Found => &self.found,
        }
    }
}

impl ReportStore for InMemoryReportStore {
    fn insert(&self, report: NewReport, kind: ReportKind) -> Result<ReportRecord, StoreError> {
        report.validate()?;
        let record = self.shelf(kind).insert(report, kind);
        tracing::debug!(id = %record.id, category = %record.category, "report stored");
        Ok(record)
    }

    fn get(&self, kind: ReportKind, id: &str) -> Option<ReportRecord> {
        self.shelf(kind)
            .records
            .get(id)
            .map(|entry| entry.value().1.clone())
    }

    fn list(&self, kind: ReportKind) -> Vec<ReportRecord> {
        self.shelf(kind).list()
    }

    fn remove(&self, kind: ReportKind, id: &str) -> Option<ReportRecord> {
        let (_, (_, record)) = self.shelf(kind).records.remove(id)?;
        tracing::debug!(id = %record.id, "report removed");
        Some(record)
    }

    fn len(&self, kind: ReportKind) -> usize {
        self.shelf(kind).records.len()
    }

    fn category_counts(&self, kind: ReportKind) -> Vec<CategoryCount> {
        self.shelf(kind).category_counts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn ids_are_sequential_per_kind() {
        let store = InMemoryReportStore::new();
        let a = store
            .insert(NewReport::new(Category::Books, "Library"), ReportKind::Lost)
            .unwrap();
        let b = store
            .insert(NewReport::new(Category::Books, "Library"), ReportKind::Lost)
            .unwrap();
        let c = store
            .insert(NewReport::new(Category::Books, "Library"), ReportKind::Found)
            .unwrap();
        assert_eq!(a.id, "LOST-0001");
        assert_eq!(b.id, "LOST-0002");
        assert_eq!(c.id, "FOUND-0001");
        assert_eq!(c.kind, ReportKind::Found);
    }

    #[test]
    fn list_preserves_insertion_order() {
        let store = InMemoryReportStore::new();
        for place in ["A", "B", "C", "D", "E"] {
            store
                .insert(NewReport::new(Category::Other, place), ReportKind::Found)
                .unwrap();
        }
        let places: Vec<String> = store
            .list(ReportKind::Found)
            .into_iter()
            .map(|r| r.place)
            .collect();
        assert_eq!(places, ["A", "B", "C", "D", "E"]);
        assert!(store.list(ReportKind::Lost).is_empty());
    }

    #[test]
    fn get_is_scoped_by_kind() {
        let store = InMemoryReportStore::new();
        let lost = store
            .insert(NewReport::new(Category::Money, "Gate"), ReportKind::Lost)
            .unwrap();
        assert_eq!(store.get(ReportKind::Lost, &lost.id), Some(lost.clone()));
        assert_eq!(store.get(ReportKind::Found, &lost.id), None);
    }

    #[test]
    fn removed_reports_leave_listing_and_keep_ids_unique() {
        let store = InMemoryReportStore::new();
        for place in ["A", "B", "C"] {
            store
                .insert(NewReport::new(Category::Books, place), ReportKind::Lost)
                .unwrap();
        }
        let removed = store.remove(ReportKind::Lost, "LOST-0002").unwrap();
        assert_eq!(removed.place, "B");
        assert!(store.remove(ReportKind::Lost, "LOST-0002").is_none());
        assert!(store.remove(ReportKind::Found, "LOST-0001").is_none());
        assert_eq!(store.len(ReportKind::Lost), 2);

        let next = store
            .insert(NewReport::new(Category::Books, "D"), ReportKind::Lost)
            .unwrap();
        assert_eq!(next.id, "LOST-0004");
        let ids: Vec<String> = store.list(ReportKind::Lost).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, ["LOST-0001", "LOST-0003", "LOST-0004"]);
    }

    #[test]
    fn category_counts_follow_known_order() {
        let store = InMemoryReportStore::new();
        for category in [Category::Books, Category::Money, Category::Books] {
            store
                .insert(NewReport::new(category, "Hall"), ReportKind::Found)
                .unwrap();
        }
        assert_eq!(
            store.category_counts(ReportKind::Found),
            vec![
                CategoryCount { category: Category::Money, count: 1 },
                CategoryCount { category: Category::Books, count: 2 },
            ]
        );
        assert!(store.category_counts(ReportKind::Lost).is_empty());
    }

    #[test]
    fn missing_timestamp_defaults_to_now() {
        let store = InMemoryReportStore::new();
        let before = Utc::now();
        let record = store
            .insert(NewReport::new(Category::Books, "Library"), ReportKind::Lost)
            .unwrap();
        let at = record.occurred_at.expect("timestamp assigned");
        assert!(at >= before && at <= Utc::now());
    }

    #[test]
    fn validation_rejects_bad_reports() {
        let store = InMemoryReportStore::new();
        let blank = NewReport::new(Category::Books, "   ");
        assert!(store.insert(blank, ReportKind::Lost).is_err());

        let mut zero = NewReport::new(Category::Money, "Gate");
        zero.money_denominations = vec![MoneyDenomination::new("500", 0)];
        let err = store.insert(zero, ReportKind::Lost).unwrap_err();
        assert!(err.to_string().contains("500"));

        let unknown = NewReport::new(Category::Unknown, "Gate");
        assert!(store.insert(unknown, ReportKind::Found).is_err());
        assert_eq!(store.len(ReportKind::Lost), 0);
        assert_eq!(store.len(ReportKind::Found), 0);
    }

    #[test]
    fn side_specific_json_fields_are_accepted() {
        let report: NewReport = serde_json::from_value(serde_json::json!({
            "category": "ID Cards",
            "name": "Asha",
            "rollNumber": "21CS042",
            "foundPlace": "Main Gate",
            "foundDateTime": "2024-03-01T09:30:00Z"
        }))
        .unwrap();
        assert_eq!(report.category, Category::IdCard);
        assert_eq!(report.person_name, "Asha");
        assert_eq!(report.place, "Main Gate");
        assert!(report.occurred_at.is_some());
    }

    #[test]
    fn concurrent_inserts_get_unique_ids() {
        let store = Arc::new(InMemoryReportStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        store
                            .insert(NewReport::new(Category::Other, "Hall"), ReportKind::Lost)
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let ids: std::collections::HashSet<String> =
            store.list(ReportKind::Lost).into_iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 200);
        assert!(ids.contains("LOST-0200"));
    }
}
