//! End-to-end scoring scenarios through the public crate API.

use chrono::{DateTime, Duration, TimeZone, Utc};
use lostfound::{
    default_matcher, run_default_batch, Category, Classification, LostFoundConfig,
    MoneyDenomination, ReportRecord,
};

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn money(id: &str, lost: bool, total: u64, notes: &[(&str, u32)]) -> ReportRecord {
    let mut r = if lost {
        ReportRecord::lost(id, Category::Money)
    } else {
        ReportRecord::found(id, Category::Money)
    };
    r.total_amount = total;
    r.money_denominations = notes
        .iter()
        .map(|(d, c)| MoneyDenomination::new(*d, *c))
        .collect();
    r.place = "Canteen".into();
    r.occurred_at = Some(at(2024, 3, 4, 12));
    r
}

#[test]
fn matching_cash_is_a_strong_match() {
    let lost = money("L", true, 1200, &[("500", 2), ("100", 2)]);
    let found = money("F", false, 1200, &[("100", 2), ("500", 2)]);

    let result = default_matcher().unwrap().score(&lost, &found);
    assert_eq!(result.score, 20 + 25 + 20 + 15);
    assert_eq!(result.classification, Classification::StrongMatch);
    assert_eq!(
        result.reasons,
        vec![
            "All denominations match exactly",
            "Total amount matches exactly",
            "Location matches exactly",
            "Same date",
        ]
    );
}

#[test]
fn cash_amount_bands() {
    let m = default_matcher().unwrap();
    let lost = money("L", true, 1000, &[]);

    let close = m.score(&lost, &money("F", false, 1050, &[]));
    assert!(close
        .reasons
        .contains(&"Total amount is very close (within 10%)".to_string()));
    assert_eq!(close.score, 20 + 20 + 15);

    let near = m.score(&lost, &money("F", false, 800, &[]));
    assert!(near
        .reasons
        .contains(&"Total amount is close (within 25%)".to_string()));
    assert_eq!(near.score, 15 + 20 + 15);

    let loose = m.score(&lost, &money("F", false, 600, &[]));
    assert_eq!(loose.score, 10 + 20 + 15);

    let far = m.score(&lost, &money("F", false, 100, &[]));
    assert_eq!(far.score, 20 + 15);
}

#[test]
fn phone_seen_two_days_later_nearby_is_notify_eligible() {
    let mut lost = ReportRecord::lost("L", Category::Electronics);
    lost.item_name = "Galaxy S21".into();
    lost.brand = "Samsung".into();
    lost.place = "Library Building".into();
    lost.occurred_at = Some(at(2024, 5, 10, 9));

    let mut found = ReportRecord::found("F", Category::Electronics);
    found.item_name = "galaxy s21".into();
    found.brand = "SAMSUNG".into();
    found.model = "SM-G991B".into();
    found.place = "Library".into();
    found.occurred_at = lost.occurred_at.map(|t| t + Duration::days(2));

    let outcome = run_default_batch(&[lost], &[found]).unwrap();
    let pair = &outcome.candidates[0];
    assert_eq!(pair.score(), 30 + 30 + 8 + 7);
    assert_eq!(pair.result.classification, Classification::PossibleMatch);
    assert_eq!(
        pair.result.reasons,
        vec![
            "Item name matches exactly",
            "Brand matches exactly",
            "Location partially matches",
            "Dates within 3 days",
        ]
    );
    assert_eq!(outcome.high_confidence_count(), 1);
}

#[test]
fn wallet_keywords_and_shared_building() {
    let mut lost = ReportRecord::lost("L", Category::Accessories);
    lost.item_name = "Black leather wallet".into();
    lost.place = "Main building lobby".into();
    lost.occurred_at = Some(at(2024, 6, 1, 8));

    let mut found = ReportRecord::found("F", Category::Accessories);
    found.item_name = "Wallet, leather (black)".into();
    found.place = "Science building".into();
    found.occurred_at = Some(at(2024, 6, 6, 18));

    let result = default_matcher().unwrap().score(&lost, &found);
    // "leather" is the only clean shared token; punctuation keeps the others apart.
    assert!(!result.reasons.iter().any(|r| r.starts_with("Common item name")));
    assert!(result
        .reasons
        .contains(&"Same area/location type: building".to_string()));
    assert!(result.reasons.contains(&"Dates within a week".to_string()));
    assert_eq!(result.score, 8 + 5);
}

#[test]
fn shared_keywords_earn_partial_credit() {
    let mut lost = ReportRecord::lost("L", Category::Other);
    lost.item_name = "blue steel water bottle".into();
    let mut found = ReportRecord::found("F", Category::Other);
    found.item_name = "steel bottle with blue lid water".into();

    let result = default_matcher().unwrap().score(&lost, &found);
    assert_eq!(result.score, 12);
    assert_eq!(
        result.reasons,
        vec!["Common item name keywords: blue, steel, water"]
    );
    assert_eq!(result.classification, Classification::WeakOrNoMatch);
}

#[test]
fn unknown_and_mismatched_categories_never_match() {
    let unknown: ReportRecord = serde_json::from_value(serde_json::json!({
        "id": "L9", "kind": "lost", "category": "Furniture", "itemName": "Chair"
    }))
    .unwrap();
    assert_eq!(unknown.category, Category::Unknown);

    let mut found = ReportRecord::found("F9", Category::Unknown);
    found.item_name = "Chair".into();

    let m = default_matcher().unwrap();
    let result = m.score(&unknown, &found);
    assert_eq!(result.score, 0);
    assert_eq!(result.reasons, vec!["Unknown category"]);

    let outcome = m.run_batch(&[unknown], &[found, money("F1", false, 10, &[])]);
    assert_eq!(outcome.pairs_evaluated, 2);
    assert!(outcome.candidates.is_empty());
}

#[test]
fn yaml_config_tunes_the_engine() {
    let yaml = r#"
version: "1.0"
name: "lenient"
matcher:
  notify_threshold: 60
  bucket_by_category: true
"#;
    let matcher = LostFoundConfig::from_yaml(yaml)
        .unwrap()
        .build_matcher()
        .unwrap();

    let mut lost = ReportRecord::lost("L", Category::Books);
    lost.book_title = "Clean Code".into();
    lost.author = "Robert Martin".into();
    let mut found = lost.clone();
    found.id = "F".into();
    found.kind = lostfound::ReportKind::Found;
    found.author = "Robert C. Martin".into();

    let outcome = matcher.run_batch(&[lost], &[found]);
    // Exact title, author only shares the keywords "robert" and "martin".
    assert_eq!(outcome.candidates[0].score(), 40 + 9);
    assert_eq!(outcome.notify_threshold, 60);
    assert_eq!(outcome.high_confidence_count(), 0);
}
