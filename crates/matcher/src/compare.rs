//! Field comparators.
//!
//! Each comparator is pure and total: it looks at one field of a lost report
//! and the same field of a found report and awards up to `max_points`, plus a
//! reason when anything was awarded. Absent values (blank text, no
//! timestamp, empty denomination list, zero amount) award nothing.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::config::{AmountTiers, DateTiers, PlaceTiers, TextTiers};
use crate::types::MoneyDenomination;

/// Points awarded for one field pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldScore {
    pub points: u32,
    pub reason: Option<String>,
}

impl FieldScore {
    pub fn none() -> Self {
        Self::default()
    }

    fn award(points: u32, reason: impl Into<String>) -> Self {
        Self {
            points,
            reason: Some(reason.into()),
        }
    }
}

/// Round-half-up to the nearest integer point value.
///
/// The epsilon absorbs binary representation error so that e.g. `0.3 * 15`
/// lands on 5 rather than 4.
pub fn round_half_up(value: f64) -> u32 {
    if value <= 0.0 {
        return 0;
    }
    (value + 0.5 + 1e-9).floor() as u32
}

/// `round_half_up(max_points * ratio)`.
pub fn scaled(max_points: u32, ratio: f64) -> u32 {
    round_half_up(f64::from(max_points) * ratio)
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn contains_either(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// Free-text comparator: exact, containment, then shared keywords.
pub fn compare_text(
    label: &str,
    lost: &str,
    found: &str,
    max_points: u32,
    partial_ratio: f64,
    tiers: &TextTiers,
) -> FieldScore {
    let lost = normalize(lost);
    let found = normalize(found);
    if lost.is_empty() || found.is_empty() {
        return FieldScore::none();
    }

    if lost == found {
        return FieldScore::award(max_points, format!("{label} matches exactly"));
    }
    if contains_either(&lost, &found) {
        return FieldScore::award(
            scaled(max_points, partial_ratio),
            format!("{label} partially matches"),
        );
    }

    let shared = shared_keywords(&lost, &found, tiers.keyword_min_len);
    if shared.len() >= tiers.keyword_min_shared {
        let listed: Vec<&str> = shared
            .iter()
            .take(tiers.keyword_reason_limit)
            .copied()
            .collect();
        return FieldScore::award(
            scaled(max_points, tiers.keyword_ratio),
            format!(
                "Common {} keywords: {}",
                label.to_lowercase(),
                listed.join(", ")
            ),
        );
    }

    FieldScore::none()
}

/// Distinct tokens of `lost` (in order) that also occur in `found`.
///
/// A token repeated on the lost side counts once, so "wallet brown wallet"
/// against "black wallet" shares a single keyword and stays below the
/// two-keyword tier.
fn shared_keywords<'a>(lost: &'a str, found: &str, min_len: usize) -> Vec<&'a str> {
    let found_tokens: HashSet<&str> = found
        .split_whitespace()
        .filter(|t| t.chars().count() >= min_len)
        .collect();

    let mut shared: Vec<&str> = Vec::new();
    for token in lost.split_whitespace() {
        if token.chars().count() >= min_len
            && found_tokens.contains(token)
            && !shared.contains(&token)
        {
            shared.push(token);
        }
    }
    shared
}

/// Place comparator: exact, containment, then shared locative nouns.
pub fn compare_places(lost: &str, found: &str, max_points: u32, tiers: &PlaceTiers) -> FieldScore {
    let lost = normalize(lost);
    let found = normalize(found);
    if lost.is_empty() || found.is_empty() {
        return FieldScore::none();
    }

    if lost == found {
        return FieldScore::award(max_points, "Location matches exactly");
    }
    if contains_either(&lost, &found) {
        return FieldScore::award(
            scaled(max_points, tiers.partial_ratio),
            "Location partially matches",
        );
    }

    let lost_words: HashSet<&str> = lost.split_whitespace().collect();
    let found_words: HashSet<&str> = found.split_whitespace().collect();
    let common: Vec<String> = tiers
        .vocabulary
        .iter()
        .map(|word| normalize(word))
        .filter(|word| lost_words.contains(word.as_str()) && found_words.contains(word.as_str()))
        .collect();

    if common.is_empty() {
        return FieldScore::none();
    }
    FieldScore::award(
        scaled(max_points, tiers.vocabulary_ratio),
        format!("Same area/location type: {}", common.join(", ")),
    )
}

/// Date comparator: same UTC day, then whole-day distance windows.
pub fn compare_dates(
    lost: Option<DateTime<Utc>>,
    found: Option<DateTime<Utc>>,
    max_points: u32,
    tiers: &DateTiers,
) -> FieldScore {
    let (Some(lost), Some(found)) = (lost, found) else {
        return FieldScore::none();
    };

    if lost.date_naive() == found.date_naive() {
        return FieldScore::award(max_points, "Same date");
    }

    // `num_days` truncates toward zero.
    let days = (lost - found).num_days().abs();
    if days <= tiers.near_days {
        FieldScore::award(
            scaled(max_points, tiers.near_ratio),
            format!("Dates within {} days", tiers.near_days),
        )
    } else if days <= tiers.week_days {
        FieldScore::award(scaled(max_points, tiers.week_ratio), "Dates within a week")
    } else {
        FieldScore::none()
    }
}

/// Denomination-set comparator. Compares labels only, never counts.
pub fn compare_denominations(
    lost: &[MoneyDenomination],
    found: &[MoneyDenomination],
    max_points: u32,
) -> FieldScore {
    let labels = |items: &[MoneyDenomination]| -> HashSet<String> {
        items
            .iter()
            .map(|d| normalize(&d.denomination))
            .filter(|d| !d.is_empty())
            .collect()
    };
    let lost = labels(lost);
    let found = labels(found);
    if lost.is_empty() || found.is_empty() {
        return FieldScore::none();
    }

    let matching = lost.intersection(&found).count();
    let total = lost.len().max(found.len());

    if matching == total {
        FieldScore::award(max_points, "All denominations match exactly")
    } else if matching > 0 {
        let points = round_half_up(f64::from(max_points) * matching as f64 / total as f64);
        FieldScore::award(points, format!("{matching} out of {total} denominations match"))
    } else {
        FieldScore::none()
    }
}

/// Total-amount comparator with percentage closeness bands.
pub fn compare_amounts(lost: u64, found: u64, max_points: u32, tiers: &AmountTiers) -> FieldScore {
    if lost == 0 || found == 0 {
        return FieldScore::none();
    }
    if lost == found {
        return FieldScore::award(max_points, "Total amount matches exactly");
    }

    let diff = lost.abs_diff(found) as f64;
    let percent_diff = diff / lost.max(found) as f64 * 100.0;

    tiers
        .bands
        .iter()
        .enumerate()
        .find(|(_, band)| percent_diff <= band.max_percent_diff)
        .map(|(position, band)| {
            let closeness = match position {
                0 => "very close",
                1 => "close",
                _ => "somewhat close",
            };
            FieldScore::award(
                scaled(max_points, band.ratio),
                format!(
                    "Total amount is {closeness} (within {}%)",
                    band.max_percent_diff
                ),
            )
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap())
    }

    fn text(lost: &str, found: &str, max: u32) -> FieldScore {
        compare_text("Description", lost, found, max, 0.7, &TextTiers::default())
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round_half_up(7.5), 8);
        assert_eq!(round_half_up(7.49), 7);
        assert_eq!(scaled(15, 0.3), 5);
        assert_eq!(scaled(15, 0.5), 8);
        assert_eq!(scaled(15, 0.67), 10);
        assert_eq!(scaled(15, 0.33), 5);
        assert_eq!(scaled(10, 0.75), 8);
        assert_eq!(scaled(30, 0.7), 21);
        assert_eq!(round_half_up(-1.0), 0);
    }

    #[test]
    fn text_tiers() {
        let exact = text("  Black Leather Wallet ", "black leather wallet", 30);
        assert_eq!(exact.points, 30);
        assert_eq!(exact.reason.as_deref(), Some("Description matches exactly"));

        let partial = text("black leather wallet", "leather wallet", 30);
        assert_eq!(partial.points, 21);
        assert_eq!(partial.reason.as_deref(), Some("Description partially matches"));

        let keywords = text(
            "black leather wallet with cards",
            "brown leather wallet, cards inside",
            30,
        );
        assert_eq!(keywords.points, 9);
        assert_eq!(
            keywords.reason.as_deref(),
            Some("Common description keywords: leather, cards")
        );

        assert_eq!(text("blue umbrella", "red scarf", 30), FieldScore::none());
    }

    #[test]
    fn single_shared_keyword_is_not_enough() {
        assert_eq!(text("black wallet", "wallet brown", 30).points, 0);
    }

    #[test]
    fn repeated_tokens_count_once() {
        assert_eq!(
            shared_keywords("wallet brown wallet", "black wallet", 4),
            vec!["wallet"]
        );
        assert_eq!(text("wallet brown wallet", "black wallet", 30).points, 0);
    }

    #[test]
    fn short_tokens_are_ignored_for_keywords() {
        // "red" and "bag" are too short to count.
        assert_eq!(text("red bag near door", "bag red by gate", 30).points, 0);
    }

    #[test]
    fn keyword_reason_lists_at_most_three() {
        let score = text(
            "alpha bravo charlie delta echo",
            "echo delta charlie bravo alpha extra",
            10,
        );
        assert_eq!(score.points, 3);
        assert_eq!(
            score.reason.as_deref(),
            Some("Common description keywords: alpha, bravo, charlie")
        );
    }

    #[test]
    fn blank_text_is_absent() {
        assert_eq!(text("", "wallet", 30), FieldScore::none());
        assert_eq!(text("   ", "   ", 30), FieldScore::none());
    }

    #[test]
    fn text_tiers_are_monotonic() {
        let tiers = TextTiers::default();
        for max in [10, 15, 20, 30, 40, 50] {
            let exact = compare_text("X", "alpha bravo", "alpha bravo", max, 0.75, &tiers);
            let partial = compare_text("X", "alpha bravo", "alpha", max, 0.75, &tiers);
            let keywords =
                compare_text("X", "alpha bravo zulu", "bravo alpha yank", max, 0.75, &tiers);
            assert!(exact.points >= partial.points);
            assert!(partial.points >= keywords.points);
            assert!(keywords.points > 0);
        }
    }

    #[test]
    fn place_tiers() {
        let tiers = PlaceTiers::default();
        assert_eq!(compare_places("Library", "library ", 20, &tiers).points, 20);

        let partial = compare_places("Cafeteria", "Cafeteria Hall", 20, &tiers);
        assert_eq!(partial.points, 15);
        assert_eq!(partial.reason.as_deref(), Some("Location partially matches"));

        let area = compare_places("Main Building Floor 2", "Science building floor 3", 20, &tiers);
        assert_eq!(area.points, 10);
        assert_eq!(
            area.reason.as_deref(),
            Some("Same area/location type: building, floor")
        );

        assert_eq!(compare_places("Gym", "Parking Lot", 20, &tiers), FieldScore::none());
        assert_eq!(compare_places("", "Gym", 20, &tiers), FieldScore::none());
    }

    #[test]
    fn date_tiers() {
        let tiers = DateTiers::default();
        let same = compare_dates(at(2024, 1, 15, 9), at(2024, 1, 15, 22), 15, &tiers);
        assert_eq!(same.points, 15);
        assert_eq!(same.reason.as_deref(), Some("Same date"));

        let near = compare_dates(at(2024, 1, 15, 9), at(2024, 1, 17, 9), 15, &tiers);
        assert_eq!(near.points, 10);
        assert_eq!(near.reason.as_deref(), Some("Dates within 3 days"));

        let week = compare_dates(at(2024, 1, 15, 9), at(2024, 1, 21, 9), 15, &tiers);
        assert_eq!(week.points, 5);
        assert_eq!(week.reason.as_deref(), Some("Dates within a week"));

        assert_eq!(
            compare_dates(at(2024, 1, 1, 9), at(2024, 1, 20, 9), 15, &tiers),
            FieldScore::none()
        );
        assert_eq!(compare_dates(None, at(2024, 1, 1, 9), 15, &tiers), FieldScore::none());
    }

    #[test]
    fn date_distance_truncates_fractional_days() {
        let tiers = DateTiers::default();
        // 3 days and 20 hours apart still counts as 3 whole days.
        let score = compare_dates(at(2024, 1, 10, 1), at(2024, 1, 13, 21), 15, &tiers);
        assert_eq!(score.points, 10);
        // 7 days and 23 hours apart is still within a week.
        let score = compare_dates(at(2024, 1, 1, 0), at(2024, 1, 8, 23), 15, &tiers);
        assert_eq!(score.points, 5);
    }

    #[test]
    fn denomination_tiers() {
        let lost = vec![
            MoneyDenomination::new("500", 2),
            MoneyDenomination::new(" 100 ", 1),
        ];
        let same = vec![MoneyDenomination::new("100", 7), MoneyDenomination::new("500", 1)];
        let all = compare_denominations(&lost, &same, 20);
        assert_eq!(all.points, 20);
        assert_eq!(all.reason.as_deref(), Some("All denominations match exactly"));

        let some = compare_denominations(&lost, &[MoneyDenomination::new("500", 2)], 20);
        assert_eq!(some.points, 10);
        assert_eq!(some.reason.as_deref(), Some("1 out of 2 denominations match"));

        assert_eq!(
            compare_denominations(&lost, &[MoneyDenomination::new("50", 1)], 20),
            FieldScore::none()
        );
        assert_eq!(compare_denominations(&[], &lost, 20), FieldScore::none());
    }

    #[test]
    fn amount_tiers() {
        let tiers = AmountTiers::default();
        let exact = compare_amounts(1000, 1000, 25, &tiers);
        assert_eq!(exact.points, 25);
        assert_eq!(exact.reason.as_deref(), Some("Total amount matches exactly"));

        let very_close = compare_amounts(1000, 950, 25, &tiers);
        assert_eq!(very_close.points, 20);
        assert_eq!(
            very_close.reason.as_deref(),
            Some("Total amount is very close (within 10%)")
        );

        assert_eq!(compare_amounts(1000, 800, 25, &tiers).points, 15);
        assert_eq!(compare_amounts(1000, 500, 25, &tiers).points, 10);
        assert_eq!(compare_amounts(1000, 400, 25, &tiers), FieldScore::none());
        assert_eq!(compare_amounts(0, 400, 25, &tiers), FieldScore::none());
    }
}
