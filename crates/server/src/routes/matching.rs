use crate::error::{ServerError, ServerResult};
use crate::notify::Notice;
use crate::state::ServerState;
use crate::telemetry;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{TimeZone, Utc};
use matcher::{Category, Classification, MatchResult, PairCandidate, ReportKind, ReportRecord};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Batch matching response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRunResponse {
    pub success: bool,
    pub total_matches: usize,
    pub high_confidence_matches: usize,
    pub email_notifications_sent: usize,
    pub matches: Vec<PairCandidate>,
}

/// Single notification request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    #[serde(default)]
    pub lost_item_id: Option<String>,
    #[serde(default)]
    pub found_item_id: Option<String>,
}

/// Read-only score of one stored pair
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetailsResponse {
    pub success: bool,
    pub lost_item: ReportRecord,
    pub found_item: ReportRecord,
    pub match_result: MatchResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationResponse {
    pub success: bool,
    pub message: String,
    pub recipient: String,
    pub match_percentage: u32,
    pub classification: Classification,
}

/// Score every stored lost report against every stored found report and
/// notify owners of the high-confidence pairs.
///
/// Delivery failures are logged and left out of `emailNotificationsSent`;
/// they never fail the request.
pub async fn run_matching(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<Json<MatchRunResponse>> {
    let lost = state.store.list(ReportKind::Lost);
    let found = state.store.list(ReportKind::Found);

    let matcher = Arc::clone(&state.matcher);
    let job = tokio::task::spawn_blocking(move || matcher.run_batch(&lost, &found));
    let outcome = tokio::time::timeout(state.config.timeout(), job)
        .await
        .map_err(|_| ServerError::Timeout)??;

    let mut sent = 0;
    let mut failed = 0;
    for pair in outcome.notification_subset() {
        let delivery = match Notice::compose(&pair.lost, &pair.found, pair.score()) {
            Ok(notice) => state.notifier.deliver(&notice).await,
            Err(err) => Err(err),
        };
        match delivery {
            Ok(()) => sent += 1,
            Err(err) => {
                failed += 1;
                tracing::warn!(
                    lost_id = %pair.lost.id,
                    found_id = %pair.found.id,
                    error = %err,
                    "notification not delivered"
                );
            }
        }
    }
    telemetry::record_notifications(sent, failed);

    tracing::info!(
        total = outcome.total_matches(),
        high_confidence = outcome.high_confidence_count(),
        sent,
        failed,
        "matching run complete"
    );

    Ok(Json(MatchRunResponse {
        success: true,
        total_matches: outcome.total_matches(),
        high_confidence_matches: outcome.high_confidence_count(),
        email_notifications_sent: sent,
        matches: outcome.candidates,
    }))
}

fn non_blank(id: Option<String>) -> Option<String> {
    id.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Resolve the pair named by a request, or fail with 400/404.
fn lookup_pair(
    state: &ServerState,
    request: SendNotificationRequest,
) -> ServerResult<(ReportRecord, ReportRecord)> {
    let (Some(lost_id), Some(found_id)) = (
        non_blank(request.lost_item_id),
        non_blank(request.found_item_id),
    ) else {
        return Err(ServerError::BadRequest(
            "Lost item ID and Found item ID are required".to_string(),
        ));
    };

    let lost = state
        .store
        .get(ReportKind::Lost, &lost_id)
        .ok_or_else(|| ServerError::NotFound(format!("lost report {lost_id}")))?;
    let found = state
        .store
        .get(ReportKind::Found, &found_id)
        .ok_or_else(|| ServerError::NotFound(format!("found report {found_id}")))?;
    Ok((lost, found))
}

/// Score one stored pair without notifying anyone.
pub async fn match_details(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<SendNotificationRequest>,
) -> ServerResult<Json<MatchDetailsResponse>> {
    let (lost, found) = lookup_pair(&state, request)?;
    let match_result = state.matcher.score(&lost, &found);
    Ok(Json(MatchDetailsResponse {
        success: true,
        lost_item: lost,
        found_item: found,
        match_result,
    }))
}

/// Score one stored pair and notify the lost report's owner.
pub async fn send_notification(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<SendNotificationRequest>,
) -> ServerResult<Json<SendNotificationResponse>> {
    let (lost, found) = lookup_pair(&state, request)?;

    let result = state.matcher.score(&lost, &found);
    let notice = Notice::compose(&lost, &found, result.score)?;
    if let Err(err) = state.notifier.deliver(&notice).await {
        telemetry::record_notifications(0, 1);
        return Err(err.into());
    }
    telemetry::record_notifications(1, 0);

    Ok(Json(SendNotificationResponse {
        success: true,
        message: "Email notification sent successfully".to_string(),
        recipient: notice.recipient,
        match_percentage: result.score,
        classification: result.classification,
    }))
}

fn sample_pair(
    category: Category,
    place: &str,
    (y, m, d): (i32, u32, u32),
    fill: impl Fn(&mut ReportRecord),
) -> (ReportRecord, ReportRecord) {
    let at = Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).single();
    let mut lost = ReportRecord::lost(format!("SAMPLE-LOST-{category}"), category);
    let mut found = ReportRecord::found(format!("SAMPLE-FOUND-{category}"), category);
    for record in [&mut lost, &mut found] {
        fill(record);
        record.place = place.to_string();
        record.occurred_at = at;
    }
    (lost, found)
}

/// Score two built-in sample pairs as a smoke test of the engine.
pub async fn test_matching(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let (electronics_lost, electronics_found) =
        sample_pair(Category::Electronics, "Library Building", (2024, 1, 15), |r| {
            r.item_name = "iPhone 13".into();
            r.brand = "Apple".into();
            r.model = "A2482".into();
            r.description = "Black iPhone with cracked screen".into();
        });
    let (books_lost, books_found) = sample_pair(
        Category::Books,
        "Computer Science Department",
        (2024, 1, 10),
        |r| {
            r.book_title = "Data Structures and Algorithms".into();
            r.author = "Thomas H. Cormen".into();
        },
    );

    let electronics = state.matcher.score(&electronics_lost, &electronics_found);
    let books = state.matcher.score(&books_lost, &books_found);

    Ok(Json(json!({
        "success": true,
        "testResults": {
            "electronics": {
                "lostItem": electronics_lost,
                "foundItem": electronics_found,
                "matchResult": electronics,
            },
            "books": {
                "lostItem": books_lost,
                "foundItem": books_found,
                "matchResult": books,
            },
        }
    })))
}
