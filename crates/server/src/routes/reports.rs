use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use crate::store::{CategoryCount, NewReport};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use matcher::{ReportKind, ReportRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Report listing response
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportList {
    pub total: usize,
    pub items: Vec<ReportRecord>,
}

fn create(
    state: &ServerState,
    kind: ReportKind,
    report: NewReport,
) -> ServerResult<(StatusCode, Json<ReportRecord>)> {
    let record = state.store.insert(report, kind)?;
    tracing::info!(id = %record.id, category = %record.category, "report created");
    Ok((StatusCode::CREATED, Json(record)))
}

fn list(state: &ServerState, kind: ReportKind) -> Json<ReportList> {
    let items = state.store.list(kind);
    Json(ReportList {
        total: items.len(),
        items,
    })
}

/// Reports shown in the stats `recent*` lists.
const RECENT_LIMIT: usize = 5;

/// Store totals and per-category breakdown
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub success: bool,
    pub total_lost_items: usize,
    pub total_found_items: usize,
    pub lost_items_by_category: Vec<CategoryCount>,
    pub found_items_by_category: Vec<CategoryCount>,
    pub recent_lost_items: Vec<ReportRecord>,
    pub recent_found_items: Vec<ReportRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

fn missing(kind: ReportKind, id: &str) -> ServerError {
    ServerError::NotFound(format!("{} report {id}", kind.id_prefix().to_lowercase()))
}

fn fetch(state: &ServerState, kind: ReportKind, id: &str) -> ServerResult<Json<ReportRecord>> {
    state
        .store
        .get(kind, id)
        .map(Json)
        .ok_or_else(|| missing(kind, id))
}

fn remove(state: &ServerState, kind: ReportKind, id: &str) -> ServerResult<Json<DeleteResponse>> {
    let record = state.store.remove(kind, id).ok_or_else(|| missing(kind, id))?;
    tracing::info!(id = %record.id, category = %record.category, "report deleted");
    let side = match kind {
        ReportKind::Lost => "Lost",
        ReportKind::Found => "Found",
    };
    Ok(Json(DeleteResponse {
        success: true,
        message: format!("{side} item deleted successfully"),
    }))
}

fn recent(state: &ServerState, kind: ReportKind) -> Vec<ReportRecord> {
    let mut items = state.store.list(kind);
    items.reverse();
    items.truncate(RECENT_LIMIT);
    items
}

pub async fn create_lost(
    State(state): State<Arc<ServerState>>,
    Json(report): Json<NewReport>,
) -> ServerResult<(StatusCode, Json<ReportRecord>)> {
    create(&state, ReportKind::Lost, report)
}

pub async fn list_lost(State(state): State<Arc<ServerState>>) -> Json<ReportList> {
    list(&state, ReportKind::Lost)
}

pub async fn get_lost(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ServerResult<Json<ReportRecord>> {
    fetch(&state, ReportKind::Lost, &id)
}

pub async fn create_found(
    State(state): State<Arc<ServerState>>,
    Json(report): Json<NewReport>,
) -> ServerResult<(StatusCode, Json<ReportRecord>)> {
    create(&state, ReportKind::Found, report)
}

pub async fn list_found(State(state): State<Arc<ServerState>>) -> Json<ReportList> {
    list(&state, ReportKind::Found)
}

pub async fn get_found(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ServerResult<Json<ReportRecord>> {
    fetch(&state, ReportKind::Found, &id)
}

pub async fn delete_lost(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ServerResult<Json<DeleteResponse>> {
    remove(&state, ReportKind::Lost, &id)
}

pub async fn delete_found(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ServerResult<Json<DeleteResponse>> {
    remove(&state, ReportKind::Found, &id)
}

/// Totals, per-category counts and the newest reports of each kind.
pub async fn stats(State(state): State<Arc<ServerState>>) -> Json<StoreStats> {
    Json(StoreStats {
        success: true,
        total_lost_items: state.store.len(ReportKind::Lost),
        total_found_items: state.store.len(ReportKind::Found),
        lost_items_by_category: state.store.category_counts(ReportKind::Lost),
        found_items_by_category: state.store.category_counts(ReportKind::Found),
        recent_lost_items: recent(&state, ReportKind::Lost),
        recent_found_items: recent(&state, ReportKind::Found),
    })
}
