//! API Routes
//!
//! Report endpoint definitions. Every report fetches a fresh snapshot and
//! aggregates it from scratch; an empty result is a normal 200.

use axum::{
    extract::{Extension, Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::parse_window_bound;
use crate::engine::{
    group_by_rank, select_best_submission, AggregationOutcome, AggregationStats, Leaderboard,
    LeaderboardFilter, LeaderboardRow, Page, RankGroup, ReportWindow,
};
use crate::error::AppError;
use crate::export::leaderboard_csv;
use crate::snapshot::load_snapshot;

use super::middleware::RequestContext;
use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    #[serde(default)]
    pub since: Option<String>,
    #[serde(default)]
    pub until: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default)]
    pub since: Option<String>,
    #[serde(default)]
    pub until: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub store: Option<String>,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl LeaderboardQuery {
    fn window_query(&self) -> WindowQuery {
        WindowQuery {
            since: self.since.clone(),
            until: self.until.clone(),
        }
    }

    fn filter(&self) -> LeaderboardFilter {
        LeaderboardFilter {
            region: self.region.clone(),
            store: self.store.clone(),
            rank_title: self.rank.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub window_start: DateTime<Utc>,
    pub window_end: Option<DateTime<Utc>>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub rows: Vec<LeaderboardRow>,
    pub stats: AggregationStats,
}

#[derive(Debug, Serialize)]
pub struct GroupedLeaderboardResponse {
    pub window_start: DateTime<Utc>,
    pub window_end: Option<DateTime<Utc>>,
    pub groups: Vec<RankGroup>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubmissionsQuery {
    #[serde(default)]
    pub test: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BestSubmissionRow {
    pub submission_id: Uuid,
    pub person_id: Option<String>,
    pub phone: Option<String>,
    pub test_name: Option<String>,
    pub score: Decimal,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct BestSubmissionsResponse {
    pub submissions: Vec<BestSubmissionRow>,
    pub skipped: usize,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/leaderboard", get(get_leaderboard))
        .route("/leaderboard/grouped", get(get_grouped_leaderboard))
        .route("/leaderboard/export", get(export_leaderboard))
        .route("/certification/best-submissions", get(get_best_submissions))
}

// =========================================================================
// Shared helpers
// =========================================================================

fn resolve_window(query: &WindowQuery, state: &AppState) -> Result<ReportWindow, AppError> {
    let start = match query.since.as_deref() {
        Some(raw) => parse_window_bound(raw)
            .ok_or_else(|| AppError::InvalidRequest(format!("Invalid since: {}", raw)))?,
        None => state.settings.default_window_start.ok_or_else(|| {
            AppError::InvalidRequest("since is required: no default window configured".to_string())
        })?,
    };

    match query.until.as_deref() {
        Some(raw) => {
            let end = parse_window_bound(raw)
                .ok_or_else(|| AppError::InvalidRequest(format!("Invalid until: {}", raw)))?;
            Ok(ReportWindow::between(start, end)?)
        }
        None => Ok(ReportWindow::starting_at(start)),
    }
}

async fn run_aggregation(
    state: &AppState,
    window: ReportWindow,
) -> Result<AggregationOutcome, AppError> {
    let phones = &state.settings.manual_bonus_phones;
    let snapshot = load_snapshot(state.source.as_ref(), &window, phones).await?;

    Ok(state
        .aggregator
        .aggregate_window(&snapshot.events, &snapshot.roster, phones.as_slice(), window))
}

// =========================================================================
// GET /leaderboard
// =========================================================================

/// Paginated leaderboard with global positions
async fn get_leaderboard(
    State(state): State<AppState>,
    context: Option<Extension<RequestContext>>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let window = resolve_window(&query.window_query(), &state)?;
    let outcome = run_aggregation(&state, window).await?;

    let board = Leaderboard::from_people(&outcome.people);
    let page = board.page(&query.filter(), Page::new(query.page, query.limit));

    tracing::info!(
        correlation_id = ?context.map(|c| c.correlation_id),
        people = board.len(),
        returned = page.rows.len(),
        "Leaderboard served"
    );

    Ok(Json(LeaderboardResponse {
        window_start: window.start,
        window_end: window.end,
        total: page.total,
        page: page.page,
        limit: page.limit,
        rows: page.rows,
        stats: outcome.stats,
    }))
}

// =========================================================================
// GET /leaderboard/grouped
// =========================================================================

/// Leaderboard grouped by rank title
async fn get_grouped_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<GroupedLeaderboardResponse>, AppError> {
    let window = resolve_window(&query, &state)?;
    let outcome = run_aggregation(&state, window).await?;

    let groups = group_by_rank(&outcome.people, &state.aggregator.rules().rank_table);

    Ok(Json(GroupedLeaderboardResponse {
        window_start: window.start,
        window_end: window.end,
        groups,
    }))
}

// =========================================================================
// GET /leaderboard/export
// =========================================================================

/// Leaderboard as a CSV download
async fn export_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse, AppError> {
    let window = resolve_window(&query.window_query(), &state)?;
    let outcome = run_aggregation(&state, window).await?;

    let rows = Leaderboard::from_people(&outcome.people).filtered(&query.filter());
    let body = leaderboard_csv(&rows)?;

    tracing::info!(rows = rows.len(), "Leaderboard exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"leaderboard.csv\"",
            ),
        ],
        body,
    ))
}

// =========================================================================
// GET /certification/best-submissions
// =========================================================================

/// Best certification attempt per person
async fn get_best_submissions(
    State(state): State<AppState>,
    Query(query): Query<SubmissionsQuery>,
) -> Result<Json<BestSubmissionsResponse>, AppError> {
    let test_name = query.test.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let submissions = state.source.test_submissions(test_name).await?;
    let result = select_best_submission(&submissions);

    let submissions = result
        .best
        .into_iter()
        .map(|s| BestSubmissionRow {
            submission_id: s.submission_id,
            person_id: s.person_id,
            phone: s.phone,
            test_name: s.test_name,
            score: s.score,
            submitted_at: s.submitted_at,
        })
        .collect();

    Ok(Json(BestSubmissionsResponse {
        submissions,
        skipped: result.skipped,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaderboard_query_defaults() {
        let query: LeaderboardQuery = serde_json::from_str("{}").unwrap();
        assert!(query.since.is_none());
        assert!(query.page.is_none());
        assert!(query.filter().is_empty());
    }

    #[test]
    fn test_leaderboard_query_filter_mapping() {
        let query: LeaderboardQuery =
            serde_json::from_str(r#"{"region":"West","rank":"Sales Major"}"#).unwrap();
        let filter = query.filter();
        assert_eq!(filter.region.as_deref(), Some("West"));
        assert_eq!(filter.rank_title.as_deref(), Some("Sales Major"));
        assert!(filter.store.is_none());
    }
}
