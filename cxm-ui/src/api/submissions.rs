//! Submission history and dashboard endpoints
//!
//! Reads come from the in-memory submission log (already normalized and
//! ordered), never from ad-hoc store queries, so every observer sees the
//! same reconciled sequence.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use cxm_common::models::Submission;
use serde::Serialize;

use crate::stats::{self, ActivityBucket, DashboardStats};
use crate::AppState;

/// GET /api/submissions
///
/// Full history, most recent submission first (by creation timestamp, not
/// arrival order).
pub async fn list_submissions(State(state): State<AppState>) -> Json<Vec<Submission>> {
    Json(state.log.snapshot())
}

/// Dashboard statistics response
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub summary: DashboardStats,
    /// Trailing 7 calendar days including today, oldest first
    pub activity: Vec<ActivityBucket>,
}

/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let snapshot = state.log.snapshot();
    Json(StatsResponse {
        summary: stats::summarize(&snapshot),
        activity: stats::activity_last_7_days(&snapshot, Utc::now().date_naive()),
    })
}

/// Insights text response
#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub insights: String,
}

/// GET /api/insights
///
/// Always answers with text: generator failures degrade to a static
/// fallback rather than an error.
pub async fn get_insights(State(state): State<AppState>) -> Json<InsightsResponse> {
    let snapshot = state.log.snapshot();
    Json(InsightsResponse {
        insights: state.insights.dashboard_insights(&snapshot).await,
    })
}
