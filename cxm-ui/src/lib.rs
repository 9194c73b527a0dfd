//! cxm-ui library - CaixaMaster checklist and dashboard service
//!
//! Owns the submission synchronization core: per-collaborator checklist
//! sessions, the credential gate, the identifier-keyed submission log with
//! its optimistic-append/feed-merge reconciliation, and the aggregation
//! views the admin dashboard reads. The HTTP surface in [`api`] is the seam
//! the (out-of-scope) presentation layer talks to.

use axum::routing::{delete, get, post};
use axum::Router;
use cxm_common::events::{CxmEvent, EventBus};
use cxm_common::normalize;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tracing::debug;

pub mod api;
pub mod auth;
pub mod db;
pub mod insights;
pub mod log;
pub mod session;
pub mod stats;

use insights::InsightsClient;
use log::SubmissionLog;
use session::SessionRegistry;

/// Event bus capacity for feed and SSE subscribers
const EVENT_BUS_CAPACITY: usize = 256;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Remote persistence store (staff roster + submission history)
    pub db: SqlitePool,
    /// Reconciled in-memory submission log
    pub log: Arc<SubmissionLog>,
    /// Per-collaborator checklist sessions
    pub sessions: Arc<SessionRegistry>,
    /// Insert feed / SSE event bus
    pub events: Arc<EventBus>,
    /// Summary text generator client
    pub insights: Arc<InsightsClient>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, insights: InsightsClient) -> Self {
        Self {
            db,
            log: Arc::new(SubmissionLog::new()),
            sessions: Arc::new(SessionRegistry::new()),
            events: Arc::new(EventBus::new(EVENT_BUS_CAPACITY)),
            insights: Arc::new(insights),
        }
    }

    /// Seed the submission log from the stored history
    pub async fn hydrate_log(&self) -> cxm_common::Result<usize> {
        let raw = db::submissions::list_submissions(&self.db).await?;
        self.log
            .hydrate(raw.iter().map(normalize::normalize));
        Ok(self.log.len())
    }
}

/// Merge feed notifications into the submission log
///
/// The second mutation path of the log: inserts reported by the feed
/// (including ones this process just made) are normalized and applied.
/// An id already present from the optimistic append is absorbed silently.
/// Runs until the bus closes.
pub fn spawn_feed_merge(state: AppState) -> JoinHandle<()> {
    let mut rx = state.events.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(CxmEvent::SubmissionRecorded { record, .. }) => {
                    let submission = normalize::normalize(&record);
                    if state.log.apply(submission) {
                        debug!("feed: applied submission insert");
                    } else {
                        debug!("feed: insert already present, absorbed");
                    }
                }
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                    // Missed notifications only delay visibility; the log
                    // re-converges from later deliveries or rehydration.
                    debug!("feed: lagged, {} notifications missed", missed);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Checklist session flow
        .route("/api/session/:user_id", post(api::session::start_session))
        .route("/api/session/:user_id", get(api::session::get_session))
        .route("/api/session/:user_id", delete(api::session::end_session))
        .route("/api/session/:user_id/toggle", post(api::session::toggle_item))
        .route(
            "/api/session/:user_id/toggle-section",
            post(api::session::toggle_section),
        )
        .route("/api/session/:user_id/notes", post(api::session::set_notes))
        .route(
            "/api/session/:user_id/request-submit",
            post(api::session::request_submit),
        )
        .route("/api/session/:user_id/cancel", post(api::session::cancel_submit))
        .route("/api/session/:user_id/challenge", post(api::session::challenge))
        // Roster
        .route("/api/users", get(api::users::list_users))
        .route("/api/users", post(api::users::add_user))
        .route("/api/users/:id", delete(api::users::remove_user))
        // Dashboard reads
        .route("/api/checklist", get(api::checklist::get_checklist))
        .route("/api/submissions", get(api::submissions::list_submissions))
        .route("/api/stats", get(api::submissions::get_stats))
        .route("/api/insights", get(api::submissions::get_insights))
        // Live feed
        .route("/api/events", get(api::sse::event_stream))
        .merge(api::health::health_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
