//! Checklist session endpoints
//!
//! One session per logged-in collaborator. All mutation routes operate on
//! the acting user's own session; the challenge route runs the full
//! submission pipeline: credential gate, canonical record creation,
//! optimistic append to the in-memory log, remote insert, feed emission.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use cxm_common::checklist::Section;
use cxm_common::events::CxmEvent;
use cxm_common::models::User;
use cxm_common::normalize::RawSubmission;
use cxm_common::Error;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::ApiError;
use crate::auth;
use crate::db;
use crate::session::SessionView;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub item_id: u16,
}

#[derive(Debug, Deserialize)]
pub struct ToggleSectionRequest {
    pub section: Section,
}

#[derive(Debug, Deserialize)]
pub struct NotesRequest {
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct ChallengeRequest {
    /// Candidate credential; compared against the stored one as-is
    #[serde(default)]
    pub password: String,
}

/// Outcome of an accepted submission
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub submission_id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub is_full_complete: bool,
    /// False when the remote append failed; the submission stays locally
    /// visible either way and staff do not re-enter their checklist
    pub persisted: bool,
}

/// POST /api/session/:user_id - start (or restart) a checklist session
pub async fn start_session(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let user = active_user(&state, user_id).await?;
    Ok(Json(state.sessions.start(&user)))
}

/// GET /api/session/:user_id
pub async fn get_session(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(state.sessions.view(user_id)?))
}

/// DELETE /api/session/:user_id - logout, discarding the working set
pub async fn end_session(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> StatusCode {
    state.sessions.end(user_id);
    StatusCode::NO_CONTENT
}

/// POST /api/session/:user_id/toggle
pub async fn toggle_item(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<SessionView>, ApiError> {
    state.sessions.with_session(user_id, |session| {
        session.toggle(request.item_id)?;
        Ok(session.view())
    })
    .map(Json)
    .map_err(ApiError::from)
}

/// POST /api/session/:user_id/toggle-section
pub async fn toggle_section(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<ToggleSectionRequest>,
) -> Result<Json<SessionView>, ApiError> {
    state.sessions.with_session(user_id, |session| {
        session.toggle_section(request.section)?;
        Ok(session.view())
    })
    .map(Json)
    .map_err(ApiError::from)
}

/// POST /api/session/:user_id/notes
pub async fn set_notes(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<NotesRequest>,
) -> Result<Json<SessionView>, ApiError> {
    state.sessions.with_session(user_id, |session| {
        session.set_notes(request.notes)?;
        Ok(session.view())
    })
    .map(Json)
    .map_err(ApiError::from)
}

/// POST /api/session/:user_id/request-submit
pub async fn request_submit(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    state.sessions.with_session(user_id, |session| {
        session.request_submit()?;
        Ok(session.view())
    })
    .map(Json)
    .map_err(ApiError::from)
}

/// POST /api/session/:user_id/cancel
pub async fn cancel_submit(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    state.sessions.with_session(user_id, |session| {
        session.cancel_submit()?;
        Ok(session.view())
    })
    .map(Json)
    .map_err(ApiError::from)
}

/// POST /api/session/:user_id/challenge
///
/// Runs the credential gate and, on success, turns the pending session into
/// a submitted record. A failed challenge changes nothing and is retryable.
/// A failed remote append keeps the optimistic local copy and reports
/// `persisted: false` instead of rolling back.
pub async fn challenge(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<ChallengeRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let user = active_user(&state, user_id).await?;

    // Gate first; on mismatch the session is untouched.
    let authorization = auth::challenge(&request.password, &user)?;

    let submission = state
        .sessions
        .with_session(user_id, |session| session.submit(authorization))?;

    // Optimistic local append: the submitter always sees their own record
    // immediately, regardless of remote or feed delivery.
    state.log.apply(submission.clone());

    let record = RawSubmission::remote(&submission);
    let persisted = match db::submissions::insert_submission(&state.db, &record).await {
        Ok(_) => {
            state.events.emit_lossy(CxmEvent::SubmissionRecorded {
                record,
                timestamp: Utc::now(),
            });
            true
        }
        Err(e) => {
            // Chosen trade-off: staff never re-enter a checklist. The local
            // copy stays visible; only remote consistency lags.
            warn!(
                "remote append failed for submission {}: {}; keeping local copy",
                submission.id, e
            );
            false
        }
    };

    info!(
        "submission {} accepted for {} ({} items, full={})",
        submission.id,
        submission.user_name,
        submission.completed_items.len(),
        submission.is_full_complete
    );

    Ok(Json(SubmitResponse {
        submission_id: submission.id,
        submitted_at: submission.submitted_at,
        is_full_complete: submission.is_full_complete,
        persisted,
    }))
}

/// Resolve a roster account that is allowed to hold a session
async fn active_user(state: &AppState, user_id: Uuid) -> cxm_common::Result<User> {
    let user = db::users::get_user(&state.db, user_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("no staff account {}", user_id)))?;
    if !user.active {
        return Err(Error::Authentication(
            "this account has been deactivated".to_string(),
        ));
    }
    Ok(user)
}
