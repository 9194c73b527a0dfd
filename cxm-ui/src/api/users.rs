//! Staff roster endpoints
//!
//! Roster mutation is an administrator capability. The check happens here,
//! where the requests are accepted, not in the presentation layer. A
//! persistence failure means the operation was not applied and no local
//! state or event reflects it.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use cxm_common::events::CxmEvent;
use cxm_common::models::{User, UserRole};
use cxm_common::Error;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::api::ApiError;
use crate::db;
use crate::AppState;

/// Roster entry as exposed to the presentation layer (credential omitted)
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub active: bool,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            active: user.active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddUserRequest {
    /// Who is making the change; must be an active administrator
    pub acting_user_id: Uuid,
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    /// Defaults to collaborator, matching how accounts are provisioned
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
pub struct ActingUser {
    pub acting_user_id: Uuid,
}

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserInfo>>, ApiError> {
    let users = db::users::list_users(&state.db).await?;
    Ok(Json(users.into_iter().map(UserInfo::from).collect()))
}

/// POST /api/users
pub async fn add_user(
    State(state): State<AppState>,
    Json(request): Json<AddUserRequest>,
) -> Result<(StatusCode, Json<UserInfo>), ApiError> {
    require_admin(&state.db, request.acting_user_id).await?;

    if request.name.trim().is_empty() || request.email.trim().is_empty() {
        return Err(Error::Validation("name and email are required".to_string()).into());
    }

    let user = User {
        id: Uuid::new_v4(),
        name: request.name,
        email: request.email,
        role: request.role.unwrap_or(UserRole::Collaborator),
        active: true,
        password: request.password,
    };

    // Not-applied on failure: the error propagates before any local state
    // or event reflects the new account.
    db::users::insert_user(&state.db, &user).await?;
    info!("roster: added {} ({})", user.name, user.id);

    state.events.emit_lossy(CxmEvent::UserAdded {
        user_id: user.id,
        name: user.name.clone(),
        timestamp: Utc::now(),
    });

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// DELETE /api/users/:id
pub async fn remove_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(acting): Query<ActingUser>,
) -> Result<StatusCode, ApiError> {
    require_admin(&state.db, acting.acting_user_id).await?;

    let removed = db::users::delete_user(&state.db, id).await?;
    if !removed {
        return Err(Error::NotFound(format!("no staff account {}", id)).into());
    }
    info!("roster: removed {}", id);

    state.events.emit_lossy(CxmEvent::UserRemoved {
        user_id: id,
        timestamp: Utc::now(),
    });

    Ok(StatusCode::NO_CONTENT)
}

/// Resolve the acting user and require an active administrator
async fn require_admin(db: &SqlitePool, acting_user_id: Uuid) -> cxm_common::Result<User> {
    let user = db::users::get_user(db, acting_user_id)
        .await?
        .ok_or_else(|| Error::Authentication("acting user is not on the roster".to_string()))?;

    if user.role != UserRole::Admin || !user.active {
        return Err(Error::Authentication(
            "roster changes require an active administrator".to_string(),
        ));
    }
    Ok(user)
}
