//! Submission history queries
//!
//! The `submissions` table is append-only: rows are inserted once, never
//! updated, never deleted. Rows live in the storage-side naming convention;
//! readers get them back as raw records and normalize at the boundary.

use chrono::{DateTime, Utc};
use cxm_common::normalize::{normalize, RawSubmission};
use cxm_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::debug;

type SubmissionRow = (String, String, String, String, String, i64, Option<String>);

/// List the full submission history, most recent first
///
/// Returns storage-convention raw records; callers normalize.
pub async fn list_submissions(db: &SqlitePool) -> Result<Vec<RawSubmission>> {
    let rows: Vec<SubmissionRow> = sqlx::query_as(
        r#"
        SELECT id, user_id, user_name, date, completed_items, is_full_complete, notes
        FROM submissions
        ORDER BY date DESC
        "#,
    )
    .fetch_all(db)
    .await?;

    rows.into_iter().map(row_to_raw).collect()
}

/// Append one submission row
///
/// Accepts either naming convention (the record is normalized before
/// binding). Keyed on the submission id: a row with the same id already
/// present is silently absorbed, matching the id-keyed set semantics of the
/// submission log. Returns whether a new row was written.
pub async fn insert_submission(db: &SqlitePool, record: &RawSubmission) -> Result<bool> {
    let submission = normalize(record);
    if submission.id.is_nil() {
        return Err(Error::Validation(
            "submission record is missing its identifier".to_string(),
        ));
    }

    let completed_items = serde_json::to_string(&submission.completed_items)
        .map_err(|e| Error::Internal(format!("failed to encode completed items: {}", e)))?;

    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO submissions
            (id, user_id, user_name, date, completed_items, is_full_complete, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(submission.id.to_string())
    .bind(submission.user_id.to_string())
    .bind(&submission.user_name)
    .bind(submission.submitted_at.to_rfc3339())
    .bind(completed_items)
    .bind(submission.is_full_complete as i64)
    .bind(&submission.notes)
    .execute(db)
    .await?;

    let inserted = result.rows_affected() > 0;
    if !inserted {
        debug!("submission {} already stored, insert absorbed", submission.id);
    }
    Ok(inserted)
}

fn row_to_raw(row: SubmissionRow) -> Result<RawSubmission> {
    let (id, user_id, user_name, date, completed_items, is_full_complete, notes) = row;

    let date: DateTime<Utc> = date
        .parse()
        .map_err(|e| Error::Internal(format!("invalid submission date: {}", e)))?;
    let completed_items: Vec<u16> = serde_json::from_str(&completed_items)
        .map_err(|e| Error::Internal(format!("invalid completed_items column: {}", e)))?;

    Ok(RawSubmission {
        id: Some(
            id.parse()
                .map_err(|e| Error::Internal(format!("invalid submission id: {}", e)))?,
        ),
        user_id_remote: Some(
            user_id
                .parse()
                .map_err(|e| Error::Internal(format!("invalid submission user id: {}", e)))?,
        ),
        user_name_remote: Some(user_name),
        date: Some(date),
        completed_items_remote: Some(completed_items),
        is_full_complete_remote: Some(is_full_complete != 0),
        notes,
        ..RawSubmission::default()
    })
}
