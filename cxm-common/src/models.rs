//! Core data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::checklist;

/// Staff role
///
/// Wire strings match the remote store rows (`ADMIN` / `COLLABORATOR`).
/// The role is an authorization boundary: roster mutation is an
/// administrator capability and is checked where those requests are
/// accepted, not only in presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "ADMIN")]
    Admin,
    #[serde(rename = "COLLABORATOR")]
    Collaborator,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Collaborator => "COLLABORATOR",
        }
    }
}

/// Staff account
///
/// Created and removed by administrator actions only; never mutated
/// otherwise. `password` is stored and compared as plaintext, a preserved
/// weakness of the system being reimplemented, not something this crate
/// hardens. Accounts provisioned without a password pass the submission
/// challenge unconditionally (see the authentication gate).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// One completed (or partially completed) checklist run, canonical form
///
/// This is the single in-memory shape all core logic operates on; raw
/// records in either wire convention are folded into it by
/// [`crate::normalize::normalize`]. Once appended to the submission log a
/// record is immutable: never edited, never deleted.
///
/// `user_name` is a denormalized copy captured at submission time and is
/// not re-derived if the account is later renamed or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub submitted_at: DateTime<Utc>,
    /// Completed item ids; order-irrelevant, duplicate-free by construction
    pub completed_items: BTreeSet<u16>,
    pub is_full_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Submission {
    /// Derived completion fact: every item of the static routine is checked
    pub fn derives_full_complete(&self) -> bool {
        self.completed_items.len() == checklist::total_item_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_strings() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"ADMIN\"");
        assert_eq!(
            serde_json::to_string(&UserRole::Collaborator).unwrap(),
            "\"COLLABORATOR\""
        );
        let role: UserRole = serde_json::from_str("\"COLLABORATOR\"").unwrap();
        assert_eq!(role, UserRole::Collaborator);
    }

    #[test]
    fn test_completed_items_deduplicate() {
        // BTreeSet folds duplicate ids on deserialization
        let sub: Submission = serde_json::from_value(serde_json::json!({
            "id": "00000000-0000-0000-0000-000000000001",
            "user_id": "00000000-0000-0000-0000-000000000002",
            "user_name": "Ana",
            "submitted_at": "2026-08-01T12:00:00Z",
            "completed_items": [3, 1, 2, 3, 1],
            "is_full_complete": false
        }))
        .unwrap();
        assert_eq!(sub.completed_items.len(), 3);
        assert!(!sub.derives_full_complete());
    }
}
