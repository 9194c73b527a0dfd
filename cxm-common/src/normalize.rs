//! Schema normalization boundary
//!
//! The same logical submission travels under two field-naming conventions:
//! the authoring convention (`userId`, `userName`, `completedItems`,
//! `isFullComplete`) and the storage convention used by the remote store and
//! its insert feed (`user_id`, `user_name`, `completed_items`,
//! `is_full_complete`). Rather than scattering convention fallbacks through
//! consuming code, every raw record crosses [`normalize`] exactly once and
//! all downstream logic operates on the canonical [`Submission`] shape.
//!
//! Resolution rule per attribute: storage-side value when present, else
//! authoring-side value, else a type-appropriate empty default. Both
//! functions here are pure; `normalize` is idempotent over the storage
//! projection of a canonical record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::models::Submission;

/// A submission as it arrives off the wire, before normalization
///
/// Either convention's fields (or a mix) may be populated. Serializing a
/// value produced by [`RawSubmission::remote`] yields a storage-convention
/// row with no authoring-side keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSubmission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    /// Authoring-convention owner id
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id_local: Option<Uuid>,
    /// Storage-convention owner id
    #[serde(rename = "user_id", default, skip_serializing_if = "Option::is_none")]
    pub user_id_remote: Option<Uuid>,

    /// Authoring-convention display name
    #[serde(rename = "userName", default, skip_serializing_if = "Option::is_none")]
    pub user_name_local: Option<String>,
    /// Storage-convention display name
    #[serde(rename = "user_name", default, skip_serializing_if = "Option::is_none")]
    pub user_name_remote: Option<String>,

    /// Creation timestamp (ISO-8601); shared by both conventions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,

    /// Authoring-convention completed item ids
    #[serde(
        rename = "completedItems",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_items_local: Option<Vec<u16>>,
    /// Storage-convention completed item ids
    #[serde(
        rename = "completed_items",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_items_remote: Option<Vec<u16>>,

    /// Authoring-convention completion flag
    #[serde(
        rename = "isFullComplete",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_full_complete_local: Option<bool>,
    /// Storage-convention completion flag
    #[serde(
        rename = "is_full_complete",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_full_complete_remote: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RawSubmission {
    /// Project a canonical record onto the storage convention
    ///
    /// This is the shape written to the remote store and carried by insert
    /// feed notifications. `normalize(&RawSubmission::remote(&s)) == s`.
    pub fn remote(submission: &Submission) -> Self {
        Self {
            id: Some(submission.id),
            user_id_remote: Some(submission.user_id),
            user_name_remote: Some(submission.user_name.clone()),
            date: Some(submission.submitted_at),
            completed_items_remote: Some(submission.completed_items.iter().copied().collect()),
            is_full_complete_remote: Some(submission.is_full_complete),
            notes: submission.notes.clone(),
            ..Self::default()
        }
    }
}

/// Fold a raw record into the canonical shape
///
/// Missing attributes take empty defaults: nil id, nil owner, empty name,
/// Unix epoch timestamp, empty item set. A completion flag absent from both
/// conventions normalizes to `false`, which conflates "explicitly
/// incomplete" with "unknown"; that conflation is inherited behavior and is
/// kept as-is. Duplicate item ids collapse through the set type.
pub fn normalize(raw: &RawSubmission) -> Submission {
    let completed_items: BTreeSet<u16> = raw
        .completed_items_remote
        .as_ref()
        .or(raw.completed_items_local.as_ref())
        .map(|ids| ids.iter().copied().collect())
        .unwrap_or_default();

    Submission {
        id: raw.id.unwrap_or_else(Uuid::nil),
        user_id: raw
            .user_id_remote
            .or(raw.user_id_local)
            .unwrap_or_else(Uuid::nil),
        user_name: raw
            .user_name_remote
            .clone()
            .or_else(|| raw.user_name_local.clone())
            .unwrap_or_default(),
        submitted_at: raw.date.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        completed_items,
        is_full_complete: raw
            .is_full_complete_remote
            .or(raw.is_full_complete_local)
            .unwrap_or(false),
        notes: raw.notes.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical() -> Submission {
        Submission {
            id: Uuid::from_u128(1),
            user_id: Uuid::from_u128(2),
            user_name: "Ana Souza".to_string(),
            submitted_at: "2026-08-01T09:30:00Z".parse().unwrap(),
            completed_items: (1..=20).collect(),
            is_full_complete: true,
            notes: Some("drawer counted twice".to_string()),
        }
    }

    #[test]
    fn test_normalize_is_idempotent_over_canonical_records() {
        let sub = canonical();
        let roundtripped = normalize(&RawSubmission::remote(&sub));
        assert_eq!(roundtripped, sub);

        // A second pass changes nothing either.
        let twice = normalize(&RawSubmission::remote(&roundtripped));
        assert_eq!(twice, sub);
    }

    #[test]
    fn test_storage_convention_wins_over_authoring() {
        let raw = RawSubmission {
            id: Some(Uuid::from_u128(9)),
            user_name_local: Some("stale local copy".to_string()),
            user_name_remote: Some("Ana Souza".to_string()),
            completed_items_local: Some(vec![1, 2]),
            completed_items_remote: Some(vec![1, 2, 3]),
            is_full_complete_local: Some(true),
            is_full_complete_remote: Some(false),
            ..RawSubmission::default()
        };

        let sub = normalize(&raw);
        assert_eq!(sub.user_name, "Ana Souza");
        assert_eq!(sub.completed_items.len(), 3);
        assert!(!sub.is_full_complete);
    }

    #[test]
    fn test_authoring_convention_fills_storage_gaps() {
        let raw = RawSubmission {
            id: Some(Uuid::from_u128(9)),
            user_id_local: Some(Uuid::from_u128(4)),
            user_name_local: Some("Bruno Lima".to_string()),
            completed_items_local: Some(vec![5, 6, 7]),
            is_full_complete_local: Some(false),
            ..RawSubmission::default()
        };

        let sub = normalize(&raw);
        assert_eq!(sub.user_id, Uuid::from_u128(4));
        assert_eq!(sub.user_name, "Bruno Lima");
        assert_eq!(sub.completed_items, [5, 6, 7].into_iter().collect());
    }

    #[test]
    fn test_missing_attributes_take_empty_defaults() {
        let sub = normalize(&RawSubmission::default());
        assert!(sub.id.is_nil());
        assert!(sub.user_id.is_nil());
        assert!(sub.user_name.is_empty());
        assert_eq!(sub.submitted_at, DateTime::<Utc>::UNIX_EPOCH);
        assert!(sub.completed_items.is_empty());
        // Absent from both conventions: conflated to false, by design.
        assert!(!sub.is_full_complete);
        assert!(sub.notes.is_none());
    }

    #[test]
    fn test_duplicate_item_ids_collapse() {
        let raw = RawSubmission {
            completed_items_remote: Some(vec![4, 4, 4, 2, 2]),
            ..RawSubmission::default()
        };
        assert_eq!(normalize(&raw).completed_items, [2, 4].into_iter().collect());
    }

    #[test]
    fn test_remote_projection_carries_no_authoring_keys() {
        let json = serde_json::to_value(RawSubmission::remote(&canonical())).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("user_id"));
        assert!(obj.contains_key("completed_items"));
        assert!(!obj.contains_key("userId"));
        assert!(!obj.contains_key("completedItems"));
        assert!(!obj.contains_key("isFullComplete"));
    }

    #[test]
    fn test_mixed_convention_payload_parses() {
        // A feed row that kept one stray authoring key alongside storage keys.
        let raw: RawSubmission = serde_json::from_value(serde_json::json!({
            "id": "00000000-0000-0000-0000-00000000000a",
            "user_id": "00000000-0000-0000-0000-00000000000b",
            "userName": "Carla Dias",
            "date": "2026-08-02T18:45:00Z",
            "completed_items": [16, 17, 18, 19, 20],
            "is_full_complete": false
        }))
        .unwrap();

        let sub = normalize(&raw);
        assert_eq!(sub.user_name, "Carla Dias");
        assert_eq!(sub.completed_items.len(), 5);
    }
}
