//! In-memory submission log
//!
//! Append-only collection of canonical submissions, keyed by submission id.
//! Two mutation paths feed it: the optimistic local append performed right
//! after a gate-approved submission, and the insert feed reporting rows
//! written by any client (including this one). Both paths go through
//! [`SubmissionLog::apply`], a convergent idempotent merge: when the
//! optimistic append beats the feed notification for the same id, the
//! second arrival is a silent no-op, not a duplicate and not an error.
//!
//! Read order is strictly most-recent-first by the submission's own
//! creation timestamp; arrival order into the log is unspecified and never
//! observable.

use cxm_common::models::Submission;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// Identifier-keyed submission set with reverse-chronological reads
#[derive(Default)]
pub struct SubmissionLog {
    entries: RwLock<HashMap<Uuid, Submission>>,
}

impl SubmissionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one submission into the log
    ///
    /// Returns `true` if the id was new, `false` if an entry with the same
    /// id was already present (in which case the stored entry is kept
    /// unchanged; appended records are immutable).
    pub fn apply(&self, submission: Submission) -> bool {
        let mut entries = self.entries.write().expect("submission log lock poisoned");
        match entries.entry(submission.id) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(submission);
                true
            }
        }
    }

    /// Seed the log from a stored history (startup hydration)
    pub fn hydrate(&self, submissions: impl IntoIterator<Item = Submission>) {
        for submission in submissions {
            self.apply(submission);
        }
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.entries
            .read()
            .expect("submission log lock poisoned")
            .contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .expect("submission log lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ordered snapshot: descending creation timestamp, id as tie-break
    ///
    /// The tie-break keeps the ordering deterministic for records sharing a
    /// timestamp; it carries no semantic meaning.
    pub fn snapshot(&self) -> Vec<Submission> {
        let entries = self.entries.read().expect("submission log lock poisoned");
        let mut submissions: Vec<Submission> = entries.values().cloned().collect();
        submissions.sort_by(|a, b| {
            b.submitted_at
                .cmp(&a.submitted_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        submissions
    }
}
