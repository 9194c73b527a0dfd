//! Checklist session state machine
//!
//! One in-progress checklist run per active collaborator. The session owns
//! the working set of checked item ids and the draft notes; completion
//! ("every item checked") is a derived fact, never user-settable. Sessions
//! are ephemeral: discarded on submission or logout, never persisted, never
//! shared between users.
//!
//! Phase transitions:
//!
//! ```text
//! Editing --request_submit--> PendingAuth --submit--> Submitted (terminal)
//!    ^                            |
//!    +-------cancel_submit--------+
//! ```
//!
//! A failed or cancelled challenge returns to `Editing` with the checked
//! set untouched; authentication failure must not lose staff progress.

use chrono::Utc;
use cxm_common::checklist::{self, Section};
use cxm_common::models::{Submission, User};
use cxm_common::{Error, Result};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;
use uuid::Uuid;

use crate::auth::SubmitAuthorization;

/// Session lifecycle phase
///
/// Empty / in-progress / fully-checked are derived from the checked set and
/// deliberately not modeled as phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    /// Accepting toggles and notes edits
    Editing,
    /// Submission requested, credential challenge open
    PendingAuth,
    /// Terminal; a new session replaces this one
    Submitted,
}

/// One collaborator's in-progress checklist run
#[derive(Debug)]
pub struct ChecklistSession {
    user_id: Uuid,
    user_name: String,
    checked: BTreeSet<u16>,
    notes: String,
    phase: SessionPhase,
}

impl ChecklistSession {
    pub fn new(user: &User) -> Self {
        Self {
            user_id: user.id,
            user_name: user.name.clone(),
            checked: BTreeSet::new(),
            notes: String::new(),
            phase: SessionPhase::Editing,
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn checked(&self) -> &BTreeSet<u16> {
        &self.checked
    }

    /// Checked-count / total-count ratio in [0, 1]; derived, not stored
    pub fn progress(&self) -> f32 {
        self.checked.len() as f32 / checklist::total_item_count() as f32
    }

    /// Derived fact: every item of the routine is checked
    pub fn is_fully_checked(&self) -> bool {
        self.checked.len() == checklist::total_item_count()
    }

    /// Flip membership of `item_id` in the checked set
    ///
    /// Rejects ids outside the static routine. Legal in every phase except
    /// `Submitted`.
    pub fn toggle(&mut self, item_id: u16) -> Result<()> {
        self.ensure_not_submitted()?;
        if !checklist::is_valid_item(item_id) {
            return Err(Error::Validation(format!(
                "unknown checklist item id {}",
                item_id
            )));
        }
        if !self.checked.remove(&item_id) {
            self.checked.insert(item_id);
        }
        Ok(())
    }

    /// Toggle an entire section
    ///
    /// If every item of the section is checked, unchecks all of them;
    /// otherwise checks all of them (completing a partially-checked section,
    /// never partially toggling). Other sections are untouched. Applied
    /// twice with no interleaved mutation this returns the checked set to
    /// its prior state.
    pub fn toggle_section(&mut self, section: Section) -> Result<()> {
        self.ensure_not_submitted()?;
        let section_ids = checklist::section_item_ids(section);
        let all_checked = section_ids.iter().all(|id| self.checked.contains(id));
        if all_checked {
            for id in &section_ids {
                self.checked.remove(id);
            }
        } else {
            self.checked.extend(section_ids);
        }
        Ok(())
    }

    /// Replace the draft notes text
    pub fn set_notes(&mut self, notes: String) -> Result<()> {
        self.ensure_not_submitted()?;
        self.notes = notes;
        Ok(())
    }

    /// Open the credential challenge
    ///
    /// Legal only while editing with at least one item checked. The checked
    /// set is not altered.
    pub fn request_submit(&mut self) -> Result<()> {
        match self.phase {
            SessionPhase::Editing => {}
            SessionPhase::PendingAuth => {
                return Err(Error::Validation(
                    "submission already pending authentication".to_string(),
                ))
            }
            SessionPhase::Submitted => {
                return Err(Error::Validation("checklist already submitted".to_string()))
            }
        }
        if self.checked.is_empty() {
            return Err(Error::Validation(
                "cannot submit an empty checklist".to_string(),
            ));
        }
        self.phase = SessionPhase::PendingAuth;
        Ok(())
    }

    /// Close the credential challenge without submitting
    ///
    /// Returns to `Editing`; the checked set is not altered.
    pub fn cancel_submit(&mut self) -> Result<()> {
        if self.phase != SessionPhase::PendingAuth {
            return Err(Error::Validation(
                "no submission pending authentication".to_string(),
            ));
        }
        self.phase = SessionPhase::Editing;
        Ok(())
    }

    /// Consume a gate-issued authorization and produce the canonical record
    ///
    /// The authorization is moved in, so one successful challenge approves
    /// exactly one submission. The display name is denormalized into the
    /// record at this moment and never re-derived.
    pub fn submit(&mut self, authorization: SubmitAuthorization) -> Result<Submission> {
        if self.phase != SessionPhase::PendingAuth {
            return Err(Error::Validation(
                "no submission pending authentication".to_string(),
            ));
        }
        if authorization.user_id() != self.user_id {
            return Err(Error::Authentication(
                "authorization was issued for a different user".to_string(),
            ));
        }

        let submission = Submission {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            user_name: self.user_name.clone(),
            submitted_at: Utc::now(),
            completed_items: self.checked.clone(),
            is_full_complete: self.is_fully_checked(),
            notes: if self.notes.trim().is_empty() {
                None
            } else {
                Some(self.notes.clone())
            },
        };
        self.phase = SessionPhase::Submitted;
        Ok(submission)
    }

    fn ensure_not_submitted(&self) -> Result<()> {
        if self.phase == SessionPhase::Submitted {
            return Err(Error::Validation("checklist already submitted".to_string()));
        }
        Ok(())
    }

    /// Serializable snapshot for the presentation layer
    pub fn view(&self) -> SessionView {
        SessionView {
            user_id: self.user_id,
            checked_items: self.checked.iter().copied().collect(),
            notes: self.notes.clone(),
            phase: self.phase,
            progress: self.progress(),
            is_fully_checked: self.is_fully_checked(),
        }
    }
}

/// Read-only session snapshot handed to the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub user_id: Uuid,
    pub checked_items: Vec<u16>,
    pub notes: String,
    pub phase: SessionPhase,
    pub progress: f32,
    pub is_fully_checked: bool,
}

/// One session per active user
///
/// Single logical writer per session: each entry is owned by the logged-in
/// collaborator's client context. Starting a session for a user replaces
/// any previous one (the "new checklist" reset after a submission).
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, ChecklistSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) a session for `user`
    pub fn start(&self, user: &User) -> SessionView {
        let session = ChecklistSession::new(user);
        let view = session.view();
        self.sessions
            .write()
            .expect("session registry lock poisoned")
            .insert(user.id, session);
        view
    }

    /// Discard a user's session (logout)
    pub fn end(&self, user_id: Uuid) {
        self.sessions
            .write()
            .expect("session registry lock poisoned")
            .remove(&user_id);
    }

    /// Run `op` against the user's session
    pub fn with_session<T>(
        &self,
        user_id: Uuid,
        op: impl FnOnce(&mut ChecklistSession) -> Result<T>,
    ) -> Result<T> {
        let mut sessions = self
            .sessions
            .write()
            .expect("session registry lock poisoned");
        let session = sessions
            .get_mut(&user_id)
            .ok_or_else(|| Error::NotFound(format!("no active session for user {}", user_id)))?;
        op(session)
    }

    /// Snapshot a user's session state
    pub fn view(&self, user_id: Uuid) -> Result<SessionView> {
        let sessions = self.sessions.read().expect("session registry lock poisoned");
        sessions
            .get(&user_id)
            .map(|s| s.view())
            .ok_or_else(|| Error::NotFound(format!("no active session for user {}", user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::challenge;
    use cxm_common::models::UserRole;

    fn collaborator(password: Option<&str>) -> User {
        User {
            id: Uuid::from_u128(42),
            name: "Ana Souza".to_string(),
            email: "ana@example.com".to_string(),
            role: UserRole::Collaborator,
            active: true,
            password: password.map(|p| p.to_string()),
        }
    }

    #[test]
    fn test_toggle_flips_membership() {
        let mut session = ChecklistSession::new(&collaborator(None));
        session.toggle(3).unwrap();
        assert!(session.checked().contains(&3));
        session.toggle(3).unwrap();
        assert!(!session.checked().contains(&3));
    }

    #[test]
    fn test_toggle_rejects_unknown_item() {
        let mut session = ChecklistSession::new(&collaborator(None));
        let err = session.toggle(99).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(session.checked().is_empty());
    }

    #[test]
    fn test_toggle_section_completes_partial_section() {
        let mut session = ChecklistSession::new(&collaborator(None));
        session.toggle(1).unwrap();
        session.toggle(2).unwrap();
        // Partially checked: toggling the section checks the rest,
        // never unchecks the two already done.
        session.toggle_section(Section::Opening).unwrap();
        assert_eq!(session.checked().len(), 15);
    }

    #[test]
    fn test_toggle_section_is_an_involution() {
        let mut session = ChecklistSession::new(&collaborator(None));
        session.toggle(16).unwrap();
        let before = session.checked().clone();

        session.toggle_section(Section::Opening).unwrap();
        session.toggle_section(Section::Opening).unwrap();

        assert_eq!(session.checked(), &before);
    }

    #[test]
    fn test_toggle_section_leaves_other_sections_untouched() {
        let mut session = ChecklistSession::new(&collaborator(None));
        session.toggle(16).unwrap();
        session.toggle_section(Section::Opening).unwrap();
        assert!(session.checked().contains(&16));
        assert_eq!(session.checked().len(), 16);
    }

    #[test]
    fn test_request_submit_requires_nonempty_set() {
        let mut session = ChecklistSession::new(&collaborator(None));
        assert!(matches!(
            session.request_submit().unwrap_err(),
            Error::Validation(_)
        ));
        session.toggle(1).unwrap();
        session.request_submit().unwrap();
        assert_eq!(session.phase(), SessionPhase::PendingAuth);
    }

    #[test]
    fn test_cancel_submit_restores_editing_without_losing_progress() {
        let mut session = ChecklistSession::new(&collaborator(None));
        session.toggle(1).unwrap();
        session.toggle(2).unwrap();
        session.request_submit().unwrap();
        session.cancel_submit().unwrap();
        assert_eq!(session.phase(), SessionPhase::Editing);
        assert_eq!(session.checked().len(), 2);
    }

    #[test]
    fn test_failed_challenge_leaves_session_exactly_as_it_was() {
        let user = collaborator(Some("segredo"));
        let mut session = ChecklistSession::new(&user);
        session.toggle(1).unwrap();
        session.request_submit().unwrap();
        let before = session.checked().clone();

        assert!(challenge("wrong", &user).is_err());

        assert_eq!(session.checked(), &before);
        assert_eq!(session.phase(), SessionPhase::PendingAuth);
    }

    #[test]
    fn test_full_run_scenario() {
        // Check 1-15, section-toggle Opening back off, then complete all 20
        // individually and submit through the gate.
        let user = collaborator(Some("segredo"));
        let mut session = ChecklistSession::new(&user);

        for id in 1..=15 {
            session.toggle(id).unwrap();
        }
        session.toggle_section(Section::Opening).unwrap();
        assert!(session.checked().is_empty());
        assert_eq!(session.progress(), 0.0);

        for id in 1..=20 {
            session.toggle(id).unwrap();
        }
        assert!(session.is_fully_checked());
        session.request_submit().unwrap();

        let authorization = challenge("segredo", &user).unwrap();
        let submission = session.submit(authorization).unwrap();

        assert_eq!(submission.completed_items.len(), 20);
        assert!(submission.is_full_complete);
        assert_eq!(submission.user_name, "Ana Souza");
        assert_eq!(session.phase(), SessionPhase::Submitted);
    }

    #[test]
    fn test_submitted_session_rejects_further_mutation() {
        let user = collaborator(None);
        let mut session = ChecklistSession::new(&user);
        session.toggle(1).unwrap();
        session.request_submit().unwrap();
        let authorization = challenge("", &user).unwrap();
        session.submit(authorization).unwrap();

        assert!(session.toggle(2).is_err());
        assert!(session.set_notes("late".to_string()).is_err());
        assert!(session.request_submit().is_err());
    }

    #[test]
    fn test_authorization_for_other_user_is_rejected() {
        let user = collaborator(Some("segredo"));
        let other = User {
            id: Uuid::from_u128(77),
            ..collaborator(None)
        };
        let mut session = ChecklistSession::new(&user);
        session.toggle(1).unwrap();
        session.request_submit().unwrap();

        let foreign = challenge("", &other).unwrap();
        assert!(matches!(
            session.submit(foreign).unwrap_err(),
            Error::Authentication(_)
        ));
        // Still pending: the real owner can retry.
        assert_eq!(session.phase(), SessionPhase::PendingAuth);
    }

    #[test]
    fn test_registry_replaces_submitted_session_on_start() {
        let user = collaborator(None);
        let registry = SessionRegistry::new();
        registry.start(&user);
        registry
            .with_session(user.id, |s| {
                s.toggle(1)?;
                s.request_submit()
            })
            .unwrap();
        let authorization = challenge("", &user).unwrap();
        registry
            .with_session(user.id, |s| s.submit(authorization))
            .unwrap();

        let view = registry.start(&user);
        assert!(view.checked_items.is_empty());
        assert_eq!(view.phase, SessionPhase::Editing);
    }

    #[test]
    fn test_registry_end_discards_session() {
        let user = collaborator(None);
        let registry = SessionRegistry::new();
        registry.start(&user);
        registry.end(user.id);
        assert!(matches!(
            registry.view(user.id).unwrap_err(),
            Error::NotFound(_)
        ));
    }

    #[test]
    fn test_notes_blank_becomes_none_in_record() {
        let user = collaborator(None);
        let mut session = ChecklistSession::new(&user);
        session.set_notes("   ".to_string()).unwrap();
        session.toggle(1).unwrap();
        session.request_submit().unwrap();
        let submission = session.submit(challenge("", &user).unwrap()).unwrap();
        assert!(submission.notes.is_none());
    }
}
