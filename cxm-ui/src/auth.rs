//! Submission authentication gate
//!
//! A single-step credential challenge that stands between a candidate
//! record and the submission log. Credentials are compared as plaintext,
//! a preserved weakness of the system being reimplemented, explicitly out
//! of scope to harden here.
//!
//! Accounts with no stored credential pass the challenge unconditionally.
//! This open gate is intentional (accounts are provisioned without a
//! password on purpose) and must not be silently "fixed": closing it would
//! lock those accounts out.

use cxm_common::models::User;
use cxm_common::{Error, Result};
use uuid::Uuid;

/// Proof that one credential challenge succeeded
///
/// Deliberately not `Clone` and consumed by
/// [`crate::session::ChecklistSession::submit`]: a successful challenge
/// authorizes exactly one submission, and a second submission requires a
/// fresh challenge.
#[derive(Debug)]
pub struct SubmitAuthorization {
    user_id: Uuid,
}

impl SubmitAuthorization {
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }
}

/// Validate `candidate` against the user's stored credential
///
/// Succeeds iff the candidate equals the stored credential, or the account
/// has no credential at all (open gate). Failure carries a retryable,
/// user-facing reason and has no side effect: the caller's session state
/// and checked set are untouched.
pub fn challenge(candidate: &str, user: &User) -> Result<SubmitAuthorization> {
    match &user.password {
        None => Ok(SubmitAuthorization { user_id: user.id }),
        Some(stored) if candidate == stored => Ok(SubmitAuthorization { user_id: user.id }),
        Some(_) => Err(Error::Authentication(
            "Incorrect password. Please try again.".to_string(),
        )),
    }
}
