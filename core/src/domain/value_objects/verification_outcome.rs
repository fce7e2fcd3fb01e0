//! Result of redeeming an email verification token.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::UserProfile;

/// Outcome of `verify` on a verification token
///
/// `NotFound` and `Expired` are expected results, not failures. `Expired`
/// means the pending account was purged along with the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "user", rename_all = "snake_case")]
pub enum VerificationOutcome {
    Verified(UserProfile),
    NotFound,
    Expired,
}

impl VerificationOutcome {
    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationOutcome::Verified(_))
    }
}
