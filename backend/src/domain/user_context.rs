//! Explicit per-call identity.
//!
//! Every service and store call receives the user it acts for instead of
//! reading a process-wide "current user".

use crate::domain::errors::DomainError;

/// Identity handed over by the authentication provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: String,
    pub authenticated: bool,
}

impl UserContext {
    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), authenticated: true }
    }

    pub fn anonymous() -> Self {
        Self { user_id: String::new(), authenticated: false }
    }

    /// The user ID to scope store calls with, if this context may touch data at all.
    pub fn owner_id(&self) -> Option<&str> {
        if self.authenticated && !self.user_id.trim().is_empty() {
            Some(&self.user_id)
        } else {
            None
        }
    }

    pub fn require_owner(&self) -> Result<&str, DomainError> {
        self.owner_id().ok_or(DomainError::Unauthenticated)
    }
}
