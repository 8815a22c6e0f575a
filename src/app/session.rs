//! The signed-in session.
//!
//! Handed explicitly to whatever needs it; pages never look it up globally.

use super::notify::Notifier;
use crate::config::credentials::Credentials;
use crate::errors::{Error, Result};
use tracing::info;

/// Who is signed in, if anyone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user: Option<String>,
}

impl Session {
    /// Session signed in as `user`.
    pub fn signed_in(user: impl Into<String>) -> Self {
        Self { user: Some(user.into()) }
    }

    /// Session for a hosted project.
    #[must_use]
    pub fn for_project(credentials: &Credentials) -> Self {
        Self::signed_in(format!("project {}", credentials.project_id))
    }

    /// Session nobody is signed in to.
    #[must_use]
    pub fn signed_out() -> Self {
        Self { user: None }
    }

    /// Signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Whether someone is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Fails with [`Error::SignedOut`] unless signed in.
    pub fn require(&self) -> Result<()> {
        if self.is_authenticated() { Ok(()) } else { Err(Error::SignedOut) }
    }

    /// Ends the session. Returns whether there was one to end.
    pub fn logout(&mut self, notifier: &dyn Notifier) -> bool {
        match self.user.take() {
            Some(user) => {
                info!("Signed out {}", user);
                notifier.success("Logged out successfully");
                true
            }
            None => {
                notifier.error("Failed to logout");
                false
            }
        }
    }
}
