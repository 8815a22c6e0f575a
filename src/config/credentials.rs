//! Credentials for the hosted record backend.
//!
//! Both values come from the environment (usually through `.env`), never from
//! the settings file, so the file can be committed.

use crate::errors::Result;
use std::env;
use tracing::error;

/// Environment variable holding the project identifier.
pub const PROJECT_ID_VAR: &str = "CRM_PROJECT_ID";
/// Environment variable holding the public API key.
pub const PUBLIC_KEY_VAR: &str = "CRM_PUBLIC_KEY";

/// Project identifier and public key of a hosted backend project.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Sent as `X-Project-Id`
    pub project_id: String,
    /// Sent as the bearer token
    pub public_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("project_id", &self.project_id)
            .field("public_key", &"<redacted>")
            .finish()
    }
}

/// Reads [`PROJECT_ID_VAR`] and [`PUBLIC_KEY_VAR`].
pub fn from_env() -> Result<Credentials> {
    let read = |name: &str| env::var(name).inspect_err(|e| error!("{} not available: {}", name, e));
    Ok(Credentials {
        project_id: read(PROJECT_ID_VAR)?,
        public_key: read(PUBLIC_KEY_VAR)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_public_key() {
        let credentials = Credentials {
            project_id: "proj-7".into(),
            public_key: "secret-key".into(),
        };
        let shown = format!("{credentials:?}");
        assert!(shown.contains("proj-7"));
        assert!(!shown.contains("secret-key"));
    }
}
