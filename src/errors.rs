//! Unified error types for `pipeline-desk`.
//!
//! Every fallible operation in the crate returns [`Result`]. Backend-reported
//! failures keep their tagged shape ([`BackendFailure`]) so callers can match on
//! the failure kind instead of probing optional fields.

use crate::backend::BackendFailure;
use crate::schema::RecordId;
use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Settings file or environment could not be turned into a configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Local record store failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// The remote backend could not be reached or answered garbage
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A record or payload did not have the expected JSON shape
    #[error("Malformed record payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// The backend answered with `success: false` or rejected a record
    #[error(transparent)]
    Backend(#[from] BackendFailure),

    /// The backend reported success but returned no record to decode
    #[error("The {table} response did not contain a record")]
    MissingRecord {
        /// Backend table name
        table: &'static str,
    },

    /// A form was asked to edit a field it does not have
    #[error("Unknown form field '{field}'")]
    UnknownField {
        /// Field name as given by the caller
        field: String,
    },

    /// Delete refused because other records still point at the target
    #[error("Record {id} in {table} is still referenced by {count} record(s)")]
    StillReferenced {
        /// Backend table of the record being deleted
        table: &'static str,
        /// Identifier of the record being deleted
        id: RecordId,
        /// Number of referencing records found
        count: usize,
    },

    /// An action needed a signed-in session
    #[error("Not signed in")]
    SignedOut,

    /// I/O failure (settings file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Required environment variable missing or not unicode
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
