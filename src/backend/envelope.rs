//! The backend's response envelope and its tagged outcome.
//!
//! Every backend call answers with the same wrapper:
//! `{success, message?, data?, results?: [{success, data?, message?, errors?}]}`.
//! [`ResponseEnvelope::into_outcome`] turns it into either a [`Settled`] value
//! or a [`BackendFailure`], so callers match on a result instead of probing
//! optional fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::error;

/// Message used when the backend fails without saying why.
const UNSPECIFIED_FAILURE: &str = "The backend reported a failure without a message";

/// One field-level complaint attached to a rejected record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    /// Label of the offending field
    #[serde(rename = "fieldLabel", default)]
    pub field_label: String,
    /// What is wrong with it
    #[serde(default)]
    pub message: String,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field_label, self.message)
    }
}

/// Outcome for one record of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordResult {
    /// Whether this record was accepted
    pub success: bool,
    /// Stored form of an accepted record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Why the record was refused
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Field-level problems of a refused record
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldIssue>,
}

impl RecordResult {
    /// Accepted record carrying its stored form.
    #[must_use]
    pub const fn accepted(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: Vec::new(),
        }
    }

    /// Rejected record with field-level issues.
    #[must_use]
    pub fn rejected(message: impl Into<String>, errors: Vec<FieldIssue>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            errors,
        }
    }

    /// Best human readable reason for a rejection.
    fn reason(&self) -> String {
        self.message
            .clone()
            .filter(|m| !m.is_empty())
            .or_else(|| self.errors.first().map(ToString::to_string))
            .unwrap_or_else(|| UNSPECIFIED_FAILURE.to_string())
    }
}

/// The uniform response wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// `false` when the whole call failed
    pub success: bool,
    /// Failure text when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Payload of a read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Per-record outcomes of a write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<RecordResult>>,
}

impl ResponseEnvelope {
    /// Successful read answer.
    #[must_use]
    pub const fn with_data(data: Value) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            results: None,
        }
    }

    /// Successful batch answer; `success` stays true even when individual records were rejected.
    #[must_use]
    pub const fn with_results(results: Vec<RecordResult>) -> Self {
        Self {
            success: true,
            message: None,
            data: None,
            results: Some(results),
        }
    }

    /// Overall failure.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            results: None,
        }
    }

    /// Settles the envelope.
    ///
    /// `success: false` becomes [`FailureKind::Rejected`]. Any rejected record
    /// in `results` becomes [`FailureKind::RecordRejected`]; every rejection is
    /// logged and the first one's message is carried.
    pub fn into_outcome(self) -> Result<Settled, BackendFailure> {
        if !self.success {
            return Err(BackendFailure {
                kind: FailureKind::Rejected,
                message: self
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| UNSPECIFIED_FAILURE.to_string()),
                details: Vec::new(),
            });
        }

        let Some(results) = self.results else {
            return Ok(Settled {
                data: self.data,
                accepted: Vec::new(),
                batch_len: 0,
            });
        };

        let batch_len = results.len();
        let (accepted, rejected): (Vec<_>, Vec<_>) = results.into_iter().partition(|r| r.success);
        if let Some(first) = rejected.first() {
            for rejection in &rejected {
                error!(
                    "Record rejected by backend: {} {:?}",
                    rejection.reason(),
                    rejection.errors
                );
            }
            return Err(BackendFailure {
                kind: FailureKind::RecordRejected,
                message: first.reason(),
                details: rejected.iter().flat_map(|r| r.errors.iter().cloned()).collect(),
            });
        }

        Ok(Settled {
            data: self.data,
            accepted: accepted.into_iter().map(|r| r.data.unwrap_or(Value::Null)).collect(),
            batch_len,
        })
    }
}

/// A successfully settled envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Settled {
    /// Top-level `data` (reads)
    pub data: Option<Value>,
    /// `data` of every accepted record, in batch order (writes)
    pub accepted: Vec<Value>,
    /// Number of per-record results the backend returned; zero when it sent none
    pub batch_len: usize,
}

impl Settled {
    /// Whether the envelope carried per-record results at all.
    #[must_use]
    pub const fn has_results(&self) -> bool {
        self.batch_len > 0
    }

    /// First accepted record.
    #[must_use]
    pub fn first_accepted(self) -> Option<Value> {
        self.accepted.into_iter().next().filter(|v| !v.is_null())
    }
}

/// How the backend refused a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The whole call failed (`success: false`)
    Rejected,
    /// The call went through but at least one record was refused
    RecordRejected,
}

/// A backend-reported failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct BackendFailure {
    /// Whether the call or a single record failed
    pub kind: FailureKind,
    /// Message to show to the user
    pub message: String,
    /// Field-level issues of every rejected record
    pub details: Vec<FieldIssue>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    #[test]
    fn test_overall_failure_is_rejected() {
        let envelope: ResponseEnvelope =
            serde_json::from_value(json!({"success": false, "message": "Table not found"})).unwrap();
        let failure = envelope.into_outcome().unwrap_err();
        assert_eq!(failure.kind, FailureKind::Rejected);
        assert_eq!(failure.message, "Table not found");
    }

    #[test]
    fn test_first_rejection_message_wins() {
        let envelope: ResponseEnvelope = serde_json::from_value(json!({
            "success": true,
            "results": [
                {"success": true, "data": {"Id": 1}},
                {"success": false, "message": "Email is invalid",
                 "errors": [{"fieldLabel": "email_c", "message": "invalid"}]},
                {"success": false, "message": "Name is required"}
            ]
        }))
        .unwrap();
        let failure = envelope.into_outcome().unwrap_err();
        assert_eq!(failure.kind, FailureKind::RecordRejected);
        assert_eq!(failure.message, "Email is invalid");
        assert_eq!(failure.details.len(), 1);
        assert_eq!(failure.details[0].field_label, "email_c");
    }

    #[test]
    fn test_rejection_without_message_uses_field_issue() {
        let envelope = ResponseEnvelope::with_results(vec![RecordResult::rejected(
            "",
            vec![FieldIssue {
                field_label: "contact_id_c".into(),
                message: "Record 9 does not exist".into(),
            }],
        )]);
        let failure = envelope.into_outcome().unwrap_err();
        assert_eq!(failure.message, "contact_id_c: Record 9 does not exist");
    }

    #[test]
    fn test_accepted_batch_keeps_record_data() {
        let settled = ResponseEnvelope::with_results(vec![RecordResult::accepted(json!({"Id": 3}))])
            .into_outcome()
            .unwrap();
        assert!(settled.has_results());
        assert_eq!(settled.first_accepted(), Some(json!({"Id": 3})));
    }

    #[test]
    fn test_plain_success_has_no_results() {
        let settled = ResponseEnvelope {
            success: true,
            message: None,
            data: None,
            results: None,
        }
        .into_outcome()
        .unwrap();
        assert!(!settled.has_results());
        assert!(settled.data.is_none());
    }
}
