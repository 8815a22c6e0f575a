//! Record shapes - the six CRM entities as the backend stores them.
//!
//! Each entity module defines the decoded record, its typed draft (what a create
//! sends) and its sparse patch (what an update sends), plus the mapping from
//! those typed values to the backend's field names. Values are coerced once,
//! here and in [`codec`], so services and forms never re-parse strings.

pub mod activity;
pub mod codec;
pub mod company;
pub mod contact;
pub mod deal;
pub mod quote;
pub mod task;

pub use activity::{Activity, ActivityDraft, ActivityKind, ActivityPatch};
pub use company::{Company, CompanyDraft, CompanyPatch, CompanySize};
pub use contact::{Contact, ContactDraft, ContactPatch};
pub use deal::{Deal, DealDraft, DealPatch, DealStage};
pub use quote::{Address, Quote, QuoteDraft, QuotePatch, QuoteStatus};
pub use task::{Task, TaskDraft, TaskPatch, TaskPriority, TaskStatus};

use crate::backend::SortType;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Backend-assigned record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A reference field pointing at another record.
///
/// The backend returns references either as a bare id or as a lookup object
/// carrying the target's display name; both decode to this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    /// Identifier of the referenced record
    #[serde(rename = "Id")]
    pub id: RecordId,
    /// Display name of the referenced record, when the backend expanded it
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Reference {
    /// Reference without an embedded display name.
    #[must_use]
    pub const fn to(id: RecordId) -> Self {
        Self { id, name: None }
    }
}

/// A field in another table that may hold a reference to this entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backlink {
    /// Table holding the reference
    pub table: &'static str,
    /// Reference field in that table
    pub field: &'static str,
}

/// Static description of one entity and its mapping to backend fields.
pub trait RecordSchema: DeserializeOwned + Clone + Send + Sync + 'static {
    /// Backend table name
    const TABLE: &'static str;
    /// Singular lowercase noun used in logs and notifications
    const LABEL: &'static str;
    /// Field projection requested on every read
    const FIELDS: &'static [&'static str];
    /// Field the collection is ordered by
    const ORDER_FIELD: &'static str;
    /// Direction of [`Self::ORDER_FIELD`]
    const ORDER: SortType;
    /// Reference fields elsewhere that point at this entity
    const REFERENCED_BY: &'static [Backlink] = &[];

    /// Fully validated input for a create
    type Draft: Send + Sync;
    /// Sparse input for an update; a full draft converts into a patch with every field set
    type Patch: From<Self::Draft> + Default + Send + Sync;

    /// Record identifier
    fn id(&self) -> RecordId;

    /// Human readable name for lists and pickers
    fn display_name(&self) -> String;

    /// Backend field map for a create request
    fn create_fields(draft: &Self::Draft) -> Map<String, Value>;

    /// Backend field map holding only the fields present in `patch`
    fn patch_fields(patch: &Self::Patch) -> Map<String, Value>;
}

/// A closed set of string values stored in a single backend field.
pub trait Choice: Sized + Copy + 'static {
    /// Every variant, in display order
    const ALL: &'static [Self];
    /// Name of the field kind, for error messages
    const KIND: &'static str;

    /// Value as stored by the backend
    fn as_str(self) -> &'static str;

    /// Parses a stored value, ignoring ASCII case.
    fn parse(value: &str) -> Result<Self, UnknownChoice> {
        let trimmed = value.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownChoice {
                kind: Self::KIND,
                value: trimmed.to_string(),
            })
    }
}

/// A stored value that matched none of the variants of a [`Choice`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid {kind}")]
pub struct UnknownChoice {
    /// Field kind
    pub kind: &'static str,
    /// Offending value
    pub value: String,
}

/// Implements [`Choice`], `Display` and `Serialize` for a unit-only enum.
macro_rules! choice {
    ($ty:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $crate::schema::Choice for $ty {
            const ALL: &'static [Self] = &[$(Self::$variant),+];
            const KIND: &'static str = $kind;

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl ::std::fmt::Display for $ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::schema::Choice::as_str(*self))
            }
        }

        impl ::std::str::FromStr for $ty {
            type Err = $crate::schema::UnknownChoice;

            fn from_str(value: &str) -> ::std::result::Result<Self, Self::Err> {
                <Self as $crate::schema::Choice>::parse(value)
            }
        }

        impl ::serde::Serialize for $ty {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str($crate::schema::Choice::as_str(*self))
            }
        }
    };
}

pub(crate) use choice;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_choice_parse_ignores_case_and_whitespace() {
        assert_eq!(DealStage::parse(" Won ").unwrap(), DealStage::Won);
        assert_eq!("not started".parse::<TaskStatus>().unwrap(), TaskStatus::NotStarted);
    }

    #[test]
    fn test_choice_parse_rejects_unknown_value() {
        let err = CompanySize::parse("Huge").unwrap_err();
        assert_eq!(err.kind, "company size");
        assert_eq!(err.to_string(), "'Huge' is not a valid company size");
    }

    #[test]
    fn test_record_id_is_transparent_in_json() {
        let id: RecordId = serde_json::from_str("42").unwrap();
        assert_eq!(id, RecordId(42));
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
    }
}
