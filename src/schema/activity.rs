//! Activity records (`activity_c`) - the interaction history behind the feed.

use super::{RecordId, RecordSchema, Reference, codec};
use crate::backend::SortType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of interaction an activity records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    /// Phone call
    Call,
    /// Email exchange
    Email,
    /// Meeting
    Meeting,
    /// Free-form note
    Note,
    /// Completed task
    Task,
}

super::choice!(ActivityKind, "activity type", {
    Call => "call",
    Email => "email",
    Meeting => "meeting",
    Note => "note",
    Task => "task",
});

impl ActivityKind {
    /// Icon name shown next to the entry.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Call => "Phone",
            Self::Email => "Mail",
            Self::Meeting => "Calendar",
            Self::Note => "FileText",
            Self::Task => "CheckCircle",
        }
    }
}

/// One logged interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Backend identifier
    #[serde(rename = "Id")]
    pub id: RecordId,
    /// Display name
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    /// Call, email, meeting and so on
    #[serde(rename = "type_c", default, deserialize_with = "codec::choice")]
    pub kind: Option<ActivityKind>,
    /// What happened
    #[serde(rename = "description_c", default)]
    pub description: Option<String>,
    /// When the interaction happened
    #[serde(rename = "timestamp_c", default, deserialize_with = "codec::timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Contact involved
    #[serde(rename = "contact_id_c", default, deserialize_with = "codec::reference")]
    pub contact: Option<Reference>,
    /// Deal it relates to
    #[serde(rename = "deal_id_c", default, deserialize_with = "codec::reference")]
    pub deal: Option<Reference>,
}

/// Validated input for a new activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityDraft {
    /// Explicit display name; the kind is used when absent
    pub name: Option<String>,
    /// Activity type
    pub kind: ActivityKind,
    /// What happened
    pub description: String,
    /// When it happened
    pub timestamp: DateTime<Utc>,
    /// Contact involved
    pub contact: Option<RecordId>,
    /// Deal it relates to
    pub deal: Option<RecordId>,
}

/// Sparse activity update; `None` leaves a field as stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityPatch {
    /// New display name
    pub name: Option<String>,
    /// New type
    pub kind: Option<ActivityKind>,
    /// New description
    pub description: Option<String>,
    /// New timestamp
    pub timestamp: Option<DateTime<Utc>>,
    /// `Some(None)` unlinks the contact
    pub contact: Option<Option<RecordId>>,
    /// `Some(None)` unlinks the deal
    pub deal: Option<Option<RecordId>>,
}

impl From<ActivityDraft> for ActivityPatch {
    fn from(draft: ActivityDraft) -> Self {
        Self {
            name: draft.name,
            kind: Some(draft.kind),
            description: Some(draft.description),
            timestamp: Some(draft.timestamp),
            contact: Some(draft.contact),
            deal: Some(draft.deal),
        }
    }
}

impl RecordSchema for Activity {
    const TABLE: &'static str = "activity_c";
    const LABEL: &'static str = "activity";
    const FIELDS: &'static [&'static str] = &[
        "Id",
        "Name",
        "type_c",
        "description_c",
        "timestamp_c",
        "contact_id_c",
        "deal_id_c",
    ];
    const ORDER_FIELD: &'static str = "timestamp_c";
    const ORDER: SortType = SortType::Desc;

    type Draft = ActivityDraft;
    type Patch = ActivityPatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.kind.map(|k| super::Choice::as_str(k).to_string()))
            .unwrap_or_default()
    }

    fn create_fields(draft: &ActivityDraft) -> Map<String, Value> {
        let kind = super::Choice::as_str(draft.kind);
        let name = draft
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(kind);
        let mut fields = Map::new();
        fields.insert("Name".into(), Value::from(name));
        fields.insert("type_c".into(), Value::from(kind));
        fields.insert("description_c".into(), Value::from(draft.description.as_str()));
        fields.insert("timestamp_c".into(), codec::timestamp_value(Some(draft.timestamp)));
        fields.insert("contact_id_c".into(), codec::reference_value(draft.contact));
        fields.insert("deal_id_c".into(), codec::reference_value(draft.deal));
        fields
    }

    fn patch_fields(patch: &ActivityPatch) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(name) = &patch.name {
            fields.insert("Name".into(), Value::from(name.as_str()));
        }
        if let Some(kind) = patch.kind {
            fields.insert("type_c".into(), Value::from(super::Choice::as_str(kind)));
        }
        if let Some(description) = &patch.description {
            fields.insert("description_c".into(), Value::from(description.as_str()));
        }
        if let Some(timestamp) = patch.timestamp {
            fields.insert("timestamp_c".into(), codec::timestamp_value(Some(timestamp)));
        }
        if let Some(contact) = patch.contact {
            fields.insert("contact_id_c".into(), codec::reference_value(contact));
        }
        if let Some(deal) = patch.deal {
            fields.insert("deal_id_c".into(), codec::reference_value(deal));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_name_falls_back_to_kind() {
        let draft = ActivityDraft {
            name: None,
            kind: ActivityKind::Meeting,
            description: "Quarterly review".into(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 14, 0, 0).unwrap(),
            contact: Some(RecordId(1)),
            deal: None,
        };
        let fields = Activity::create_fields(&draft);
        assert_eq!(fields["Name"], "meeting");
        assert_eq!(fields["timestamp_c"], "2024-05-01T14:00:00+00:00");
        assert_eq!(fields["deal_id_c"], Value::Null);
    }
}
