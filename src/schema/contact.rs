//! Contact records (`contact_c`).

use super::{Backlink, RecordId, RecordSchema, codec};
use crate::backend::SortType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A person the team is in touch with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Backend identifier
    #[serde(rename = "Id")]
    pub id: RecordId,
    /// Display name, `"first last"`
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    /// Given name
    #[serde(rename = "first_name_c", default)]
    pub first_name: Option<String>,
    /// Family name
    #[serde(rename = "last_name_c", default)]
    pub last_name: Option<String>,
    /// Email address
    #[serde(rename = "email_c", default)]
    pub email: Option<String>,
    /// Phone or mobile number
    #[serde(rename = "phone_c", default, deserialize_with = "codec::text")]
    pub phone: Option<String>,
    /// Employer, as free text
    #[serde(rename = "company_c", default)]
    pub company: Option<String>,
    /// Job title
    #[serde(rename = "position_c", default)]
    pub position: Option<String>,
    /// Free-form notes
    #[serde(rename = "notes_c", default)]
    pub notes: Option<String>,
    /// Creation time
    #[serde(rename = "CreatedOn", default, deserialize_with = "codec::timestamp")]
    pub created_on: Option<DateTime<Utc>>,
    /// Last modification time
    #[serde(rename = "ModifiedOn", default, deserialize_with = "codec::timestamp")]
    pub modified_on: Option<DateTime<Utc>>,
}

/// Validated input for a new contact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDraft {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Email address
    pub email: String,
    /// Phone or mobile number
    pub phone: Option<String>,
    /// Company name as free text
    pub company: String,
    /// Job title
    pub position: Option<String>,
    /// Free-text notes
    pub notes: Option<String>,
}

/// Sparse contact update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
    /// New given name
    pub first_name: Option<String>,
    /// New family name
    pub last_name: Option<String>,
    /// New email
    pub email: Option<String>,
    /// `Some(None)` clears the phone
    pub phone: Option<Option<String>>,
    /// New company name
    pub company: Option<String>,
    /// `Some(None)` clears the position
    pub position: Option<Option<String>>,
    /// `Some(None)` clears the notes
    pub notes: Option<Option<String>>,
}

impl From<ContactDraft> for ContactPatch {
    fn from(draft: ContactDraft) -> Self {
        Self {
            first_name: Some(draft.first_name),
            last_name: Some(draft.last_name),
            email: Some(draft.email),
            phone: Some(draft.phone),
            company: Some(draft.company),
            position: Some(draft.position),
            notes: Some(draft.notes),
        }
    }
}

/// `"first last"`, trimmed; empty when both parts are blank.
#[must_use]
pub fn full_name(first: &str, last: &str) -> String {
    format!("{} {}", first.trim(), last.trim()).trim().to_string()
}

impl RecordSchema for Contact {
    const TABLE: &'static str = "contact_c";
    const LABEL: &'static str = "contact";
    const FIELDS: &'static [&'static str] = &[
        "Id",
        "Name",
        "first_name_c",
        "last_name_c",
        "email_c",
        "phone_c",
        "company_c",
        "position_c",
        "notes_c",
        "CreatedOn",
        "ModifiedOn",
    ];
    const ORDER_FIELD: &'static str = "ModifiedOn";
    const ORDER: SortType = SortType::Desc;
    const REFERENCED_BY: &'static [Backlink] = &[
        Backlink { table: "deal_c", field: "contact_id_c" },
        Backlink { table: "quote_c", field: "contact_id_c" },
        Backlink { table: "tasks_c", field: "contact_id_c" },
        Backlink { table: "activity_c", field: "contact_id_c" },
    ];

    type Draft = ContactDraft;
    type Patch = ContactPatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn display_name(&self) -> String {
        let composed = full_name(
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default(),
        );
        if composed.is_empty() {
            self.name.clone().unwrap_or_default()
        } else {
            composed
        }
    }

    fn create_fields(draft: &ContactDraft) -> Map<String, Value> {
        let name = full_name(&draft.first_name, &draft.last_name);
        let mut fields = Map::new();
        fields.insert(
            "Name".into(),
            Value::from(if name.is_empty() { "New Contact".to_string() } else { name }),
        );
        fields.insert("first_name_c".into(), Value::from(draft.first_name.as_str()));
        fields.insert("last_name_c".into(), Value::from(draft.last_name.as_str()));
        fields.insert("email_c".into(), Value::from(draft.email.as_str()));
        fields.insert("phone_c".into(), codec::text_value(draft.phone.as_deref()));
        fields.insert("company_c".into(), Value::from(draft.company.as_str()));
        fields.insert("position_c".into(), codec::text_value(draft.position.as_deref()));
        fields.insert("notes_c".into(), codec::text_value(draft.notes.as_deref()));
        fields
    }

    fn patch_fields(patch: &ContactPatch) -> Map<String, Value> {
        let mut fields = Map::new();
        // Name can only be derived when both halves are part of the patch.
        if let (Some(first), Some(last)) = (&patch.first_name, &patch.last_name) {
            fields.insert("Name".into(), Value::from(full_name(first, last)));
        }
        if let Some(first) = &patch.first_name {
            fields.insert("first_name_c".into(), Value::from(first.as_str()));
        }
        if let Some(last) = &patch.last_name {
            fields.insert("last_name_c".into(), Value::from(last.as_str()));
        }
        if let Some(email) = &patch.email {
            fields.insert("email_c".into(), Value::from(email.as_str()));
        }
        if let Some(phone) = &patch.phone {
            fields.insert("phone_c".into(), codec::text_value(phone.as_deref()));
        }
        if let Some(company) = &patch.company {
            fields.insert("company_c".into(), Value::from(company.as_str()));
        }
        if let Some(position) = &patch.position {
            fields.insert("position_c".into(), codec::text_value(position.as_deref()));
        }
        if let Some(notes) = &patch.notes {
            fields.insert("notes_c".into(), codec::text_value(notes.as_deref()));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_create_fields_derive_display_name() {
        let draft = ContactDraft {
            first_name: " Ann ".into(),
            last_name: "Lee".into(),
            email: "ann@example.com".into(),
            company: "Acme".into(),
            ..Default::default()
        };
        let fields = Contact::create_fields(&draft);
        assert_eq!(fields["Name"], "Ann Lee");
        assert_eq!(fields["phone_c"], Value::Null);
    }

    #[test]
    fn test_patch_without_both_names_leaves_display_name_alone() {
        let patch = ContactPatch {
            first_name: Some("Anna".into()),
            ..Default::default()
        };
        let fields = Contact::patch_fields(&patch);
        assert_eq!(fields.len(), 1);
        assert!(fields.contains_key("first_name_c"));
    }

    #[test]
    fn test_decodes_backend_row() {
        let row = serde_json::json!({
            "Id": 3,
            "Name": "Bob Stone",
            "first_name_c": "Bob",
            "last_name_c": "Stone",
            "phone_c": 5550100,
            "ModifiedOn": "2024-02-01T08:00:00Z"
        });
        let contact: Contact = serde_json::from_value(row).unwrap();
        assert_eq!(contact.id, RecordId(3));
        assert_eq!(contact.phone.as_deref(), Some("5550100"));
        assert_eq!(contact.display_name(), "Bob Stone");
        assert!(contact.modified_on.is_some());
    }
}
