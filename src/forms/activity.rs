//! Activity form.

use super::{FieldErrors, PickerSet, RecordForm, optional, optional_reference, required};
use crate::schema::{Activity, ActivityDraft, ActivityKind, Choice, codec};
use chrono::Utc;

/// Activity form state, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityForm {
    /// Optional subject line
    pub name: String,
    /// Activity type, e.g. `call`
    pub kind: String,
    /// What happened
    pub description: String,
    /// `YYYY-MM-DDTHH:MM` (UTC); blank means "now"
    pub timestamp: String,
    /// Contact id, or blank
    pub contact: String,
    /// Deal id, or blank
    pub deal: String,
}

impl RecordForm for ActivityForm {
    type Entity = Activity;

    const FIELDS: &'static [&'static str] = &[
        "type_c",
        "description_c",
        "timestamp_c",
        "contact_id_c",
        "deal_id_c",
        "Name",
    ];

    const PICKERS: PickerSet = PickerSet::FollowUp;

    fn from_record(record: &Activity) -> Self {
        Self {
            name: record.name.clone().unwrap_or_default(),
            kind: record.kind.map(|k| k.as_str().to_string()).unwrap_or_default(),
            description: record.description.clone().unwrap_or_default(),
            timestamp: record.timestamp.map(codec::datetime_input).unwrap_or_default(),
            contact: record.contact.as_ref().map(|c| c.id.to_string()).unwrap_or_default(),
            deal: record.deal.as_ref().map(|d| d.id.to_string()).unwrap_or_default(),
        }
    }

    fn field_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "Name" => Some(&mut self.name),
            "type_c" => Some(&mut self.kind),
            "description_c" => Some(&mut self.description),
            "timestamp_c" => Some(&mut self.timestamp),
            "contact_id_c" => Some(&mut self.contact),
            "deal_id_c" => Some(&mut self.deal),
            _ => None,
        }
    }

    fn field(&self, field: &str) -> Option<&str> {
        match field {
            "Name" => Some(self.name.as_str()),
            "type_c" => Some(self.kind.as_str()),
            "description_c" => Some(self.description.as_str()),
            "timestamp_c" => Some(self.timestamp.as_str()),
            "contact_id_c" => Some(self.contact.as_str()),
            "deal_id_c" => Some(self.deal.as_str()),
            _ => None,
        }
    }

    fn validate(&self) -> Result<ActivityDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let kind = match optional(&self.kind) {
            None => {
                errors.insert("type_c", "Activity type is required");
                None
            }
            Some(text) => ActivityKind::parse(&text)
                .inspect_err(|e| errors.insert("type_c", e.to_string()))
                .ok(),
        };
        let description = required(&mut errors, "description_c", &self.description, "Description is required");
        let timestamp = match optional(&self.timestamp) {
            None => Some(Utc::now()),
            Some(text) => {
                let parsed = codec::parse_timestamp(&text);
                if parsed.is_none() {
                    errors.insert("timestamp_c", "Timestamp must be a valid date and time");
                }
                parsed
            }
        };

        match (kind, timestamp) {
            (Some(kind), Some(timestamp)) if errors.is_empty() => Ok(ActivityDraft {
                name: optional(&self.name),
                kind,
                description,
                timestamp,
                contact: optional_reference(&self.contact),
                deal: optional_reference(&self.deal),
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_requires_type_and_description() {
        let errors = ActivityForm::default().validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("type_c"), Some("Activity type is required"));
        assert_eq!(errors.get("description_c"), Some("Description is required"));
    }

    #[test]
    fn test_blank_timestamp_means_now() {
        let before = Utc::now();
        let form = ActivityForm {
            kind: "Call".into(),
            description: "Intro call".into(),
            ..Default::default()
        };
        let draft = form.validate().unwrap();
        assert_eq!(draft.kind, ActivityKind::Call);
        assert!(draft.timestamp >= before);
        assert_eq!(draft.name, None);
    }
}
