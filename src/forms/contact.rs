//! Contact form.

use super::{FieldErrors, RecordForm, optional, required};
use crate::schema::{Contact, ContactDraft};

/// Contact form state, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Email address
    pub email: String,
    /// Phone or mobile number
    pub phone: String,
    /// Company name as free text
    pub company: String,
    /// Job title
    pub position: String,
    /// Free-text notes
    pub notes: String,
}

impl RecordForm for ContactForm {
    type Entity = Contact;

    const FIELDS: &'static [&'static str] = &[
        "first_name_c",
        "last_name_c",
        "email_c",
        "phone_c",
        "company_c",
        "position_c",
        "notes_c",
    ];

    fn from_record(record: &Contact) -> Self {
        Self {
            first_name: record.first_name.clone().unwrap_or_default(),
            last_name: record.last_name.clone().unwrap_or_default(),
            email: record.email.clone().unwrap_or_default(),
            phone: record.phone.clone().unwrap_or_default(),
            company: record.company.clone().unwrap_or_default(),
            position: record.position.clone().unwrap_or_default(),
            notes: record.notes.clone().unwrap_or_default(),
        }
    }

    fn field_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "first_name_c" => Some(&mut self.first_name),
            "last_name_c" => Some(&mut self.last_name),
            "email_c" => Some(&mut self.email),
            "phone_c" => Some(&mut self.phone),
            "company_c" => Some(&mut self.company),
            "position_c" => Some(&mut self.position),
            "notes_c" => Some(&mut self.notes),
            _ => None,
        }
    }

    fn field(&self, field: &str) -> Option<&str> {
        match field {
            "first_name_c" => Some(self.first_name.as_str()),
            "last_name_c" => Some(self.last_name.as_str()),
            "email_c" => Some(self.email.as_str()),
            "phone_c" => Some(self.phone.as_str()),
            "company_c" => Some(self.company.as_str()),
            "position_c" => Some(self.position.as_str()),
            "notes_c" => Some(self.notes.as_str()),
            _ => None,
        }
    }

    fn validate(&self) -> Result<ContactDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let first_name = required(&mut errors, "first_name_c", &self.first_name, "First name is required");
        let last_name = required(&mut errors, "last_name_c", &self.last_name, "Last name is required");
        let email = required(&mut errors, "email_c", &self.email, "Email is required");
        let company = required(&mut errors, "company_c", &self.company, "Company is required");
        errors.into_result(|| ContactDraft {
            first_name,
            last_name,
            email,
            phone: optional(&self.phone),
            company,
            position: optional(&self.position),
            notes: optional(&self.notes),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_empty_form_reports_four_required_fields() {
        let errors = ContactForm::default().validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|(field, _)| field).collect();
        assert_eq!(fields, ["company_c", "email_c", "first_name_c", "last_name_c"]);
    }

    #[test]
    fn test_blank_optionals_become_none() {
        let form = ContactForm {
            first_name: "Ann".into(),
            last_name: " Lee ".into(),
            email: "ann@example.com".into(),
            company: "Acme".into(),
            phone: "  ".into(),
            ..Default::default()
        };
        let draft = form.validate().unwrap();
        assert_eq!(draft.last_name, "Lee");
        assert_eq!(draft.phone, None);
    }

    #[test]
    fn test_from_record_copies_fields() {
        let contact: Contact = serde_json::from_value(serde_json::json!({
            "Id": 2, "first_name_c": "Ann", "phone_c": 5550100
        }))
        .unwrap();
        let form = ContactForm::from_record(&contact);
        assert_eq!(form.first_name, "Ann");
        assert_eq!(form.phone, "5550100");
        assert_eq!(form.email, "");
    }
}
