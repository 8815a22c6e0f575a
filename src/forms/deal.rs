//! Deal form.

use super::{FieldErrors, PickerSet, RecordForm, optional, optional_reference, required, required_reference};
use crate::schema::{Choice, Deal, DealDraft, DealStage, codec};
use rust_decimal::Decimal;

/// Deal form state; starts in the qualified stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealForm {
    /// Deal title
    pub title: String,
    /// Deal value as a decimal number
    pub value: String,
    /// Stage value, e.g. `qualified`
    pub stage: String,
    /// Percent, 0 to 100
    pub probability: String,
    /// `YYYY-MM-DD` or blank
    pub close_date: String,
    /// Free-text notes
    pub notes: String,
    /// Contact id
    pub contact: String,
    /// Company id, or blank
    pub company: String,
}

impl Default for DealForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            value: String::new(),
            stage: DealStage::Qualified.as_str().to_string(),
            probability: String::new(),
            close_date: String::new(),
            notes: String::new(),
            contact: String::new(),
            company: String::new(),
        }
    }
}

impl RecordForm for DealForm {
    type Entity = Deal;

    const FIELDS: &'static [&'static str] = &[
        "title_c",
        "value_c",
        "stage_c",
        "probability_c",
        "close_date_c",
        "contact_id_c",
        "company_id_c",
        "notes_c",
    ];

    const PICKERS: PickerSet = PickerSet::Deal;

    fn from_record(record: &Deal) -> Self {
        Self {
            title: record.title.clone().or_else(|| record.name.clone()).unwrap_or_default(),
            value: record.value.map(|v| v.normalize().to_string()).unwrap_or_default(),
            stage: record
                .stage
                .unwrap_or(DealStage::Qualified)
                .as_str()
                .to_string(),
            probability: record.probability.map(|p| p.to_string()).unwrap_or_default(),
            close_date: record.close_date.map(codec::date_input).unwrap_or_default(),
            notes: record.notes.clone().unwrap_or_default(),
            contact: record.contact.as_ref().map(|c| c.id.to_string()).unwrap_or_default(),
            company: record.company.as_ref().map(|c| c.id.to_string()).unwrap_or_default(),
        }
    }

    fn field_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "title_c" => Some(&mut self.title),
            "value_c" => Some(&mut self.value),
            "stage_c" => Some(&mut self.stage),
            "probability_c" => Some(&mut self.probability),
            "close_date_c" => Some(&mut self.close_date),
            "notes_c" => Some(&mut self.notes),
            "contact_id_c" => Some(&mut self.contact),
            "company_id_c" => Some(&mut self.company),
            _ => None,
        }
    }

    fn field(&self, field: &str) -> Option<&str> {
        match field {
            "title_c" => Some(self.title.as_str()),
            "value_c" => Some(self.value.as_str()),
            "stage_c" => Some(self.stage.as_str()),
            "probability_c" => Some(self.probability.as_str()),
            "close_date_c" => Some(self.close_date.as_str()),
            "notes_c" => Some(self.notes.as_str()),
            "contact_id_c" => Some(self.contact.as_str()),
            "company_id_c" => Some(self.company.as_str()),
            _ => None,
        }
    }

    fn validate(&self) -> Result<DealDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = required(&mut errors, "title_c", &self.title, "Title is required");

        let value = codec::parse_decimal(&self.value).filter(|v| *v > Decimal::ZERO);
        if value.is_none() {
            errors.insert("value_c", "Value must be greater than 0");
        }

        let stage = match optional(&self.stage) {
            None => Some(DealStage::Qualified),
            Some(stage) => DealStage::parse(&stage)
                .inspect_err(|e| errors.insert("stage_c", e.to_string()))
                .ok(),
        };

        let probability = codec::parse_integer(&self.probability)
            .filter(|p| (0..=100).contains(p))
            .and_then(|p| u8::try_from(p).ok());
        if probability.is_none() {
            errors.insert("probability_c", "Probability must be between 0 and 100");
        }

        let close_date = optional(&self.close_date).and_then(|text| {
            let parsed = codec::parse_date(&text);
            if parsed.is_none() {
                errors.insert("close_date_c", "Close date must be a valid date");
            }
            parsed
        });

        let contact = required_reference(&mut errors, "contact_id_c", &self.contact, "Contact is required");

        match (value, stage, probability, contact) {
            (Some(value), Some(stage), Some(probability), Some(contact)) if errors.is_empty() => Ok(DealDraft {
                title,
                value,
                stage,
                probability,
                close_date,
                notes: optional(&self.notes),
                contact,
                company: optional_reference(&self.company),
            }),
            _ => Err(errors),
        }
    }
}
