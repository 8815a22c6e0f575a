//! Company form.

use super::{FieldErrors, RecordForm, optional, required};
use crate::schema::{Choice, Company, CompanyDraft, CompanySize};

/// Company form state, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyForm {
    /// Company name
    pub name: String,
    /// Industry
    pub industry: String,
    /// One of the [`CompanySize`] values, or blank
    pub size: String,
    /// Website URL
    pub website: String,
    /// Main phone number
    pub phone: String,
    /// Street address
    pub address: String,
    /// Free-text notes
    pub notes: String,
}

impl RecordForm for CompanyForm {
    type Entity = Company;

    const FIELDS: &'static [&'static str] = &[
        "name_c",
        "industry_c",
        "size_c",
        "website_c",
        "phone_c",
        "address_c",
        "notes_c",
    ];

    fn from_record(record: &Company) -> Self {
        Self {
            name: record.company_name.clone().or_else(|| record.name.clone()).unwrap_or_default(),
            industry: record.industry.clone().unwrap_or_default(),
            size: record.size.map(|s| s.as_str().to_string()).unwrap_or_default(),
            website: record.website.clone().unwrap_or_default(),
            phone: record.phone.clone().unwrap_or_default(),
            address: record.address.clone().unwrap_or_default(),
            notes: record.notes.clone().unwrap_or_default(),
        }
    }

    fn field_mut(&mut self, field: &str) -> Option<&mut String> {
        match field {
            "name_c" => Some(&mut self.name),
            "industry_c" => Some(&mut self.industry),
            "size_c" => Some(&mut self.size),
            "website_c" => Some(&mut self.website),
            "phone_c" => Some(&mut self.phone),
            "address_c" => Some(&mut self.address),
            "notes_c" => Some(&mut self.notes),
            _ => None,
        }
    }

    fn field(&self, field: &str) -> Option<&str> {
        match field {
            "name_c" => Some(self.name.as_str()),
            "industry_c" => Some(self.industry.as_str()),
            "size_c" => Some(self.size.as_str()),
            "website_c" => Some(self.website.as_str()),
            "phone_c" => Some(self.phone.as_str()),
            "address_c" => Some(self.address.as_str()),
            "notes_c" => Some(self.notes.as_str()),
            _ => None,
        }
    }

    fn validate(&self) -> Result<CompanyDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = required(&mut errors, "name_c", &self.name, "Company name is required");
        let industry = required(&mut errors, "industry_c", &self.industry, "Industry is required");
        let size = match optional(&self.size).map(|s| CompanySize::parse(&s)) {
            None => None,
            Some(Ok(size)) => Some(size),
            Some(Err(e)) => {
                errors.insert("size_c", e.to_string());
                None
            }
        };
        errors.into_result(|| CompanyDraft {
            name,
            industry,
            size,
            website: optional(&self.website),
            phone: optional(&self.phone),
            address: optional(&self.address),
            notes: optional(&self.notes),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_requires_name_and_industry() {
        let errors = CompanyForm::default().validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("name_c"), Some("Company name is required"));
        assert_eq!(errors.get("industry_c"), Some("Industry is required"));
    }

    #[test]
    fn test_size_must_be_a_known_value() {
        let mut form = CompanyForm {
            name: "Acme".into(),
            industry: "Retail".into(),
            size: "Huge".into(),
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("size_c"), Some("'Huge' is not a valid company size"));

        form.size = "enterprise".into();
        assert_eq!(form.validate().unwrap().size, Some(CompanySize::Enterprise));
    }
}
