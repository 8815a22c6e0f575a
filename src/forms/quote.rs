//! Quote form, including the billing and shipping address blocks.

use super::{FieldErrors, PickerSet, RecordForm, optional, optional_reference, required, required_reference};
use crate::schema::{Address, Choice, Quote, QuoteDraft, QuoteStatus, codec};

/// Quote form state; starts as a draft quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteForm {
    /// Quote name
    pub name: String,
    /// Comma separated tags
    pub tags: String,
    /// `YYYY-MM-DD`
    pub quote_date: String,
    /// `YYYY-MM-DD` or blank
    pub expires_on: String,
    /// Status value, e.g. `Draft`
    pub status: String,
    /// How the quote is delivered
    pub delivery_method: String,
    /// Billing address block
    pub billing: Address,
    /// Shipping address block
    pub shipping: Address,
    /// Company id
    pub company: String,
    /// Contact id
    pub contact: String,
    /// Deal id, or blank
    pub deal: String,
}

impl Default for QuoteForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            tags: String::new(),
            quote_date: String::new(),
            expires_on: String::new(),
            status: QuoteStatus::Draft.as_str().to_string(),
            delivery_method: String::new(),
            billing: Address::default(),
            shipping: Address::default(),
            company: String::new(),
            contact: String::new(),
            deal: String::new(),
        }
    }
}

fn address_part<'a>(address: &'a mut Address, part: &str) -> Option<&'a mut String> {
    match part {
        "name" => Some(&mut address.name),
        "street" => Some(&mut address.street),
        "city" => Some(&mut address.city),
        "state" => Some(&mut address.state),
        "country" => Some(&mut address.country),
        "pincode" => Some(&mut address.pincode),
        _ => None,
    }
}

fn address_value<'a>(address: &'a Address, part: &str) -> Option<&'a str> {
    match part {
        "name" => Some(address.name.as_str()),
        "street" => Some(address.street.as_str()),
        "city" => Some(address.city.as_str()),
        "state" => Some(address.state.as_str()),
        "country" => Some(address.country.as_str()),
        "pincode" => Some(address.pincode.as_str()),
        _ => None,
    }
}

fn trimmed(address: &Address) -> Address {
    Address {
        name: address.name.trim().to_string(),
        street: address.street.trim().to_string(),
        city: address.city.trim().to_string(),
        state: address.state.trim().to_string(),
        country: address.country.trim().to_string(),
        pincode: address.pincode.trim().to_string(),
    }
}

impl QuoteForm {
    /// Overwrites the six shipping fields with the current billing fields.
    ///
    /// This is a snapshot: later billing edits do not reach the shipping block.
    pub fn copy_billing_to_shipping(&mut self) {
        self.shipping = self.billing.clone();
    }
}

impl RecordForm for QuoteForm {
    type Entity = Quote;

    const FIELDS: &'static [&'static str] = &[
        "Name",
        "quote_date_c",
        "status_c",
        "delivery_method_c",
        "expires_on_c",
        "Tags",
        "company_id_c",
        "contact_id_c",
        "deal_id_c",
        "bill_to_name_c",
        "bill_to_street_c",
        "bill_to_city_c",
        "bill_to_state_c",
        "bill_to_country_c",
        "bill_to_pincode_c",
        "ship_to_name_c",
        "ship_to_street_c",
        "ship_to_city_c",
        "ship_to_state_c",
        "ship_to_country_c",
        "ship_to_pincode_c",
    ];

    const PICKERS: PickerSet = PickerSet::Quote;

    fn from_record(record: &Quote) -> Self {
        Self {
            name: record.name.clone().unwrap_or_default(),
            tags: record.tags.clone().unwrap_or_default(),
            quote_date: record.quote_date.map(codec::date_input).unwrap_or_default(),
            expires_on: record.expires_on.map(codec::date_input).unwrap_or_default(),
            status: record.status.unwrap_or(QuoteStatus::Draft).as_str().to_string(),
            delivery_method: record.delivery_method.clone().unwrap_or_default(),
            billing: record.bill_to.to_address(),
            shipping: record.ship_to.to_address(),
            company: record.company.as_ref().map(|c| c.id.to_string()).unwrap_or_default(),
            contact: record.contact.as_ref().map(|c| c.id.to_string()).unwrap_or_default(),
            deal: record.deal.as_ref().map(|d| d.id.to_string()).unwrap_or_default(),
        }
    }

    fn field_mut(&mut self, field: &str) -> Option<&mut String> {
        if let Some(part) = field.strip_prefix("bill_to_").and_then(|f| f.strip_suffix("_c")) {
            return address_part(&mut self.billing, part);
        }
        if let Some(part) = field.strip_prefix("ship_to_").and_then(|f| f.strip_suffix("_c")) {
            return address_part(&mut self.shipping, part);
        }
        match field {
            "Name" => Some(&mut self.name),
            "Tags" => Some(&mut self.tags),
            "quote_date_c" => Some(&mut self.quote_date),
            "expires_on_c" => Some(&mut self.expires_on),
            "status_c" => Some(&mut self.status),
            "delivery_method_c" => Some(&mut self.delivery_method),
            "company_id_c" => Some(&mut self.company),
            "contact_id_c" => Some(&mut self.contact),
            "deal_id_c" => Some(&mut self.deal),
            _ => None,
        }
    }

    fn field(&self, field: &str) -> Option<&str> {
        if let Some(part) = field.strip_prefix("bill_to_").and_then(|f| f.strip_suffix("_c")) {
            return address_value(&self.billing, part);
        }
        if let Some(part) = field.strip_prefix("ship_to_").and_then(|f| f.strip_suffix("_c")) {
            return address_value(&self.shipping, part);
        }
        match field {
            "Name" => Some(self.name.as_str()),
            "Tags" => Some(self.tags.as_str()),
            "quote_date_c" => Some(self.quote_date.as_str()),
            "expires_on_c" => Some(self.expires_on.as_str()),
            "status_c" => Some(self.status.as_str()),
            "delivery_method_c" => Some(self.delivery_method.as_str()),
            "company_id_c" => Some(self.company.as_str()),
            "contact_id_c" => Some(self.contact.as_str()),
            "deal_id_c" => Some(self.deal.as_str()),
            _ => None,
        }
    }

    fn validate(&self) -> Result<QuoteDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = required(&mut errors, "Name", &self.name, "Quote name is required");

        let quote_date = match optional(&self.quote_date) {
            None => {
                errors.insert("quote_date_c", "Quote date is required");
                None
            }
            Some(text) => {
                let parsed = codec::parse_date(&text);
                if parsed.is_none() {
                    errors.insert("quote_date_c", "Quote date must be a valid date");
                }
                parsed
            }
        };

        let expires_on = optional(&self.expires_on).and_then(|text| {
            let parsed = codec::parse_date(&text);
            if parsed.is_none() {
                errors.insert("expires_on_c", "Expiry date must be a valid date");
            }
            parsed
        });

        let status = match optional(&self.status) {
            None => Some(QuoteStatus::Draft),
            Some(status) => QuoteStatus::parse(&status)
                .inspect_err(|e| errors.insert("status_c", e.to_string()))
                .ok(),
        };

        let contact = required_reference(&mut errors, "contact_id_c", &self.contact, "Contact is required");
        let company = required_reference(&mut errors, "company_id_c", &self.company, "Company is required");

        match (quote_date, status, company, contact) {
            (Some(quote_date), Some(status), Some(company), Some(contact)) if errors.is_empty() => Ok(QuoteDraft {
                name,
                tags: optional(&self.tags),
                quote_date,
                expires_on,
                status,
                delivery_method: optional(&self.delivery_method),
                billing: trimmed(&self.billing),
                shipping: trimmed(&self.shipping),
                company,
                contact,
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
    use crate::schema::RecordId;

    #[test]
    fn test_copy_billing_to_shipping_is_a_snapshot() {
        let mut form = QuoteForm::default();
        for (part, value) in [
            ("name", "Acme"),
            ("street", "1 Main St"),
            ("city", "Pune"),
            ("state", "MH"),
            ("country", "India"),
            ("pincode", "411001"),
        ] {
            form.set(&format!("bill_to_{part}_c"), value).unwrap();
        }
        form.set("ship_to_city_c", "Delhi").unwrap();

        form.copy_billing_to_shipping();
        for part in ["name", "street", "city", "state", "country", "pincode"] {
            assert_eq!(
                form.field(&format!("ship_to_{part}_c")),
                form.field(&format!("bill_to_{part}_c"))
            );
        }

        form.set("bill_to_city_c", "Mumbai").unwrap();
        assert_eq!(form.field("ship_to_city_c"), Some("Pune"));
    }

    #[test]
    fn test_required_fields() {
        let errors = QuoteForm::default().validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get("Name"), Some("Quote name is required"));
        assert_eq!(errors.get("quote_date_c"), Some("Quote date is required"));
        assert_eq!(errors.get("contact_id_c"), Some("Contact is required"));
        assert_eq!(errors.get("company_id_c"), Some("Company is required"));
    }

    #[test]
    fn test_valid_form_builds_draft() {
        let form = QuoteForm {
            name: "Q-1".into(),
            quote_date: "2024-06-01".into(),
            company: "2".into(),
            contact: "5".into(),
            deal: "x".into(),
            ..Default::default()
        };
        let draft = form.validate().unwrap();
        assert_eq!(draft.status, QuoteStatus::Draft);
        assert_eq!(draft.company, RecordId(2));
        assert_eq!(draft.deal, None);
        assert_eq!(draft.expires_on, None);
    }

    #[test]
    fn test_unknown_address_part_is_not_a_field() {
        let mut form = QuoteForm::default();
        assert!(form.set("bill_to_planet_c", "Mars").is_err());
        assert_eq!(form.field("ship_to_zip_c"), None);
    }
}
