//! Quote records (`quote_c`).

use super::{RecordId, RecordSchema, Reference, codec};
use crate::backend::SortType;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifecycle status of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteStatus {
    /// Not sent yet
    Draft,
    /// Sent to the customer
    Sent,
    /// Accepted by the customer
    Accepted,
    /// Turned down
    Rejected,
}

super::choice!(QuoteStatus, "quote status", {
    Draft => "Draft",
    Sent => "Sent",
    Accepted => "Accepted",
    Rejected => "Rejected",
});

/// One postal address block as edited in the quote form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    /// Addressee
    pub name: String,
    /// Street and number
    pub street: String,
    /// City
    pub city: String,
    /// State or region
    pub state: String,
    /// Country
    pub country: String,
    /// Postal code
    pub pincode: String,
}

/// Bill-to block as stored on the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillTo {
    /// Addressee
    #[serde(rename = "bill_to_name_c", default)]
    pub name: Option<String>,
    /// Street and number
    #[serde(rename = "bill_to_street_c", default)]
    pub street: Option<String>,
    /// City
    #[serde(rename = "bill_to_city_c", default)]
    pub city: Option<String>,
    /// State or region
    #[serde(rename = "bill_to_state_c", default)]
    pub state: Option<String>,
    /// Country
    #[serde(rename = "bill_to_country_c", default)]
    pub country: Option<String>,
    /// Postal code
    #[serde(rename = "bill_to_pincode_c", default, deserialize_with = "codec::text")]
    pub pincode: Option<String>,
}

/// Ship-to block as stored on the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipTo {
    /// Addressee
    #[serde(rename = "ship_to_name_c", default)]
    pub name: Option<String>,
    /// Street and number
    #[serde(rename = "ship_to_street_c", default)]
    pub street: Option<String>,
    /// City
    #[serde(rename = "ship_to_city_c", default)]
    pub city: Option<String>,
    /// State or region
    #[serde(rename = "ship_to_state_c", default)]
    pub state: Option<String>,
    /// Country
    #[serde(rename = "ship_to_country_c", default)]
    pub country: Option<String>,
    /// Postal code
    #[serde(rename = "ship_to_pincode_c", default, deserialize_with = "codec::text")]
    pub pincode: Option<String>,
}

fn address_from(parts: [&Option<String>; 6]) -> Address {
    let [name, street, city, state, country, pincode] = parts.map(|p| p.clone().unwrap_or_default());
    Address {
        name,
        street,
        city,
        state,
        country,
        pincode,
    }
}

impl BillTo {
    /// Editable copy of the block.
    #[must_use]
    pub fn to_address(&self) -> Address {
        address_from([&self.name, &self.street, &self.city, &self.state, &self.country, &self.pincode])
    }
}

impl ShipTo {
    /// Editable copy of the block.
    #[must_use]
    pub fn to_address(&self) -> Address {
        address_from([&self.name, &self.street, &self.city, &self.state, &self.country, &self.pincode])
    }
}

/// A priced offer sent to a company contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Backend identifier
    #[serde(rename = "Id")]
    pub id: RecordId,
    /// Quote name
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    /// Comma separated tags
    #[serde(rename = "Tags", default)]
    pub tags: Option<String>,
    /// Date the quote was issued
    #[serde(rename = "quote_date_c", default, deserialize_with = "codec::date")]
    pub quote_date: Option<NaiveDate>,
    /// Draft, sent, accepted or rejected
    #[serde(rename = "status_c", default, deserialize_with = "codec::choice")]
    pub status: Option<QuoteStatus>,
    /// How the quote is delivered
    #[serde(rename = "delivery_method_c", default)]
    pub delivery_method: Option<String>,
    /// Last valid day
    #[serde(rename = "expires_on_c", default, deserialize_with = "codec::date")]
    pub expires_on: Option<NaiveDate>,
    /// Billing address
    #[serde(flatten)]
    pub bill_to: BillTo,
    /// Shipping address
    #[serde(flatten)]
    pub ship_to: ShipTo,
    /// Company quoted
    #[serde(rename = "company_id_c", default, deserialize_with = "codec::reference")]
    pub company: Option<Reference>,
    /// Contact quoted
    #[serde(rename = "contact_id_c", default, deserialize_with = "codec::reference")]
    pub contact: Option<Reference>,
    /// Deal the quote belongs to
    #[serde(rename = "deal_id_c", default, deserialize_with = "codec::reference")]
    pub deal: Option<Reference>,
    /// Creation time
    #[serde(rename = "CreatedOn", default, deserialize_with = "codec::timestamp")]
    pub created_on: Option<DateTime<Utc>>,
    /// Last modification time
    #[serde(rename = "ModifiedOn", default, deserialize_with = "codec::timestamp")]
    pub modified_on: Option<DateTime<Utc>>,
}

/// Validated input for a new quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteDraft {
    /// Quote name
    pub name: String,
    /// Comma separated tags
    pub tags: Option<String>,
    /// Date the quote was issued
    pub quote_date: NaiveDate,
    /// Last valid day
    pub expires_on: Option<NaiveDate>,
    /// Quote status
    pub status: QuoteStatus,
    /// How the quote is delivered
    pub delivery_method: Option<String>,
    /// Billing address
    pub billing: Address,
    /// Shipping address
    pub shipping: Address,
    /// Company quoted
    pub company: RecordId,
    /// Contact quoted
    pub contact: RecordId,
    /// Deal the quote belongs to
    pub deal: Option<RecordId>,
}

/// Sparse quote update; address blocks are replaced as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotePatch {
    /// New name
    pub name: Option<String>,
    /// `Some(None)` clears the tags
    pub tags: Option<Option<String>>,
    /// New quote date
    pub quote_date: Option<NaiveDate>,
    /// `Some(None)` clears the expiry
    pub expires_on: Option<Option<NaiveDate>>,
    /// New status
    pub status: Option<QuoteStatus>,
    /// `Some(None)` clears the delivery method
    pub delivery_method: Option<Option<String>>,
    /// Replacement billing block
    pub billing: Option<Address>,
    /// Replacement shipping block
    pub shipping: Option<Address>,
    /// New company
    pub company: Option<RecordId>,
    /// New contact
    pub contact: Option<RecordId>,
    /// `Some(None)` unlinks the deal
    pub deal: Option<Option<RecordId>>,
}

impl From<QuoteDraft> for QuotePatch {
    fn from(draft: QuoteDraft) -> Self {
        Self {
            name: Some(draft.name),
            tags: Some(draft.tags),
            quote_date: Some(draft.quote_date),
            expires_on: Some(draft.expires_on),
            status: Some(draft.status),
            delivery_method: Some(draft.delivery_method),
            billing: Some(draft.billing),
            shipping: Some(draft.shipping),
            company: Some(draft.company),
            contact: Some(draft.contact),
            deal: Some(draft.deal),
        }
    }
}

fn insert_address(fields: &mut Map<String, Value>, prefix: &str, address: &Address) {
    let parts = [
        ("name", &address.name),
        ("street", &address.street),
        ("city", &address.city),
        ("state", &address.state),
        ("country", &address.country),
        ("pincode", &address.pincode),
    ];
    for (part, value) in parts {
        fields.insert(format!("{prefix}_{part}_c"), Value::from(value.as_str()));
    }
}

impl RecordSchema for Quote {
    const TABLE: &'static str = "quote_c";
    const LABEL: &'static str = "quote";
    const FIELDS: &'static [&'static str] = &[
        "Id",
        "Name",
        "Tags",
        "quote_date_c",
        "status_c",
        "delivery_method_c",
        "expires_on_c",
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
        "company_id_c",
        "contact_id_c",
        "deal_id_c",
        "CreatedOn",
        "ModifiedOn",
    ];
    const ORDER_FIELD: &'static str = "ModifiedOn";
    const ORDER: SortType = SortType::Desc;

    type Draft = QuoteDraft;
    type Patch = QuotePatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn display_name(&self) -> String {
        self.name.clone().unwrap_or_default()
    }

    fn create_fields(draft: &QuoteDraft) -> Map<String, Value> {
        let mut fields = Map::new();
        let display = if draft.name.trim().is_empty() { "New Quote" } else { draft.name.as_str() };
        fields.insert("Name".into(), Value::from(display));
        fields.insert("Tags".into(), codec::text_value(draft.tags.as_deref()));
        fields.insert("quote_date_c".into(), codec::date_value(Some(draft.quote_date)));
        fields.insert("status_c".into(), Value::from(super::Choice::as_str(draft.status)));
        fields.insert(
            "delivery_method_c".into(),
            codec::text_value(draft.delivery_method.as_deref()),
        );
        fields.insert("expires_on_c".into(), codec::date_value(draft.expires_on));
        insert_address(&mut fields, "bill_to", &draft.billing);
        insert_address(&mut fields, "ship_to", &draft.shipping);
        fields.insert("company_id_c".into(), codec::reference_value(Some(draft.company)));
        fields.insert("contact_id_c".into(), codec::reference_value(Some(draft.contact)));
        fields.insert("deal_id_c".into(), codec::reference_value(draft.deal));
        fields
    }

    fn patch_fields(patch: &QuotePatch) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(name) = &patch.name {
            fields.insert("Name".into(), Value::from(name.as_str()));
        }
        if let Some(tags) = &patch.tags {
            fields.insert("Tags".into(), codec::text_value(tags.as_deref()));
        }
        if let Some(quote_date) = patch.quote_date {
            fields.insert("quote_date_c".into(), codec::date_value(Some(quote_date)));
        }
        if let Some(status) = patch.status {
            fields.insert("status_c".into(), Value::from(super::Choice::as_str(status)));
        }
        if let Some(method) = &patch.delivery_method {
            fields.insert("delivery_method_c".into(), codec::text_value(method.as_deref()));
        }
        if let Some(expires_on) = patch.expires_on {
            fields.insert("expires_on_c".into(), codec::date_value(expires_on));
        }
        if let Some(billing) = &patch.billing {
            insert_address(&mut fields, "bill_to", billing);
        }
        if let Some(shipping) = &patch.shipping {
            insert_address(&mut fields, "ship_to", shipping);
        }
        if let Some(company) = patch.company {
            fields.insert("company_id_c".into(), codec::reference_value(Some(company)));
        }
        if let Some(contact) = patch.contact {
            fields.insert("contact_id_c".into(), codec::reference_value(Some(contact)));
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

    #[test]
    fn test_decodes_flat_address_blocks_and_lookups() {
        let quote: Quote = serde_json::from_value(serde_json::json!({
            "Id": 9,
            "Name": "Q-9",
            "status_c": "Sent",
            "bill_to_city_c": "Pune",
            "bill_to_pincode_c": 411001,
            "ship_to_city_c": "Delhi",
            "company_id_c": {"Id": 2, "Name": "Acme"},
            "contact_id_c": 5
        }))
        .unwrap();
        assert_eq!(quote.status, Some(QuoteStatus::Sent));
        assert_eq!(quote.bill_to.to_address().city, "Pune");
        assert_eq!(quote.bill_to.pincode.as_deref(), Some("411001"));
        assert_eq!(quote.ship_to.to_address().city, "Delhi");
        assert_eq!(quote.company.unwrap().name.as_deref(), Some("Acme"));
        assert_eq!(quote.contact.unwrap().id, RecordId(5));
    }

    #[test]
    fn test_patch_replaces_whole_shipping_block() {
        let patch = QuotePatch {
            shipping: Some(Address {
                city: "Oslo".into(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let fields = Quote::patch_fields(&patch);
        assert_eq!(fields.len(), 6);
        assert_eq!(fields["ship_to_city_c"], "Oslo");
        assert!(fields.keys().all(|k| k.starts_with("ship_to_")));
    }
}
