//! Company records (`company_c`).

use super::{Backlink, RecordId, RecordSchema, codec};
use crate::backend::SortType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Headcount bracket of a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompanySize {
    /// Small business
    Small,
    /// Mid-sized
    Medium,
    /// Large
    Large,
    /// Enterprise scale
    Enterprise,
}

super::choice!(CompanySize, "company size", {
    Small => "Small",
    Medium => "Medium",
    Large => "Large",
    Enterprise => "Enterprise",
});

/// An organisation contacts and deals belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    /// Backend identifier
    #[serde(rename = "Id")]
    pub id: RecordId,
    /// Display name
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    /// Company name as entered
    #[serde(rename = "name_c", default)]
    pub company_name: Option<String>,
    /// Industry
    #[serde(rename = "industry_c", default)]
    pub industry: Option<String>,
    /// Headcount band
    #[serde(rename = "size_c", default, deserialize_with = "codec::choice")]
    pub size: Option<CompanySize>,
    /// Website URL
    #[serde(rename = "website_c", default)]
    pub website: Option<String>,
    /// Main phone number
    #[serde(rename = "phone_c", default, deserialize_with = "codec::text")]
    pub phone: Option<String>,
    /// Street address
    #[serde(rename = "address_c", default)]
    pub address: Option<String>,
    /// Free-text notes
    #[serde(rename = "notes_c", default)]
    pub notes: Option<String>,
    /// Creation time
    #[serde(rename = "CreatedOn", default, deserialize_with = "codec::timestamp")]
    pub created_on: Option<DateTime<Utc>>,
    /// Last modification time
    #[serde(rename = "ModifiedOn", default, deserialize_with = "codec::timestamp")]
    pub modified_on: Option<DateTime<Utc>>,
}

/// Validated input for a new company.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyDraft {
    /// Company name
    pub name: String,
    /// Industry
    pub industry: String,
    /// Headcount band
    pub size: Option<CompanySize>,
    /// Website URL
    pub website: Option<String>,
    /// Main phone number
    pub phone: Option<String>,
    /// Street address
    pub address: Option<String>,
    /// Free-text notes
    pub notes: Option<String>,
}

/// Sparse company update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyPatch {
    /// New name
    pub name: Option<String>,
    /// New industry
    pub industry: Option<String>,
    /// `Some(None)` clears the size
    pub size: Option<Option<CompanySize>>,
    /// `Some(None)` clears the website
    pub website: Option<Option<String>>,
    /// `Some(None)` clears the phone
    pub phone: Option<Option<String>>,
    /// `Some(None)` clears the address
    pub address: Option<Option<String>>,
    /// `Some(None)` clears the notes
    pub notes: Option<Option<String>>,
}

impl From<CompanyDraft> for CompanyPatch {
    fn from(draft: CompanyDraft) -> Self {
        Self {
            name: Some(draft.name),
            industry: Some(draft.industry),
            size: Some(draft.size),
            website: Some(draft.website),
            phone: Some(draft.phone),
            address: Some(draft.address),
            notes: Some(draft.notes),
        }
    }
}

fn size_value(size: Option<CompanySize>) -> Value {
    codec::text_value(size.map(super::Choice::as_str))
}

impl RecordSchema for Company {
    const TABLE: &'static str = "company_c";
    const LABEL: &'static str = "company";
    const FIELDS: &'static [&'static str] = &[
        "Id",
        "Name",
        "name_c",
        "industry_c",
        "size_c",
        "website_c",
        "phone_c",
        "address_c",
        "notes_c",
        "CreatedOn",
        "ModifiedOn",
    ];
    const ORDER_FIELD: &'static str = "ModifiedOn";
    const ORDER: SortType = SortType::Desc;
    const REFERENCED_BY: &'static [Backlink] = &[
        Backlink { table: "deal_c", field: "company_id_c" },
        Backlink { table: "quote_c", field: "company_id_c" },
    ];

    type Draft = CompanyDraft;
    type Patch = CompanyPatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn display_name(&self) -> String {
        self.company_name
            .clone()
            .or_else(|| self.name.clone())
            .unwrap_or_default()
    }

    fn create_fields(draft: &CompanyDraft) -> Map<String, Value> {
        let mut fields = Map::new();
        let display = if draft.name.trim().is_empty() { "New Company" } else { draft.name.as_str() };
        fields.insert("Name".into(), Value::from(display));
        fields.insert("name_c".into(), Value::from(draft.name.as_str()));
        fields.insert("industry_c".into(), Value::from(draft.industry.as_str()));
        fields.insert("size_c".into(), size_value(draft.size));
        fields.insert("website_c".into(), codec::text_value(draft.website.as_deref()));
        fields.insert("phone_c".into(), codec::text_value(draft.phone.as_deref()));
        fields.insert("address_c".into(), codec::text_value(draft.address.as_deref()));
        fields.insert("notes_c".into(), codec::text_value(draft.notes.as_deref()));
        fields
    }

    fn patch_fields(patch: &CompanyPatch) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(name) = &patch.name {
            fields.insert("Name".into(), Value::from(name.as_str()));
            fields.insert("name_c".into(), Value::from(name.as_str()));
        }
        if let Some(industry) = &patch.industry {
            fields.insert("industry_c".into(), Value::from(industry.as_str()));
        }
        if let Some(size) = patch.size {
            fields.insert("size_c".into(), size_value(size));
        }
        if let Some(website) = &patch.website {
            fields.insert("website_c".into(), codec::text_value(website.as_deref()));
        }
        if let Some(phone) = &patch.phone {
            fields.insert("phone_c".into(), codec::text_value(phone.as_deref()));
        }
        if let Some(address) = &patch.address {
            fields.insert("address_c".into(), codec::text_value(address.as_deref()));
        }
        if let Some(notes) = &patch.notes {
            fields.insert("notes_c".into(), codec::text_value(notes.as_deref()));
        }
        fields
    }
}
