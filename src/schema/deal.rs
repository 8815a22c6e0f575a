//! Deal records (`deal_c`) - the sales pipeline.

use super::{Backlink, RecordId, RecordSchema, Reference, codec};
use crate::backend::SortType;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Pipeline stage of a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DealStage {
    /// Lead qualified
    Qualified,
    /// Proposal sent
    Proposal,
    /// Terms under negotiation
    Negotiation,
    /// Closed, won
    Won,
    /// Closed, lost
    Lost,
}

super::choice!(DealStage, "deal stage", {
    Qualified => "qualified",
    Proposal => "proposal",
    Negotiation => "negotiation",
    Won => "won",
    Lost => "lost",
});

impl DealStage {
    /// Column heading on the pipeline board.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Qualified => "Qualified",
            Self::Proposal => "Proposal",
            Self::Negotiation => "Negotiation",
            Self::Won => "Won",
            Self::Lost => "Lost",
        }
    }

    /// Won and lost deals are closed; everything else is still in the pipeline.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// A sales opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    /// Backend identifier
    #[serde(rename = "Id")]
    pub id: RecordId,
    /// Display name
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    /// Deal title
    #[serde(rename = "title_c", default)]
    pub title: Option<String>,
    /// Expected value
    #[serde(rename = "value_c", default, deserialize_with = "codec::decimal")]
    pub value: Option<Decimal>,
    /// Pipeline stage
    #[serde(rename = "stage_c", default, deserialize_with = "codec::choice")]
    pub stage: Option<DealStage>,
    /// Win probability in percent
    #[serde(rename = "probability_c", default, deserialize_with = "codec::integer")]
    pub probability: Option<i64>,
    /// Expected close date
    #[serde(rename = "close_date_c", default, deserialize_with = "codec::date")]
    pub close_date: Option<NaiveDate>,
    /// Free-text notes
    #[serde(rename = "notes_c", default)]
    pub notes: Option<String>,
    /// Primary contact
    #[serde(rename = "contact_id_c", default, deserialize_with = "codec::reference")]
    pub contact: Option<Reference>,
    /// Company the deal is with
    #[serde(rename = "company_id_c", default, deserialize_with = "codec::reference")]
    pub company: Option<Reference>,
    /// Creation time
    #[serde(rename = "CreatedOn", default, deserialize_with = "codec::timestamp")]
    pub created_on: Option<DateTime<Utc>>,
    /// Last modification time
    #[serde(rename = "ModifiedOn", default, deserialize_with = "codec::timestamp")]
    pub modified_on: Option<DateTime<Utc>>,
}

impl Deal {
    /// Deal value, zero when unset.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.value.unwrap_or_default()
    }
}

/// Validated input for a new deal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealDraft {
    /// Deal title
    pub title: String,
    /// Expected value
    pub value: Decimal,
    /// Pipeline stage
    pub stage: DealStage,
    /// Win probability in percent
    pub probability: u8,
    /// Expected close date
    pub close_date: Option<NaiveDate>,
    /// Free-text notes
    pub notes: Option<String>,
    /// Primary contact
    pub contact: RecordId,
    /// Company the deal is with
    pub company: Option<RecordId>,
}

/// Sparse deal update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DealPatch {
    /// New title
    pub title: Option<String>,
    /// New value
    pub value: Option<Decimal>,
    /// New stage
    pub stage: Option<DealStage>,
    /// New probability
    pub probability: Option<u8>,
    /// `Some(None)` clears the close date
    pub close_date: Option<Option<NaiveDate>>,
    /// `Some(None)` clears the notes
    pub notes: Option<Option<String>>,
    /// `Some(None)` unlinks the contact
    pub contact: Option<Option<RecordId>>,
    /// `Some(None)` unlinks the company
    pub company: Option<Option<RecordId>>,
}

impl From<DealDraft> for DealPatch {
    fn from(draft: DealDraft) -> Self {
        Self {
            title: Some(draft.title),
            value: Some(draft.value),
            stage: Some(draft.stage),
            probability: Some(draft.probability),
            close_date: Some(draft.close_date),
            notes: Some(draft.notes),
            contact: Some(Some(draft.contact)),
            company: Some(draft.company),
        }
    }
}

impl RecordSchema for Deal {
    const TABLE: &'static str = "deal_c";
    const LABEL: &'static str = "deal";
    const FIELDS: &'static [&'static str] = &[
        "Id",
        "Name",
        "title_c",
        "value_c",
        "stage_c",
        "probability_c",
        "close_date_c",
        "notes_c",
        "contact_id_c",
        "company_id_c",
        "CreatedOn",
        "ModifiedOn",
    ];
    const ORDER_FIELD: &'static str = "ModifiedOn";
    const ORDER: SortType = SortType::Desc;
    const REFERENCED_BY: &'static [Backlink] = &[
        Backlink { table: "quote_c", field: "deal_id_c" },
        Backlink { table: "tasks_c", field: "deal_id_c" },
        Backlink { table: "activity_c", field: "deal_id_c" },
    ];

    type Draft = DealDraft;
    type Patch = DealPatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn display_name(&self) -> String {
        self.title.clone().or_else(|| self.name.clone()).unwrap_or_default()
    }

    fn create_fields(draft: &DealDraft) -> Map<String, Value> {
        let mut fields = Map::new();
        let display = if draft.title.trim().is_empty() { "New Deal" } else { draft.title.as_str() };
        fields.insert("Name".into(), Value::from(display));
        fields.insert("title_c".into(), Value::from(draft.title.as_str()));
        fields.insert("value_c".into(), codec::decimal_value(draft.value));
        fields.insert("stage_c".into(), Value::from(super::Choice::as_str(draft.stage)));
        fields.insert("probability_c".into(), Value::from(draft.probability));
        fields.insert("close_date_c".into(), codec::date_value(draft.close_date));
        fields.insert("notes_c".into(), codec::text_value(draft.notes.as_deref()));
        fields.insert("contact_id_c".into(), codec::reference_value(Some(draft.contact)));
        fields.insert("company_id_c".into(), codec::reference_value(draft.company));
        fields
    }

    fn patch_fields(patch: &DealPatch) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(title) = &patch.title {
            fields.insert("Name".into(), Value::from(title.as_str()));
            fields.insert("title_c".into(), Value::from(title.as_str()));
        }
        if let Some(value) = patch.value {
            fields.insert("value_c".into(), codec::decimal_value(value));
        }
        if let Some(stage) = patch.stage {
            fields.insert("stage_c".into(), Value::from(super::Choice::as_str(stage)));
        }
        if let Some(probability) = patch.probability {
            fields.insert("probability_c".into(), Value::from(probability));
        }
        if let Some(close_date) = patch.close_date {
            fields.insert("close_date_c".into(), codec::date_value(close_date));
        }
        if let Some(notes) = &patch.notes {
            fields.insert("notes_c".into(), codec::text_value(notes.as_deref()));
        }
        if let Some(contact) = patch.contact {
            fields.insert("contact_id_c".into(), codec::reference_value(contact));
        }
        if let Some(company) = patch.company {
            fields.insert("company_id_c".into(), codec::reference_value(company));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_stage_only_patch_touches_one_field() {
        let patch = DealPatch {
            stage: Some(DealStage::Won),
            ..Default::default()
        };
        let fields = Deal::patch_fields(&patch);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["stage_c"], "won");
    }

    #[test]
    fn test_create_fields_coerce_numbers_and_null_optional_company() {
        let draft = DealDraft {
            title: "Renewal".into(),
            value: Decimal::new(125_050, 2),
            stage: DealStage::Proposal,
            probability: 40,
            close_date: NaiveDate::from_ymd_opt(2024, 9, 30),
            notes: None,
            contact: RecordId(4),
            company: None,
        };
        let fields = Deal::create_fields(&draft);
        assert_eq!(fields["value_c"].as_f64(), Some(1250.5));
        assert_eq!(fields["probability_c"], 40);
        assert_eq!(fields["close_date_c"], "2024-09-30");
        assert_eq!(fields["contact_id_c"], 4);
        assert_eq!(fields["company_id_c"], Value::Null);
    }

    #[test]
    fn test_closed_stages() {
        assert!(DealStage::Won.is_closed());
        assert!(DealStage::Lost.is_closed());
        assert!(!DealStage::Negotiation.is_closed());
    }
}
