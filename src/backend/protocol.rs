//! Request shapes of the record backend protocol.
//!
//! These serialize to exactly the JSON the hosted backend expects, e.g.
//! `{"fields":[{"field":{"Name":"Id"}}],"orderBy":[{"fieldName":"ModifiedOn","sorttype":"DESC"}],
//! "pagingInfo":{"limit":100,"offset":0}}`.

use crate::schema::RecordId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Largest page the services ever request.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortType {
    /// Ascending
    #[serde(rename = "ASC")]
    Asc,
    /// Descending
    #[serde(rename = "DESC")]
    Desc,
}

/// Field name wrapper, `{"Name": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldName {
    /// Backend field name
    #[serde(rename = "Name")]
    pub name: String,
}

/// One projected field, `{"field": {"Name": "..."}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// The projected field
    pub field: FieldName,
}

impl FieldSpec {
    /// Projection of the field called `name`.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            field: FieldName { name: name.to_string() },
        }
    }
}

/// Sort order on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    /// Field to sort by
    #[serde(rename = "fieldName")]
    pub field_name: String,
    /// Ascending or descending
    #[serde(rename = "sorttype")]
    pub sort_type: SortType,
}

/// Page window of a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingInfo {
    /// Records per page
    pub limit: u32,
    /// Records to skip
    pub offset: u32,
}

impl Default for PagingInfo {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

/// Parameters of a `fetchRecords` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchParams {
    /// Fields to return
    pub fields: Vec<FieldSpec>,
    /// Sort keys, most significant first
    #[serde(rename = "orderBy", default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
    /// Page to return
    #[serde(rename = "pagingInfo", default)]
    pub paging: PagingInfo,
}

impl FetchParams {
    /// Projection of `fields`, ordered by one field, first page of `limit` records.
    #[must_use]
    pub fn new(fields: &[&str], order_field: &str, sort_type: SortType, limit: u32) -> Self {
        Self {
            fields: fields.iter().map(|f| FieldSpec::named(f)).collect(),
            order_by: vec![OrderBy {
                field_name: order_field.to_string(),
                sort_type,
            }],
            paging: PagingInfo { limit, offset: 0 },
        }
    }

    /// Names of the projected fields.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.field.name.as_str())
    }
}

/// Parameters of a `getRecordById` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordQuery {
    /// Fields to return
    pub fields: Vec<FieldSpec>,
}

impl RecordQuery {
    /// Projection of `fields`.
    #[must_use]
    pub fn new(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| FieldSpec::named(f)).collect(),
        }
    }
}

/// Body of a `createRecord` / `updateRecord` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordBatch {
    /// One field map per record; updates carry `Id`
    pub records: Vec<Map<String, Value>>,
}

impl RecordBatch {
    /// A batch holding exactly one record.
    #[must_use]
    pub fn single(record: Map<String, Value>) -> Self {
        Self { records: vec![record] }
    }
}

/// Body of a `deleteRecord` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteParams {
    /// Records to delete
    #[serde(rename = "RecordIds")]
    pub record_ids: Vec<RecordId>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fetch_params_wire_shape() {
        let params = FetchParams::new(&["Id", "Name"], "ModifiedOn", SortType::Desc, 100);
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({
                "fields": [{"field": {"Name": "Id"}}, {"field": {"Name": "Name"}}],
                "orderBy": [{"fieldName": "ModifiedOn", "sorttype": "DESC"}],
                "pagingInfo": {"limit": 100, "offset": 0}
            })
        );
    }

    #[test]
    fn test_delete_params_wire_shape() {
        let params = DeleteParams {
            record_ids: vec![RecordId(12)],
        };
        assert_eq!(serde_json::to_value(&params).unwrap(), json!({"RecordIds": [12]}));
    }
}
