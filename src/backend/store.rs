//! Local record store speaking the backend protocol over `SQLite`.
//!
//! All six tables share the `records` table; each row keeps its entity fields
//! as a JSON object. Reads honour projection, ordering and paging and expand
//! `*_id_c` reference fields into `{Id, Name}` lookups, the way the hosted
//! backend does. Writes check that every reference points at an existing
//! record of the right table and reject the individual record otherwise.

use super::{
    DeleteParams, FetchParams, FieldIssue, OrderBy, RecordBatch, RecordClient, RecordQuery, RecordResult,
    ResponseEnvelope, SortType,
};
use crate::entities::{Record, record};
use crate::errors::Result;
use crate::schema::{Activity, Company, Contact, Deal, Quote, RecordId, RecordSchema, Task};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

/// Tables the store accepts.
pub const TABLES: [&str; 6] = [
    Contact::TABLE,
    Company::TABLE,
    Deal::TABLE,
    Quote::TABLE,
    Task::TABLE,
    Activity::TABLE,
];

/// Fields owned by the store rather than by the record.
const SYSTEM_FIELDS: [&str; 3] = ["Id", "CreatedOn", "ModifiedOn"];

/// Suffix marking a reference field.
const REFERENCE_SUFFIX: &str = "_id_c";

/// Table a reference field points at: `contact_id_c` → `contact_c`.
fn referenced_table(field: &str) -> Option<String> {
    field
        .strip_suffix(REFERENCE_SUFFIX)
        .filter(|prefix| !prefix.is_empty())
        .map(|prefix| format!("{prefix}_c"))
}

/// Record store backed by a `SeaORM` connection.
#[derive(Debug, Clone)]
pub struct StoreRecordClient {
    db: DatabaseConnection,
}

impl StoreRecordClient {
    /// Wraps a connection whose tables already exist
    /// (see [`crate::config::database::create_tables`]).
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    fn unknown_table(table: &str) -> Option<ResponseEnvelope> {
        if TABLES.contains(&table) {
            None
        } else {
            warn!("Request for unknown table '{}'", table);
            Some(ResponseEnvelope::failure(format!("Table '{table}' does not exist")))
        }
    }

    async fn find(&self, table: &str, id: i64) -> Result<Option<record::Model>> {
        Ok(Record::find_by_id(id)
            .one(&self.db)
            .await?
            .filter(|row| row.table_name == table))
    }

    /// Display names of the records with the given ids, keyed by id.
    async fn names(&self, ids: HashSet<i64>) -> Result<HashMap<i64, (String, Option<String>)>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = Record::find()
            .filter(record::Column::Id.is_in(ids))
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let name = row.fields.get("Name").and_then(Value::as_str).map(str::to_string);
                (row.id, (row.table_name, name))
            })
            .collect())
    }

    /// Replaces bare reference ids by `{Id, Name}` lookups.
    async fn expand(&self, records: &mut [Map<String, Value>]) -> Result<()> {
        let ids: HashSet<i64> = records
            .iter()
            .flat_map(|r| r.iter())
            .filter(|(key, _)| key.ends_with(REFERENCE_SUFFIX))
            .filter_map(|(_, value)| value.as_i64())
            .collect();
        let names = self.names(ids).await?;

        for record in records.iter_mut() {
            for (key, value) in record.iter_mut() {
                let (Some(target), Some(id)) = (referenced_table(key), value.as_i64()) else {
                    continue;
                };
                if let Some((table, name)) = names.get(&id).filter(|(table, _)| *table == target) {
                    debug!("Expanding {} -> {} {}", key, table, id);
                    let mut lookup = Map::new();
                    lookup.insert("Id".into(), Value::from(id));
                    lookup.insert("Name".into(), name.clone().map_or(Value::Null, Value::from));
                    *value = Value::Object(lookup);
                }
            }
        }
        Ok(())
    }

    /// Field-level problems with the reference fields of `fields`.
    async fn reference_issues(&self, fields: &Map<String, Value>) -> Result<Vec<FieldIssue>> {
        let mut issues = Vec::new();
        for (key, value) in fields {
            let Some(target) = referenced_table(key) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let Some(id) = value.as_i64() else {
                issues.push(FieldIssue {
                    field_label: key.clone(),
                    message: format!("{value} is not a record id"),
                });
                continue;
            };
            if self.find(&target, id).await?.is_none() {
                issues.push(FieldIssue {
                    field_label: key.clone(),
                    message: format!("Record {id} does not exist in {target}"),
                });
            }
        }
        Ok(issues)
    }

    fn rejection(issues: Vec<FieldIssue>) -> RecordResult {
        let message = issues
            .first()
            .map_or_else(|| "Record failed validation".to_string(), ToString::to_string);
        RecordResult::rejected(message, issues)
    }

    async fn insert_one(&self, table: &str, record: &Value) -> Result<RecordResult> {
        let Some(fields) = record.as_object() else {
            return Ok(RecordResult::rejected("Record must be a JSON object", Vec::new()));
        };
        let issues = self.reference_issues(fields).await?;
        if !issues.is_empty() {
            return Ok(Self::rejection(issues));
        }

        let mut stored = fields.clone();
        for key in SYSTEM_FIELDS {
            stored.remove(key);
        }
        let now = Utc::now();
        let row = record::ActiveModel {
            table_name: Set(table.to_string()),
            fields: Set(Value::Object(stored)),
            created_on: Set(now),
            modified_on: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        info!("Created record {} in {}", row.id, table);

        let mut rendered = [render(&row)];
        self.expand(&mut rendered).await?;
        let [created] = rendered;
        Ok(RecordResult::accepted(Value::Object(created)))
    }

    async fn update_one(&self, table: &str, record: &Value) -> Result<RecordResult> {
        let Some(fields) = record.as_object() else {
            return Ok(RecordResult::rejected("Record must be a JSON object", Vec::new()));
        };
        let Some(id) = fields.get("Id").and_then(Value::as_i64) else {
            return Ok(RecordResult::rejected("Record is missing its Id", Vec::new()));
        };
        let Some(row) = self.find(table, id).await? else {
            return Ok(RecordResult::rejected(
                format!("Record {id} does not exist in {table}"),
                Vec::new(),
            ));
        };
        let issues = self.reference_issues(fields).await?;
        if !issues.is_empty() {
            return Ok(Self::rejection(issues));
        }

        let mut merged = row.fields.as_object().cloned().unwrap_or_default();
        for (key, value) in fields {
            if !SYSTEM_FIELDS.contains(&key.as_str()) {
                merged.insert(key.clone(), value.clone());
            }
        }
        let mut active: record::ActiveModel = row.into();
        active.fields = Set(Value::Object(merged));
        active.modified_on = Set(Utc::now());
        let row = active.update(&self.db).await?;
        info!("Updated record {} in {}", row.id, table);

        let mut rendered = [render(&row)];
        self.expand(&mut rendered).await?;
        let [updated] = rendered;
        Ok(RecordResult::accepted(Value::Object(updated)))
    }

    async fn delete_one(&self, table: &str, id: RecordId) -> Result<RecordResult> {
        if self.find(table, id.0).await?.is_none() {
            return Ok(RecordResult::rejected(
                format!("Record {id} does not exist in {table}"),
                Vec::new(),
            ));
        }
        Record::delete_by_id(id.0).exec(&self.db).await?;
        info!("Deleted record {} from {}", id, table);

        let mut data = Map::new();
        data.insert("Id".into(), Value::from(id.0));
        Ok(RecordResult::accepted(Value::Object(data)))
    }
}

/// Full field map of a stored row, system fields included.
fn render(row: &record::Model) -> Map<String, Value> {
    let mut fields = row.fields.as_object().cloned().unwrap_or_default();
    fields.insert("Id".into(), Value::from(row.id));
    fields.insert("CreatedOn".into(), Value::from(row.created_on.to_rfc3339()));
    fields.insert("ModifiedOn".into(), Value::from(row.modified_on.to_rfc3339()));
    fields
}

/// Keeps only the requested fields; an empty projection keeps everything. `Id` always survives.
fn project<'a>(fields: &mut Map<String, Value>, wanted: impl Iterator<Item = &'a str>) {
    let wanted: HashSet<&str> = wanted.collect();
    if wanted.is_empty() {
        return;
    }
    fields.retain(|key, _| key == "Id" || wanted.contains(key.as_str()));
}

#[derive(Debug, PartialEq, PartialOrd)]
enum SortKey {
    Number(f64),
    Text(String),
}

fn sort_key(value: Option<&Value>) -> Option<SortKey> {
    match value? {
        Value::Number(n) => n.as_f64().map(SortKey::Number),
        Value::Bool(b) => Some(SortKey::Number(if *b { 1.0 } else { 0.0 })),
        Value::String(s) if !s.is_empty() => Some(SortKey::Text(s.clone())),
        Value::Object(lookup) => lookup.get("Id").and_then(Value::as_f64).map(SortKey::Number),
        _ => None,
    }
}

fn directed(ordering: Ordering, sort_type: SortType) -> Ordering {
    match sort_type {
        SortType::Asc => ordering,
        SortType::Desc => ordering.reverse(),
    }
}

/// Orders by each key in turn; blank values sort last in either direction; ties fall back to `Id`.
fn compare(a: &Map<String, Value>, b: &Map<String, Value>, order_by: &[OrderBy]) -> Ordering {
    let by_fields = order_by.iter().fold(Ordering::Equal, |acc, order| {
        acc.then_with(|| {
            match (sort_key(a.get(&order.field_name)), sort_key(b.get(&order.field_name))) {
                (Some(x), Some(y)) => directed(x.partial_cmp(&y).unwrap_or(Ordering::Equal), order.sort_type),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        })
    });
    let tie_direction = order_by.first().map_or(SortType::Asc, |o| o.sort_type);
    by_fields.then_with(|| {
        let id = |m: &Map<String, Value>| m.get("Id").and_then(Value::as_i64).unwrap_or_default();
        directed(id(a).cmp(&id(b)), tie_direction)
    })
}

impl RecordClient for StoreRecordClient {
    #[instrument(skip(self, params))]
    async fn fetch_records(&self, table: &str, params: &FetchParams) -> Result<ResponseEnvelope> {
        if let Some(refusal) = Self::unknown_table(table) {
            return Ok(refusal);
        }
        let rows = Record::find()
            .filter(record::Column::TableName.eq(table))
            .order_by_asc(record::Column::Id)
            .all(&self.db)
            .await?;

        let mut records: Vec<Map<String, Value>> = rows.iter().map(render).collect();
        records.sort_by(|a, b| compare(a, b, &params.order_by));
        let offset = usize::try_from(params.paging.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(params.paging.limit).unwrap_or(usize::MAX);
        let mut page: Vec<Map<String, Value>> = records.into_iter().skip(offset).take(limit).collect();
        for record in &mut page {
            project(record, params.field_names());
        }
        self.expand(&mut page).await?;
        debug!("Fetched {} record(s) from {}", page.len(), table);

        Ok(ResponseEnvelope::with_data(Value::Array(
            page.into_iter().map(Value::Object).collect(),
        )))
    }

    #[instrument(skip(self, query))]
    async fn get_record_by_id(&self, table: &str, id: RecordId, query: &RecordQuery) -> Result<ResponseEnvelope> {
        if let Some(refusal) = Self::unknown_table(table) {
            return Ok(refusal);
        }
        let Some(row) = self.find(table, id.0).await? else {
            return Ok(ResponseEnvelope::failure(format!("Record {id} does not exist in {table}")));
        };
        let mut fields = render(&row);
        project(&mut fields, query.fields.iter().map(|f| f.field.name.as_str()));
        let mut found = [fields];
        self.expand(&mut found).await?;
        let [record] = found;
        Ok(ResponseEnvelope::with_data(Value::Object(record)))
    }

    #[instrument(skip(self, batch), fields(records = batch.records.len()))]
    async fn create_record(&self, table: &str, batch: &RecordBatch) -> Result<ResponseEnvelope> {
        if let Some(refusal) = Self::unknown_table(table) {
            return Ok(refusal);
        }
        let mut results = Vec::with_capacity(batch.records.len());
        for record in &batch.records {
            results.push(self.insert_one(table, &Value::Object(record.clone())).await?);
        }
        Ok(ResponseEnvelope::with_results(results))
    }

    #[instrument(skip(self, batch), fields(records = batch.records.len()))]
    async fn update_record(&self, table: &str, batch: &RecordBatch) -> Result<ResponseEnvelope> {
        if let Some(refusal) = Self::unknown_table(table) {
            return Ok(refusal);
        }
        let mut results = Vec::with_capacity(batch.records.len());
        for record in &batch.records {
            results.push(self.update_one(table, &Value::Object(record.clone())).await?);
        }
        Ok(ResponseEnvelope::with_results(results))
    }

    #[instrument(skip(self, params))]
    async fn delete_record(&self, table: &str, params: &DeleteParams) -> Result<ResponseEnvelope> {
        if let Some(refusal) = Self::unknown_table(table) {
            return Ok(refusal);
        }
        let mut results = Vec::with_capacity(params.record_ids.len());
        for id in &params.record_ids {
            results.push(self.delete_one(table, *id).await?);
        }
        Ok(ResponseEnvelope::with_results(results))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::backend::FailureKind;
    use crate::test_utils::setup_test_store;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    async fn create(store: &StoreRecordClient, table: &str, fields: Value) -> i64 {
        let settled = store
            .create_record(table, &RecordBatch::single(object(fields)))
            .await
            .unwrap()
            .into_outcome()
            .unwrap();
        settled.first_accepted().unwrap()["Id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_fetch_orders_pages_and_projects() -> Result<()> {
        let store = setup_test_store().await?;
        for (name, due) in [("b", "2024-03-02T00:00:00Z"), ("a", "2024-03-01T00:00:00Z"), ("c", "")] {
            create(&store, "tasks_c", json!({"Name": name, "due_date_c": due, "status_c": "Completed"})).await;
        }

        let params = FetchParams::new(&["Id", "Name", "due_date_c"], "due_date_c", SortType::Asc, 2);
        let data = store.fetch_records("tasks_c", &params).await?.into_outcome()?.data.unwrap();
        let names: Vec<&str> = data
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["Name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["a", "b"]);
        assert!(data[0].get("status_c").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_references_expand_to_lookups() -> Result<()> {
        let store = setup_test_store().await?;
        let contact = create(&store, "contact_c", json!({"Name": "Ann Lee"})).await;
        create(&store, "deal_c", json!({"Name": "Renewal", "contact_id_c": contact, "company_id_c": null})).await;

        let params = FetchParams::new(&["Id", "contact_id_c", "company_id_c"], "ModifiedOn", SortType::Desc, 100);
        let data = store.fetch_records("deal_c", &params).await?.into_outcome()?.data.unwrap();
        assert_eq!(data[0]["contact_id_c"], json!({"Id": contact, "Name": "Ann Lee"}));
        assert_eq!(data[0]["company_id_c"], Value::Null);
        Ok(())
    }

    #[tokio::test]
    async fn test_dangling_reference_is_rejected_per_record() -> Result<()> {
        let store = setup_test_store().await?;
        let envelope = store
            .create_record("deal_c", &RecordBatch::single(object(json!({"Name": "Orphan", "contact_id_c": 999}))))
            .await?;
        let failure = envelope.into_outcome().unwrap_err();
        assert_eq!(failure.kind, FailureKind::RecordRejected);
        assert_eq!(failure.details[0].field_label, "contact_id_c");
        assert!(failure.message.contains("999"));
        Ok(())
    }

    #[tokio::test]
    async fn test_reference_to_wrong_table_is_rejected() -> Result<()> {
        let store = setup_test_store().await?;
        let company = create(&store, "company_c", json!({"Name": "Acme"})).await;
        let envelope = store
            .create_record("deal_c", &RecordBatch::single(object(json!({"contact_id_c": company}))))
            .await?;
        assert!(envelope.into_outcome().is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_merges_and_keeps_other_fields() -> Result<()> {
        let store = setup_test_store().await?;
        let id = create(&store, "deal_c", json!({"Name": "Renewal", "stage_c": "qualified", "value_c": 10})).await;
        store
            .update_record("deal_c", &RecordBatch::single(object(json!({"Id": id, "stage_c": "won"}))))
            .await?
            .into_outcome()?;

        let data = store
            .get_record_by_id("deal_c", RecordId(id), &RecordQuery::new(&[]))
            .await?
            .into_outcome()?
            .data
            .unwrap();
        assert_eq!(data["stage_c"], "won");
        assert_eq!(data["value_c"], 10);
        assert_eq!(data["Name"], "Renewal");
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_ids_and_unknown_tables() -> Result<()> {
        let store = setup_test_store().await?;
        let delete = store
            .delete_record("deal_c", &DeleteParams { record_ids: vec![RecordId(41)] })
            .await?;
        assert_eq!(delete.into_outcome().unwrap_err().kind, FailureKind::RecordRejected);

        let unknown = store
            .fetch_records("invoices_c", &FetchParams::new(&["Id"], "Id", SortType::Asc, 10))
            .await?;
        assert_eq!(unknown.into_outcome().unwrap_err().kind, FailureKind::Rejected);

        let id = create(&store, "contact_c", json!({"Name": "Ann Lee"})).await;
        let wrong_table = store
            .get_record_by_id("deal_c", RecordId(id), &RecordQuery::new(&["Id"]))
            .await?;
        assert!(wrong_table.into_outcome().is_err());
        Ok(())
    }

    #[test]
    fn test_referenced_table_naming() {
        assert_eq!(referenced_table("contact_id_c").as_deref(), Some("contact_c"));
        assert_eq!(referenced_table("deal_id_c").as_deref(), Some("deal_c"));
        assert_eq!(referenced_table("_id_c"), None);
        assert_eq!(referenced_table("phone_c"), None);
    }
}
