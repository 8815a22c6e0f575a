//! Generic record service - CRUD for one entity over a [`RecordClient`].
//!
//! Every entity is served by the same code: [`RecordSchema`] supplies the table,
//! projection, ordering and field mapping; the service turns the backend
//! envelope into a plain value or an [`Error`].

use crate::backend::{DeleteParams, FetchParams, RecordBatch, RecordClient, RecordQuery};
use crate::errors::{Error, Result};
use crate::schema::{RecordId, RecordSchema};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

/// CRUD operations on the table of `E`.
pub struct RecordService<'a, E, C> {
    client: &'a C,
    page_size: u32,
    entity: PhantomData<fn() -> E>,
}

impl<E, C> Clone for RecordService<'_, E, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, C> Copy for RecordService<'_, E, C> {}

impl<'a, E: RecordSchema, C: RecordClient> RecordService<'a, E, C> {
    /// Service reading at most `page_size` records per list.
    #[must_use]
    pub const fn new(client: &'a C, page_size: u32) -> Self {
        Self {
            client,
            page_size,
            entity: PhantomData,
        }
    }

    /// Client the service talks through.
    #[must_use]
    pub const fn client(&self) -> &'a C {
        self.client
    }

    /// Records requested per list.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// First page of the table in the entity's fixed order.
    ///
    /// Rows that do not decode are skipped with a warning.
    #[instrument(skip(self), fields(table = E::TABLE))]
    pub async fn try_get_all(&self) -> Result<Vec<E>> {
        let params = FetchParams::new(E::FIELDS, E::ORDER_FIELD, E::ORDER, self.page_size);
        let settled = self.client.fetch_records(E::TABLE, &params).await?.into_outcome()?;

        let rows = match settled.data {
            Some(Value::Array(rows)) => rows,
            None | Some(Value::Null) => Vec::new(),
            Some(other) => {
                warn!("Expected a list of {} records, got {}", E::LABEL, other);
                Vec::new()
            }
        };

        let total = rows.len();
        let records: Vec<E> = rows
            .into_iter()
            .filter_map(|row| {
                serde_json::from_value(row)
                    .inspect_err(|e| warn!("Skipping undecodable {} record: {}", E::LABEL, e))
                    .ok()
            })
            .collect();
        debug!("Loaded {} of {} {} record(s)", records.len(), total, E::LABEL);
        Ok(records)
    }

    /// Like [`Self::try_get_all`], but any failure is logged and yields an empty list.
    pub async fn get_all(&self) -> Vec<E> {
        self.try_get_all()
            .await
            .inspect_err(|e| error!("Error fetching {} records: {}", E::LABEL, e))
            .unwrap_or_default()
    }

    /// One record, or `None` when it is missing or anything fails.
    #[instrument(skip(self), fields(table = E::TABLE))]
    pub async fn get_by_id(&self, id: RecordId) -> Option<E> {
        let query = RecordQuery::new(E::FIELDS);
        let outcome = match self.client.get_record_by_id(E::TABLE, id, &query).await {
            Ok(envelope) => envelope.into_outcome().map_err(Error::from),
            Err(e) => Err(e),
        };
        let data = outcome
            .inspect_err(|e| error!("Error fetching {} {}: {}", E::LABEL, id, e))
            .ok()?
            .data
            .filter(|data| !data.is_null())?;
        serde_json::from_value(data)
            .inspect_err(|e| error!("Error decoding {} {}: {}", E::LABEL, id, e))
            .ok()
    }

    /// Creates a record from a validated draft and returns it as stored.
    ///
    /// `None` means the backend accepted the write without echoing the record.
    #[instrument(skip(self, draft), fields(table = E::TABLE))]
    pub async fn create(&self, draft: &E::Draft) -> Result<Option<E>> {
        let batch = RecordBatch::single(E::create_fields(draft));
        self.write(self.client.create_record(E::TABLE, &batch).await)
            .inspect_err(|e| error!("Error creating {}: {}", E::LABEL, e))
    }

    /// Sends only the fields present in `patch`, plus `Id`, and returns the stored record.
    ///
    /// When the backend accepts the write without echoing the record, the
    /// record is read back; `None` means that read failed too.
    #[instrument(skip(self, patch), fields(table = E::TABLE))]
    pub async fn update(&self, id: RecordId, patch: &E::Patch) -> Result<Option<E>> {
        let mut fields = E::patch_fields(patch);
        fields.insert("Id".into(), Value::from(id.0));
        let batch = RecordBatch::single(fields);
        let written = self
            .write(self.client.update_record(E::TABLE, &batch).await)
            .inspect_err(|e| error!("Error updating {} {}: {}", E::LABEL, id, e))?;
        match written {
            Some(record) => Ok(Some(record)),
            None => {
                debug!("Update of {} {} returned no record, reading it back", E::LABEL, id);
                Ok(self.get_by_id(id).await)
            }
        }
    }

    /// Deletes one record.
    ///
    /// Returns `true` when the backend accepted it. A plain success without
    /// per-record results also counts as deleted.
    #[instrument(skip(self), fields(table = E::TABLE))]
    pub async fn delete(&self, id: RecordId) -> Result<bool> {
        let params = DeleteParams { record_ids: vec![id] };
        let settled = self
            .client
            .delete_record(E::TABLE, &params)
            .await
            .and_then(|envelope| envelope.into_outcome().map_err(Error::from))
            .inspect_err(|e| error!("Error deleting {} {}: {}", E::LABEL, id, e))?;
        Ok(!settled.has_results() || !settled.accepted.is_empty())
    }

    fn write(&self, response: Result<crate::backend::ResponseEnvelope>) -> Result<Option<E>> {
        let settled = response?.into_outcome()?;
        if !settled.has_results() {
            return Ok(None);
        }
        let record = settled
            .first_accepted()
            .ok_or(Error::MissingRecord { table: E::TABLE })?;
        Ok(Some(serde_json::from_value(record)?))
    }
}

/// Every entity service over one shared client.
#[derive(Debug)]
pub struct CrmServices<C> {
    client: Arc<C>,
    page_size: u32,
}

impl<C> Clone for CrmServices<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            page_size: self.page_size,
        }
    }
}

impl<C: RecordClient> CrmServices<C> {
    /// Bundles `client` for all six entities.
    #[must_use]
    pub const fn new(client: Arc<C>, page_size: u32) -> Self {
        Self { client, page_size }
    }

    /// Shared client.
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Service for any entity.
    #[must_use]
    pub fn records<E: RecordSchema>(&self) -> RecordService<'_, E, C> {
        RecordService::new(&self.client, self.page_size)
    }

    /// Contacts.
    #[must_use]
    pub fn contacts(&self) -> RecordService<'_, crate::schema::Contact, C> {
        self.records()
    }

    /// Companies.
    #[must_use]
    pub fn companies(&self) -> RecordService<'_, crate::schema::Company, C> {
        self.records()
    }

    /// Deals on the pipeline.
    #[must_use]
    pub fn deals(&self) -> RecordService<'_, crate::schema::Deal, C> {
        self.records()
    }

    /// Quotes.
    #[must_use]
    pub fn quotes(&self) -> RecordService<'_, crate::schema::Quote, C> {
        self.records()
    }

    /// Tasks.
    #[must_use]
    pub fn tasks(&self) -> RecordService<'_, crate::schema::Task, C> {
        self.records()
    }

    /// Activity log entries.
    #[must_use]
    pub fn activities(&self) -> RecordService<'_, crate::schema::Activity, C> {
        self.records()
    }
}
