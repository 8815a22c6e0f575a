//! Referential integrity on delete.
//!
//! The backend does not cascade and does not refuse deleting a record that
//! others point at. Contacts, companies and deals are therefore only deleted
//! once no record in a table listed by [`RecordSchema::REFERENCED_BY`] still
//! references them. The check covers the first page of each referencing table.

use super::service::RecordService;
use crate::backend::{FetchParams, RecordClient, SortType};
use crate::errors::{Error, Result};
use crate::schema::{RecordId, RecordSchema};
use serde_json::Value;
use tracing::{debug, instrument, warn};

/// Whether a stored reference value (bare id or `{Id, Name}` lookup) points at `id`.
fn points_at(value: Option<&Value>, id: RecordId) -> bool {
    match value {
        Some(Value::Object(lookup)) => lookup.get("Id").and_then(Value::as_i64) == Some(id.0),
        Some(other) => other.as_i64() == Some(id.0),
        None => false,
    }
}

impl<E: RecordSchema, C: RecordClient> RecordService<'_, E, C> {
    /// Number of records that still reference `id`.
    #[instrument(skip(self), fields(table = E::TABLE))]
    pub async fn referencing_count(&self, id: RecordId) -> Result<usize> {
        let mut count = 0;
        for backlink in E::REFERENCED_BY {
            let params = FetchParams::new(&["Id", backlink.field], "Id", SortType::Asc, self.page_size());
            let settled = self
                .client()
                .fetch_records(backlink.table, &params)
                .await?
                .into_outcome()?;
            let found = settled
                .data
                .as_ref()
                .and_then(Value::as_array)
                .map_or(0, |rows| rows.iter().filter(|row| points_at(row.get(backlink.field), id)).count());
            if found > 0 {
                debug!("{} record(s) in {}.{} reference {} {}", found, backlink.table, backlink.field, E::LABEL, id);
            }
            count += found;
        }
        Ok(count)
    }

    /// Deletes `id` unless other records still reference it.
    ///
    /// # Errors
    /// [`Error::StillReferenced`] when references remain; otherwise the errors of [`Self::delete`].
    pub async fn delete_unreferenced(&self, id: RecordId) -> Result<bool> {
        let count = self.referencing_count(id).await?;
        if count > 0 {
            warn!("Refusing to delete {} {}: {} reference(s) remain", E::LABEL, id, count);
            return Err(Error::StillReferenced {
                table: E::TABLE,
                id,
                count,
            });
        }
        self.delete(id).await
    }
}
