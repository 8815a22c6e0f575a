//! Record backend boundary.
//!
//! The CRM never talks to storage directly: every entity service goes through
//! a [`RecordClient`], which speaks the generic record protocol (fetch, get by
//! id, create, update, delete) against a table name. Two clients exist: the
//! hosted backend over HTTP ([`HttpRecordClient`]) and a local `SQLite` store
//! implementing the same protocol ([`StoreRecordClient`]).

pub mod envelope;
pub mod http;
pub mod protocol;
pub mod store;

pub use envelope::{BackendFailure, FailureKind, FieldIssue, RecordResult, ResponseEnvelope, Settled};
pub use http::HttpRecordClient;
pub use protocol::{
    DEFAULT_PAGE_SIZE, DeleteParams, FetchParams, FieldSpec, OrderBy, PagingInfo, RecordBatch,
    RecordQuery, SortType,
};
pub use store::StoreRecordClient;

use crate::errors::Result;
use crate::schema::RecordId;
use std::future::Future;

/// A connection to a record backend.
///
/// Transport problems are returned as `Err`; anything the backend itself
/// decides (including refusals) comes back inside the [`ResponseEnvelope`].
pub trait RecordClient: Send + Sync {
    /// `fetchRecords`: a projected, ordered page of a table.
    fn fetch_records(
        &self,
        table: &str,
        params: &FetchParams,
    ) -> impl Future<Output = Result<ResponseEnvelope>> + Send;

    /// `getRecordById`: one projected record.
    fn get_record_by_id(
        &self,
        table: &str,
        id: RecordId,
        query: &RecordQuery,
    ) -> impl Future<Output = Result<ResponseEnvelope>> + Send;

    /// `createRecord`: insert every record of the batch.
    fn create_record(
        &self,
        table: &str,
        batch: &RecordBatch,
    ) -> impl Future<Output = Result<ResponseEnvelope>> + Send;

    /// `updateRecord`: apply every sparse record of the batch; each carries its `Id`.
    fn update_record(
        &self,
        table: &str,
        batch: &RecordBatch,
    ) -> impl Future<Output = Result<ResponseEnvelope>> + Send;

    /// `deleteRecord`: remove the listed records.
    fn delete_record(
        &self,
        table: &str,
        params: &DeleteParams,
    ) -> impl Future<Output = Result<ResponseEnvelope>> + Send;
}
