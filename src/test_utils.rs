//! Shared test utilities for `pipeline-desk`.
//!
//! Provides an in-memory record store, a scripted client that records every
//! outgoing payload, and drafts with sensible defaults.
#![allow(clippy::unwrap_used)]

use crate::{
    app::notify::{Notice, Notifier},
    backend::{DeleteParams, FetchParams, RecordBatch, RecordClient, RecordQuery, ResponseEnvelope, StoreRecordClient},
    core::CrmServices,
    errors::{Error, Result},
    schema::{Address, CompanyDraft, CompanySize, ContactDraft, DealDraft, DealStage, QuoteDraft, QuoteStatus, RecordId},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Routes `tracing` output through the test harness; safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` store with its table initialized.
pub async fn setup_test_store() -> Result<StoreRecordClient> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(StoreRecordClient::new(db))
}

/// Service bundle over a fresh in-memory store, default page size.
pub async fn setup_test_services() -> Result<CrmServices<StoreRecordClient>> {
    let store = setup_test_store().await?;
    Ok(CrmServices::new(Arc::new(store), crate::backend::DEFAULT_PAGE_SIZE))
}

/// One request seen by a [`ScriptedClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Trait method name, e.g. `"update_record"`
    pub operation: &'static str,
    pub table: String,
    /// Request body as JSON; `get_record_by_id` adds the id under `"id"`
    pub body: Value,
}

enum Scripted {
    Respond(ResponseEnvelope),
    Fail(String),
}

/// Client answering from a queue of canned responses.
///
/// An exhausted queue answers every call with an empty successful read.
#[derive(Default)]
pub struct ScriptedClient {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an envelope.
    pub fn respond(&self, envelope: ResponseEnvelope) {
        self.script.lock().unwrap().push_back(Scripted::Respond(envelope));
    }

    /// Queues a transport failure.
    pub fn fail_next(&self, message: &str) {
        self.script.lock().unwrap().push_back(Scripted::Fail(message.to_string()));
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn answer<B: Serialize>(&self, operation: &'static str, table: &str, body: &B) -> Result<ResponseEnvelope> {
        self.calls.lock().unwrap().push(RecordedCall {
            operation,
            table: table.to_string(),
            body: serde_json::to_value(body).unwrap(),
        });
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Respond(envelope)) => Ok(envelope),
            Some(Scripted::Fail(message)) => Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                message,
            ))),
            None => Ok(ResponseEnvelope::with_data(Value::Array(Vec::new()))),
        }
    }
}

impl RecordClient for ScriptedClient {
    async fn fetch_records(&self, table: &str, params: &FetchParams) -> Result<ResponseEnvelope> {
        self.answer("fetch_records", table, params)
    }

    async fn get_record_by_id(&self, table: &str, id: RecordId, query: &RecordQuery) -> Result<ResponseEnvelope> {
        let mut body = serde_json::to_value(query).unwrap();
        body["id"] = Value::from(id.0);
        self.answer("get_record_by_id", table, &body)
    }

    async fn create_record(&self, table: &str, batch: &RecordBatch) -> Result<ResponseEnvelope> {
        self.answer("create_record", table, batch)
    }

    async fn update_record(&self, table: &str, batch: &RecordBatch) -> Result<ResponseEnvelope> {
        self.answer("update_record", table, batch)
    }

    async fn delete_record(&self, table: &str, params: &DeleteParams) -> Result<ResponseEnvelope> {
        self.answer("delete_record", table, params)
    }
}

/// Notifier keeping every notice for inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    /// Notices shown so far, oldest first.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// Company draft with sensible defaults.
///
/// # Defaults
/// * `industry`: `"Manufacturing"`
/// * `size`: Medium
pub fn sample_company_draft(name: &str) -> CompanyDraft {
    CompanyDraft {
        name: name.to_string(),
        industry: "Manufacturing".to_string(),
        size: Some(CompanySize::Medium),
        website: Some("https://example.com".to_string()),
        phone: None,
        address: None,
        notes: None,
    }
}

/// Contact draft with an email derived from the names.
pub fn sample_contact_draft(first: &str, last: &str) -> ContactDraft {
    ContactDraft {
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()),
        phone: Some("555-0100".to_string()),
        company: "Acme".to_string(),
        position: None,
        notes: None,
    }
}

/// Deal draft in the proposal stage.
///
/// # Defaults
/// * `value`: 5000
/// * `probability`: 50
/// * `close_date`: 2024-12-31
pub fn sample_deal_draft(title: &str, contact: RecordId) -> DealDraft {
    DealDraft {
        title: title.to_string(),
        value: Decimal::from(5000),
        stage: DealStage::Proposal,
        probability: 50,
        close_date: NaiveDate::from_ymd_opt(2024, 12, 31),
        notes: None,
        contact,
        company: None,
    }
}

/// Quote draft with a full billing address and empty shipping.
pub fn sample_quote_draft(name: &str, company: RecordId, contact: RecordId) -> QuoteDraft {
    QuoteDraft {
        name: name.to_string(),
        tags: None,
        quote_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        expires_on: None,
        status: QuoteStatus::Draft,
        delivery_method: None,
        billing: Address {
            name: "Acme".into(),
            street: "1 Main St".into(),
            city: "Pune".into(),
            state: "MH".into(),
            country: "India".into(),
            pincode: "411001".into(),
        },
        shipping: Address::default(),
        company,
        contact,
        deal: None,
    }
}
