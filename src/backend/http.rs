//! Hosted record backend reached over HTTPS.
//!
//! Endpoints live under `{api_url}/tables/{table}`:
//!
//! | operation | request |
//! |---|---|
//! | fetch | `POST …/fetch` with [`FetchParams`] |
//! | get by id | `POST …/records/{id}` with [`RecordQuery`] |
//! | create | `POST …/records` with [`RecordBatch`] |
//! | update | `PATCH …/records` with [`RecordBatch`] |
//! | delete | `DELETE …/records` with [`DeleteParams`] |
//!
//! The project id travels in `X-Project-Id`, the public key as a bearer token.

use super::{DeleteParams, FetchParams, RecordBatch, RecordClient, RecordQuery, ResponseEnvelope};
use crate::config::credentials::Credentials;
use crate::errors::Result;
use crate::schema::RecordId;
use reqwest::Method;
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// Header carrying the project identifier.
const PROJECT_HEADER: &str = "X-Project-Id";

/// Client for the hosted backend; build once and share.
#[derive(Debug, Clone)]
pub struct HttpRecordClient {
    base_url: String,
    credentials: Credentials,
    client: reqwest::Client,
}

impl HttpRecordClient {
    /// Creates a client for `api_url` (a trailing slash is ignored).
    #[must_use]
    pub fn new(api_url: &str, credentials: Credentials) -> Self {
        Self {
            base_url: api_url.trim_end_matches('/').to_string(),
            credentials,
            client: reqwest::Client::new(),
        }
    }

    fn table_url(&self, table: &str, path: &str) -> String {
        format!("{}/tables/{table}{path}", self.base_url)
    }

    #[instrument(skip(self, body))]
    async fn send<B: Serialize + Sync>(&self, method: Method, url: String, body: &B) -> Result<ResponseEnvelope> {
        let response = self
            .client
            .request(method, &url)
            .header(PROJECT_HEADER, &self.credentials.project_id)
            .bearer_auth(&self.credentials.public_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!("Backend answered {} ({} bytes)", status, text.len());

        match serde_json::from_str::<ResponseEnvelope>(&text) {
            Ok(envelope) => Ok(envelope),
            Err(e) if !status.is_success() => {
                warn!("Unreadable error response from {}: {}", url, e);
                Ok(ResponseEnvelope::failure(format!("Backend responded with HTTP {status}")))
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl RecordClient for HttpRecordClient {
    async fn fetch_records(&self, table: &str, params: &FetchParams) -> Result<ResponseEnvelope> {
        self.send(Method::POST, self.table_url(table, "/fetch"), params).await
    }

    async fn get_record_by_id(&self, table: &str, id: RecordId, query: &RecordQuery) -> Result<ResponseEnvelope> {
        self.send(Method::POST, self.table_url(table, &format!("/records/{id}")), query)
            .await
    }

    async fn create_record(&self, table: &str, batch: &RecordBatch) -> Result<ResponseEnvelope> {
        self.send(Method::POST, self.table_url(table, "/records"), batch).await
    }

    async fn update_record(&self, table: &str, batch: &RecordBatch) -> Result<ResponseEnvelope> {
        self.send(Method::PATCH, self.table_url(table, "/records"), batch).await
    }

    async fn delete_record(&self, table: &str, params: &DeleteParams) -> Result<ResponseEnvelope> {
        self.send(Method::DELETE, self.table_url(table, "/records"), params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url_ignores_trailing_slash() {
        let client = HttpRecordClient::new(
            "https://crm.example.com/api/",
            Credentials {
                project_id: "p-1".into(),
                public_key: "pk".into(),
            },
        );
        assert_eq!(
            client.table_url("deal_c", "/fetch"),
            "https://crm.example.com/api/tables/deal_c/fetch"
        );
    }
}
