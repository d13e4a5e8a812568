//! Remote store for player rows
//!
//! [`RestRemoteStore`] speaks the PostgREST dialect used by hosted
//! backend-as-a-service databases: rows live under `/rest/v1/<table>`,
//! upserts are a POST with `on_conflict` plus a `Prefer` header, and filters
//! are query parameters like `device_id=eq.<id>`.

use async_trait::async_trait;
use reqwest::{header, Client, Request, StatusCode};
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, SyncError};
use crate::types::{PlayerRow, SyncConfig};

/// Storage backend for player rows, keyed by device id
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Insert or replace the row for `row.device_id`
    async fn upsert(&self, row: &PlayerRow) -> Result<()>;

    /// Fetch the row for a device, if any
    async fn fetch(&self, device_id: &str) -> Result<Option<PlayerRow>>;
}

/// HTTP client for a PostgREST `players` table
pub struct RestRemoteStore {
    base_url: String,
    table: String,
    client: Client,
}

impl RestRemoteStore {
    /// Build a client from config. Fails with `NotConfigured` when URL or key
    /// is missing.
    pub fn new(config: &SyncConfig) -> Result<Self> {
        if !config.is_configured() {
            return Err(SyncError::NotConfigured);
        }
        let (Some(url), Some(api_key)) = (&config.url, &config.api_key) else {
            return Err(SyncError::NotConfigured);
        };

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "apikey",
            header::HeaderValue::from_str(api_key)
                .map_err(|e| SyncError::Config(format!("Invalid API key: {}", e)))?,
        );
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| SyncError::Config(format!("Invalid API key: {}", e)))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: url.trim_end_matches('/').to_string(),
            table: config.table.clone(),
            client,
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn upsert_request(&self, row: &PlayerRow) -> Result<Request> {
        Ok(self
            .client
            .post(self.table_url())
            .query(&[("on_conflict", "device_id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .header(header::CONTENT_TYPE, "application/json")
            .json(row)
            .build()?)
    }

    fn fetch_request(&self, device_id: &str) -> Result<Request> {
        let filter = format!("eq.{}", device_id);
        Ok(self
            .client
            .get(self.table_url())
            .query(&[("device_id", filter.as_str()), ("select", "*")])
            .build()?)
    }
}

/// Map a non-2xx status to `SyncError::Server`, keeping the body as message
fn check_status(status: StatusCode, body: &str) -> Result<()> {
    if !status.is_success() {
        return Err(SyncError::Server {
            status: status.as_u16(),
            message: body.to_string(),
        });
    }
    Ok(())
}

/// Decode a fetch response. A 404 and an empty result set both mean no row.
fn decode_fetch(status: StatusCode, body: &str) -> Result<Option<PlayerRow>> {
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    check_status(status, body)?;
    let rows: Vec<PlayerRow> = serde_json::from_str(body)?;
    Ok(rows.into_iter().next())
}

#[async_trait]
impl RemoteStore for RestRemoteStore {
    async fn upsert(&self, row: &PlayerRow) -> Result<()> {
        let request = self.upsert_request(row)?;
        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        check_status(status, &body)?;
        debug!(device_id = %row.device_id, "Upserted player row");
        Ok(())
    }

    async fn fetch(&self, device_id: &str) -> Result<Option<PlayerRow>> {
        let request = self.fetch_request(device_id)?;
        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;
        decode_fetch(status, &body)
    }
}
