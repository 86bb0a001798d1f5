//! Hosted store backend speaking the PostgREST dialect over HTTPS.
//!
//! # Configuration
//!
//! - `url`: project endpoint, e.g. `https://xyz.supabase.co`
//! - `api_key`: access key, sent as `apikey` and as a bearer token
//! - `timeout_secs`: per-request timeout
//!
//! Every write asks for `Prefer: return=representation` so inserted and
//! updated rows come back with their store-assigned columns.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::query::{Filter, Query};
use crate::row::Row;
use crate::table_store::TableStore;
use crate::{StoreError, StoreResult};

const REST_PATH: &str = "rest/v1";

/// Connection settings for [`PostgrestStore`].
#[derive(Debug, Clone)]
pub struct PostgrestConfig {
    pub url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl PostgrestConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            timeout_secs: 30,
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.url.trim().is_empty() {
            return Err(StoreError::Config("store URL cannot be empty".into()));
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(StoreError::Config(format!(
                "store URL must start with http:// or https://, got '{}'",
                self.url
            )));
        }
        if self.api_key.trim().is_empty() {
            return Err(StoreError::Config("store access key cannot be empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(StoreError::Config("timeout must be > 0".into()));
        }
        Ok(())
    }

    /// Endpoint for a table, e.g. `https://xyz.supabase.co/rest/v1/events`.
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/{}/{}", self.url.trim_end_matches('/'), REST_PATH, table)
    }
}

/// HTTPS-backed [`TableStore`].
pub struct PostgrestStore {
    config: PostgrestConfig,
    http: Client,
}

impl PostgrestStore {
    pub fn new(config: PostgrestConfig) -> StoreResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Config(e.to_string()))?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &PostgrestConfig {
        &self.config
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.http
            .request(method, self.config.table_url(table))
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .header("Accept", "application/json")
    }

    fn with_filters(builder: RequestBuilder, filters: &[Filter]) -> RequestBuilder {
        let params: Vec<(String, String)> = filters.iter().map(Filter::to_param).collect();
        builder.query(&params)
    }

    async fn send(&self, table: &str, builder: RequestBuilder) -> StoreResult<Vec<Row>> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(table, status = status.as_u16(), "store request failed");
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        parse_rows(&body)
    }
}

#[async_trait]
impl TableStore for PostgrestStore {
    async fn insert(&self, table: &str, rows: Vec<Row>) -> StoreResult<Vec<Row>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        debug!(table, count = rows.len(), "insert");
        let builder = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&rows);
        self.send(table, builder).await
    }

    async fn select(&self, table: &str, query: &Query) -> StoreResult<Vec<Row>> {
        debug!(table, ?query, "select");
        let mut builder = self
            .request(Method::GET, table)
            .query(&[("select", query.select_param())]);
        builder = Self::with_filters(builder, &query.filters);
        if let Some(order) = &query.order {
            builder = builder.query(&[("order", order.to_param())]);
        }
        if let Some(limit) = query.limit {
            builder = builder.query(&[("limit", limit.to_string())]);
        }
        self.send(table, builder).await
    }

    async fn update(&self, table: &str, filters: &[Filter], patch: Row) -> StoreResult<Vec<Row>> {
        debug!(table, ?filters, "update");
        let builder = self
            .request(Method::PATCH, table)
            .header("Prefer", "return=representation")
            .json(&patch);
        self.send(table, Self::with_filters(builder, filters)).await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> StoreResult<Vec<Row>> {
        debug!(table, ?filters, "delete");
        let builder = self
            .request(Method::DELETE, table)
            .header("Prefer", "return=representation");
        self.send(table, Self::with_filters(builder, filters)).await
    }

    fn backend(&self) -> &'static str {
        "postgrest"
    }
}

/// Parse a response body: an array of rows, a single row, or nothing.
fn parse_rows(body: &str) -> StoreResult<Vec<Row>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<Value>(body)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(row) => Some(row),
                _ => None,
            })
            .collect()),
        Value::Object(row) => Ok(vec![row]),
        Value::Null => Ok(Vec::new()),
        other => Err(StoreError::Decode(format!(
            "unexpected response body: {other}"
        ))),
    }
}

/// Pull the human-readable message out of an error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(PostgrestConfig::new("https://xyz.supabase.co", "key").validate().is_ok());
        assert!(PostgrestConfig::new("", "key").validate().is_err());
        assert!(PostgrestConfig::new("xyz.supabase.co", "key").validate().is_err());
        assert!(PostgrestConfig::new("https://xyz.supabase.co", " ").validate().is_err());
        assert!(
            PostgrestConfig::new("https://xyz.supabase.co", "key")
                .with_timeout_secs(0)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_table_url() {
        let config = PostgrestConfig::new("https://xyz.supabase.co/", "key");
        assert_eq!(
            config.table_url("events"),
            "https://xyz.supabase.co/rest/v1/events"
        );
    }

    #[test]
    fn test_parse_rows_shapes() {
        assert!(parse_rows("").unwrap().is_empty());
        assert_eq!(parse_rows(r#"[{"id": 1}, {"id": 2}]"#).unwrap().len(), 2);
        assert_eq!(parse_rows(r#"{"id": 1}"#).unwrap().len(), 1);
        assert!(parse_rows("42").is_err());
    }

    #[test]
    fn test_error_message_extraction() {
        let body = r#"{"code":"PGRST204","message":"Could not find the 'type' column"}"#;
        assert_eq!(error_message(body), "Could not find the 'type' column");
        assert_eq!(error_message("gateway timeout"), "gateway timeout");
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let result = PostgrestStore::new(PostgrestConfig::new("", ""));
        assert!(matches!(result, Err(StoreError::Config(_))));
    }
}
