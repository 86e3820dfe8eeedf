//! PostgREST store - the Supabase REST dialect
//!
//! Translates a [`SelectQuery`] into `GET {base}/rest/v1/{table}` with
//! PostgREST filter parameters:
//!
//! | Filter | Query parameter |
//! |--------|-----------------|
//! | `Eq` | `col=eq.value` |
//! | `AnyContainsIgnoreCase` | `or=(a.ilike.%v%,b.ilike.%v%)` |
//! | `ArrayContains` | `col=cs.{"v"}` |
//! | order | `order=col.desc` |
//! | limit | `limit=n` |

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::{Filter, RecordStore, Rows, SelectQuery, StoreConnector, StoreCredentials};
use crate::config::DEFAULT_TIMEOUT_SECS;
use crate::error::StoreError;

/// Characters with meaning inside a PostgREST logical filter list.
const RESERVED: &[char] = &[',', '.', ':', '(', ')', '"', '\\'];

// =============================================================================
// STORE
// =============================================================================
/// A store client bound to one project and key.
pub struct PostgrestStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PostgrestStore {
    pub fn new(client: Client, base_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }
}

#[async_trait]
impl RecordStore for PostgrestStore {
    async fn execute(&self, query: &SelectQuery) -> Result<Rows, StoreError> {
        let params = query_params(query);
        debug!(table = %query.table, params = ?params, "Executing PostgREST query");

        let response = self
            .client
            .get(self.table_url(&query.table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    StoreError::Unauthorized(status.as_u16())
                }
                _ => StoreError::Http(status.as_u16(), body),
            });
        }

        parse_rows(&body)
    }
}

fn parse_rows(body: &str) -> Result<Rows, StoreError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str(body).map_err(|e| StoreError::Parse(e.to_string()))? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Array(rows) => Ok(Some(rows)),
        other => Err(StoreError::Parse(format!(
            "expected an array of rows, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

// =============================================================================
// QUERY ENCODING
// =============================================================================
/// Encode a query as PostgREST query-string pairs, in filter order.
pub(crate) fn query_params(query: &SelectQuery) -> Vec<(String, String)> {
    let mut params = Vec::new();

    if !query.columns.is_empty() {
        params.push(("select".to_string(), query.columns.join(",")));
    }

    for filter in &query.filters {
        match filter {
            Filter::Eq { column, value } => {
                params.push((column.clone(), format!("eq.{}", value)));
            }
            Filter::AnyContainsIgnoreCase { columns, needle } => {
                let pattern = quote_value(&format!("%{}%", needle));
                let clauses: Vec<String> = columns
                    .iter()
                    .map(|column| format!("{}.ilike.{}", column, pattern))
                    .collect();
                params.push(("or".to_string(), format!("({})", clauses.join(","))));
            }
            Filter::ArrayContains { column, values } => {
                let elements: Vec<String> = values.iter().map(|v| array_element(v)).collect();
                params.push((column.clone(), format!("cs.{{{}}}", elements.join(","))));
            }
        }
    }

    if let Some(order) = &query.order {
        let direction = if order.descending { "desc" } else { "asc" };
        params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
    }

    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }

    params
}

/// Double-quote a value inside a logical filter list when it contains
/// reserved characters.
fn quote_value(value: &str) -> String {
    if value.contains(RESERVED) {
        format!("\"{}\"", escape(value))
    } else {
        value.to_string()
    }
}

/// Array literal elements are always quoted.
fn array_element(value: &str) -> String {
    format!("\"{}\"", escape(value))
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

// =============================================================================
// CONNECTOR
// =============================================================================
/// Builds a fresh [`PostgrestStore`] per invocation.
#[derive(Debug, Clone)]
pub struct PostgrestConnector {
    timeout: Duration,
}

impl Default for PostgrestConnector {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

impl PostgrestConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl StoreConnector for PostgrestConnector {
    fn connect(&self, credentials: &StoreCredentials) -> Result<Arc<dyn RecordStore>, StoreError> {
        if !(credentials.url.starts_with("http://") || credentials.url.starts_with("https://")) {
            return Err(StoreError::Config(format!(
                "store URL must be http(s), got: {}",
                credentials.url
            )));
        }

        let client = Client::builder().timeout(self.timeout).build()?;

        Ok(Arc::new(PostgrestStore::new(
            client,
            &credentials.url,
            credentials.api_key.clone(),
        )))
    }
}
