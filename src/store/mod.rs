//! # Store Module
//!
//! A small, client-agnostic description of a read query ([`SelectQuery`])
//! and the two seams tools use to run it:
//! - [`StoreConnector`] builds a short-lived [`RecordStore`] from
//!   per-invocation credentials.
//! - [`RecordStore::execute`] runs one query and returns raw JSON rows.
//!
//! [`postgrest`] implements both over the Supabase REST API.

pub mod postgrest;

pub use postgrest::{PostgrestConnector, PostgrestStore};

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::error::StoreError;

// =============================================================================
// QUERY SPECIFICATION
// =============================================================================
/// A single row filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `column = value`
    Eq { column: String, value: String },

    /// Case-insensitive substring match of `needle` against any of `columns`
    /// (logical OR).
    AnyContainsIgnoreCase { columns: Vec<String>, needle: String },

    /// Array `column` contains every element of `values` (exact match).
    ArrayContains { column: String, values: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub descending: bool,
}

/// Read query against one table. Built with chained calls and handed to
/// [`RecordStore::execute`] as a plain value.
///
/// ```
/// use foundaudio::store::SelectQuery;
///
/// let query = SelectQuery::from("audio_files")
///     .select(&["id", "title"])
///     .array_contains("genres", "house")
///     .order_desc("created_at")
///     .limit(10);
/// assert_eq!(query.limit, Some(10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    pub table: String,
    pub columns: Vec<String>,
    pub filters: Vec<Filter>,
    pub order: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl SelectQuery {
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn select(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(Filter::Eq {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn any_contains_ignore_case(mut self, columns: &[&str], needle: impl Into<String>) -> Self {
        self.filters.push(Filter::AnyContainsIgnoreCase {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            needle: needle.into(),
        });
        self
    }

    pub fn array_contains(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(Filter::ArrayContains {
            column: column.into(),
            values: vec![value.into()],
        });
        self
    }

    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order = Some(OrderBy {
            column: column.into(),
            descending: true,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

// =============================================================================
// STORE SEAMS
// =============================================================================
/// Raw rows as returned by the store. `None` is a null result set.
pub type Rows = Option<Vec<serde_json::Value>>;

/// Executes read queries against the remote catalog.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn execute(&self, query: &SelectQuery) -> Result<Rows, StoreError>;
}

/// Address and key for one connection. The key never appears in `Debug`.
#[derive(Clone)]
pub struct StoreCredentials {
    pub url: String,
    pub api_key: String,
}

impl fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreCredentials")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Builds a store client for a single invocation.
pub trait StoreConnector: Send + Sync {
    fn connect(&self, credentials: &StoreCredentials) -> Result<Arc<dyn RecordStore>, StoreError>;
}
