//! # foundaudio
//!
//! Agent tools for the Found Audio catalog:
//! - `GetAudioList`: list audio files filtered by search text, genre and
//!   uploader, newest first
//! - `SayHello`: greeting used to check host wiring
//!
//! Tools take JSON arguments plus a [`ToolContext`] carrying injected
//! secrets, and fail with a [`ToolError`] that tells the caller whether
//! resubmitting corrected arguments can help.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use foundaudio::{Config, GetAudioList, PostgrestConnector, QueryFilters, ToolContext};
//!
//! # async fn run() -> Result<(), foundaudio::ToolError> {
//! let config = Config::default();
//! let tool = GetAudioList::new(&config, Arc::new(PostgrestConnector::default()));
//! let context = ToolContext::new().with_secret("SUPABASE_ANON_KEY", "anon-key");
//!
//! let filters = QueryFilters::new(Some(10), Some("dance".into()), Some("house".into()), None)?;
//! let envelope = tool.list(filters, &context).await?;
//! println!("{} files", envelope.count);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod compat;
pub mod config;
pub mod context;
pub mod error;
pub mod store;
pub mod tools;

pub use agent::CatalogAgent;
pub use compat::RigTool;
pub use config::Config;
pub use context::ToolContext;
pub use error::{StoreError, ToolError};
pub use store::{
    Filter, OrderBy, PostgrestConnector, PostgrestStore, RecordStore, Rows, SelectQuery,
    StoreConnector, StoreCredentials,
};
pub use tools::{
    default_catalog, AudioFile, AudioListEnvelope, DynTool, GetAudioList, NamedTool,
    QueryFilters, SayHello, Tool, ToolCatalog, ToolDefinition,
};
