//! `GetAudioList` - search the Found Audio catalog
//!
//! Filters are optional. A username is first resolved to its owner id
//! through the `profiles` table, then the `audio_files` query is built from
//! whichever filters are present and sorted newest first.
//!
//! Rows that share a `created_at` come back in the store's native order,
//! which is unspecified.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{NamedTool, Tool, ToolDefinition};
use crate::config::Config;
use crate::context::ToolContext;
use crate::error::ToolError;
use crate::store::{RecordStore, SelectQuery, StoreConnector, StoreCredentials};

pub const DEFAULT_LIMIT: i64 = 20;
pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 100;

/// Secret holding the Supabase anon key
pub const STORE_KEY_SECRET: &str = "SUPABASE_ANON_KEY";

pub const AUDIO_FILES_TABLE: &str = "audio_files";
pub const PROFILES_TABLE: &str = "profiles";

/// Columns selected for [`AudioFile`]. `url` is derived, never stored.
pub const AUDIO_FILE_COLUMNS: &[&str] = &[
    "id",
    "title",
    "description",
    "duration",
    "genres",
    "user_id",
    "created_at",
    "updated_at",
];

// =============================================================================
// FILTERS
// =============================================================================
/// Validated, normalized filters for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFilters {
    limit: usize,
    search: Option<String>,
    genre: Option<String>,
    username: Option<String>,
}

impl Default for QueryFilters {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT as usize,
            search: None,
            genre: None,
            username: None,
        }
    }
}

impl QueryFilters {
    /// Validate raw filter values.
    ///
    /// `limit` defaults to 20 and must lie in 1..=100. Blank `search` and
    /// `genre` are treated as absent. A `username` that is present but blank
    /// is rejected: the caller asked for a user filter without naming one.
    pub fn new(
        limit: Option<i64>,
        search: Option<String>,
        genre: Option<String>,
        username: Option<String>,
    ) -> Result<Self, ToolError> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
            return Err(ToolError::retryable(
                format!(
                    "Invalid limit parameter: {}. Must be between {} and {}.",
                    limit, MIN_LIMIT, MAX_LIMIT
                ),
                format!(
                    "Provide a limit between {} and {} (default: {}).",
                    MIN_LIMIT, MAX_LIMIT, DEFAULT_LIMIT
                ),
            ));
        }

        if matches!(&username, Some(u) if u.trim().is_empty()) {
            return Err(ToolError::retryable(
                "Invalid username parameter: username cannot be empty.",
                "Provide a non-empty username, or omit the username parameter to list audio files from all users.",
            ));
        }

        Ok(Self {
            limit: limit as usize,
            search: non_blank(search),
            genre: non_blank(genre),
            username,
        })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Arguments as received from the host. `null` counts as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct GetAudioListArgs {
    #[serde(default)]
    limit: Option<i64>,
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    genre: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

// =============================================================================
// RESULT TYPES
// =============================================================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFile {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Public page, always `<site>/audio/<id>`
    pub url: String,
    /// Length in seconds
    pub duration: Option<f64>,
    pub genres: Vec<String>,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A row of `audio_files` as the store returns it.
#[derive(Debug, Deserialize)]
struct AudioRow {
    id: String,
    title: String,
    description: Option<String>,
    duration: Option<f64>,
    genres: Option<Vec<String>>,
    user_id: String,
    created_at: String,
    updated_at: String,
}

impl AudioFile {
    fn from_row(row: AudioRow, site_url: &str) -> Self {
        Self {
            url: audio_url(site_url, &row.id),
            id: row.id,
            title: row.title,
            description: row.description,
            duration: row.duration,
            genres: row.genres.unwrap_or_default(),
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Public URL of an audio file.
pub fn audio_url(site_url: &str, id: &str) -> String {
    format!("{}/audio/{}", site_url.trim_end_matches('/'), id)
}

/// Rows plus the effective filters that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioListEnvelope {
    pub audio_files: Vec<AudioFile>,
    pub count: usize,
    pub limit: usize,
    pub search: Option<String>,
    pub genre: Option<String>,
    pub username: Option<String>,
}

impl AudioListEnvelope {
    fn new(audio_files: Vec<AudioFile>, filters: &QueryFilters) -> Self {
        Self {
            count: audio_files.len(),
            audio_files,
            limit: filters.limit,
            search: filters.search.clone(),
            genre: filters.genre.clone(),
            username: filters.username.clone(),
        }
    }
}

// =============================================================================
// QUERY CONSTRUCTION
// =============================================================================
/// Main `audio_files` query for the given filters and resolved owner id.
pub fn build_audio_query(filters: &QueryFilters, owner_id: Option<&str>) -> SelectQuery {
    let mut query = SelectQuery::from(AUDIO_FILES_TABLE).select(AUDIO_FILE_COLUMNS);

    if let Some(owner_id) = owner_id {
        query = query.eq("user_id", owner_id);
    }
    if let Some(search) = filters.search() {
        query = query.any_contains_ignore_case(&["title", "description"], search);
    }
    if let Some(genre) = filters.genre() {
        query = query.array_contains("genres", genre);
    }

    query.order_desc("created_at").limit(filters.limit())
}

/// Exact-match lookup of a username in the profile directory.
pub fn build_profile_query(username: &str) -> SelectQuery {
    SelectQuery::from(PROFILES_TABLE)
        .select(&["id"])
        .eq("username", username)
}

// =============================================================================
// TOOL
// =============================================================================
pub struct GetAudioList {
    store_url: String,
    site_url: String,
    connector: Arc<dyn StoreConnector>,
}

impl GetAudioList {
    pub fn new(config: &Config, connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            store_url: config.store_url.clone(),
            site_url: config.site_url.clone(),
            connector,
        }
    }

    /// Run one listing. Validation has already happened in [`QueryFilters::new`].
    pub async fn list(
        &self,
        filters: QueryFilters,
        context: &ToolContext,
    ) -> Result<AudioListEnvelope, ToolError> {
        info!(
            limit = filters.limit(),
            search = ?filters.search(),
            genre = ?filters.genre(),
            username = ?filters.username(),
            "Listing audio files"
        );

        let api_key = context
            .get_secret(STORE_KEY_SECRET)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ToolError::execution(
                    Self::NAME,
                    format!("Missing required secret {}", STORE_KEY_SECRET),
                )
            })?;

        let credentials = StoreCredentials {
            url: self.store_url.clone(),
            api_key: api_key.to_string(),
        };
        let store = self
            .connector
            .connect(&credentials)
            .map_err(|e| ToolError::wrap(Self::NAME, "Failed to connect to the audio catalog", e))?;

        let owner_id = match filters.username() {
            Some(username) => Some(self.resolve_owner(store.as_ref(), username).await?),
            None => None,
        };

        let query = build_audio_query(&filters, owner_id.as_deref());
        let rows = store
            .execute(&query)
            .await
            .map_err(|e| ToolError::wrap(Self::NAME, "Failed to query audio files", e))?
            .unwrap_or_default();

        let audio_files = rows
            .into_iter()
            .map(|row| {
                serde_json::from_value::<AudioRow>(row)
                    .map(|row| AudioFile::from_row(row, &self.site_url))
                    .map_err(|e| ToolError::wrap(Self::NAME, "Malformed audio file row", e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(count = audio_files.len(), "Audio list completed");

        Ok(AudioListEnvelope::new(audio_files, &filters))
    }

    /// Resolve a username to the owner id used by `audio_files.user_id`.
    async fn resolve_owner(
        &self,
        store: &dyn RecordStore,
        username: &str,
    ) -> Result<String, ToolError> {
        let rows = store
            .execute(&build_profile_query(username))
            .await
            .map_err(|e| ToolError::wrap(Self::NAME, "Failed to look up username", e))?
            .unwrap_or_default();

        match rows.as_slice() {
            [] => {
                warn!(username = %username, "Username not found");
                Err(ToolError::retryable(
                    format!("Username '{}' not found.", username),
                    "Check the spelling of the username, or omit the username parameter to list audio files from all users.",
                ))
            }
            [profile] => {
                let owner_id = match profile.get("id") {
                    Some(serde_json::Value::String(id)) => id.clone(),
                    _ => {
                        return Err(ToolError::execution(
                            Self::NAME,
                            format!("Profile for '{}' has no id", username),
                        ))
                    }
                };
                debug!(username = %username, owner_id = %owner_id, "Resolved username");
                Ok(owner_id)
            }
            _ => {
                warn!(username = %username, matches = rows.len(), "Ambiguous username");
                Err(ToolError::execution(
                    Self::NAME,
                    format!("Username '{}' matched {} profiles", username, rows.len()),
                ))
            }
        }
    }
}

impl NamedTool for GetAudioList {
    const NAME: &'static str = "GetAudioList";
}

impl std::fmt::Debug for GetAudioList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GetAudioList")
            .field("store_url", &self.store_url)
            .field("site_url", &self.site_url)
            .finish()
    }
}

#[async_trait]
impl Tool for GetAudioList {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Get a list of audio files from the Found Audio database. \
                Supports optional filtering by search term (title or description), genre and username. \
                Results are ordered newest first."
                .to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "integer",
                        "description": "Number of audio files to return (default: 20, max: 100)",
                        "default": DEFAULT_LIMIT,
                        "minimum": MIN_LIMIT,
                        "maximum": MAX_LIMIT
                    },
                    "search": {
                        "type": "string",
                        "description": "Search term to filter by title or description"
                    },
                    "genre": {
                        "type": "string",
                        "description": "Genre to filter by"
                    },
                    "username": {
                        "type": "string",
                        "description": "Only return audio files uploaded by this user"
                    }
                },
                "additionalProperties": false
            }),
        }
    }

    async fn execute(
        &self,
        args: serde_json::Value,
        context: &ToolContext,
    ) -> Result<serde_json::Value, ToolError> {
        if let Some(tool_call_id) = context.tool_call_id() {
            debug!(tool_call_id, "Executing GetAudioList");
        }

        let args: GetAudioListArgs = if args.is_null() {
            GetAudioListArgs::default()
        } else {
            serde_json::from_value(args).map_err(|e| {
                ToolError::retryable(
                    format!("Invalid arguments: {}", e),
                    "Arguments are limit (integer 1-100), search (string), genre (string) and username (string); all optional.",
                )
            })?
        };

        let filters = QueryFilters::new(args.limit, args.search, args.genre, args.username)?;
        let envelope = self.list(filters, context).await?;

        serde_json::to_value(envelope)
            .map_err(|e| ToolError::wrap(Self::NAME, "Failed to serialize result", e))
    }
}
