//! # Configuration Module
//!
//! Loads runtime configuration from environment variables (and a `.env`
//! file during local development). Secrets are not part of this struct: the
//! store API key reaches tools through the [`ToolContext`](crate::ToolContext).

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Default Found Audio Supabase project
pub const DEFAULT_STORE_URL: &str = "https://msocrbprgpaqvrtrcqpo.supabase.co";

/// Public site that serves audio pages at `/audio/<id>`
pub const DEFAULT_SITE_URL: &str = "https://foundaudio.club";

/// Timeout applied to every store request
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// CONFIGURATION STRUCT
// =============================================================================
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the PostgREST/Supabase project
    pub store_url: String,

    /// Base URL used to derive each audio file's public `url`
    pub site_url: String,

    /// Per-request timeout for store calls
    pub request_timeout: Duration,

    /// The Ollama model driving the `ask` command
    pub model: String,

    /// Ollama server URL
    pub ollama_host: String,

    /// Log level for the application
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_url: DEFAULT_STORE_URL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            model: "llama3.2".to_string(),
            ollama_host: "http://localhost:11434".to_string(),
            log_level: "info".to_string(),
        }
    }
}

// =============================================================================
// CONFIGURATION LOADING
// =============================================================================
impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset variables keep their defaults. A `.env` file in the working
    /// directory is loaded first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = Config::default();

        if let Ok(val) = env::var("SUPABASE_URL") {
            config.store_url = val;
        }

        if let Ok(val) = env::var("FOUNDAUDIO_SITE_URL") {
            config.site_url = val;
        }

        if let Ok(val) = env::var("FOUNDAUDIO_TIMEOUT_SECS") {
            let secs: u64 = val
                .parse()
                .context("FOUNDAUDIO_TIMEOUT_SECS must be a whole number of seconds")?;
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Ok(val) = env::var("OLLAMA_MODEL") {
            config.model = val;
        }

        if let Ok(val) = env::var("OLLAMA_API_BASE_URL") {
            config.ollama_host = val;
        }

        if let Ok(val) = env::var("RUST_LOG") {
            config.log_level = val;
        }

        Ok(config)
    }

    /// Validate the configuration before any tool runs.
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [("SUPABASE_URL", &self.store_url), ("FOUNDAUDIO_SITE_URL", &self.site_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("{} must be an http(s) URL, got: {}", name, url);
            }
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("FOUNDAUDIO_TIMEOUT_SECS must be at least 1");
        }

        if self.model.is_empty() {
            anyhow::bail!("OLLAMA_MODEL cannot be empty");
        }

        Ok(())
    }
}
