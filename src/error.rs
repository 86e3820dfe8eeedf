//! # Error Module
//!
//! Two layers of typed errors:
//! - [`ToolError`]: what a tool invocation returns to its caller. The
//!   `Retryable` variant means the same request succeeds once the caller
//!   fixes its arguments; `Execution` means it will not.
//! - [`StoreError`]: failures talking to the remote catalog database.

use thiserror::Error;

/// Boxed error kept as the `source()` of an execution failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// =============================================================================
// TOOL ERROR
// =============================================================================
/// Error returned from a tool invocation.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The caller supplied input that, once corrected, lets the request
    /// succeed. `guidance` is meant to be fed back to the caller verbatim.
    #[error("{message}")]
    Retryable { message: String, guidance: String },

    /// Failure rooted in configuration or system state.
    #[error("Error in execution of {tool}: {message}")]
    Execution {
        tool: String,
        message: String,
        #[source]
        cause: Option<BoxError>,
    },
}

impl ToolError {
    pub fn retryable(message: impl Into<String>, guidance: impl Into<String>) -> Self {
        ToolError::Retryable {
            message: message.into(),
            guidance: guidance.into(),
        }
    }

    pub fn execution(tool: impl Into<String>, message: impl Into<String>) -> Self {
        ToolError::Execution {
            tool: tool.into(),
            message: message.into(),
            cause: None,
        }
    }

    /// Wrap an underlying failure. Its message is folded into ours so it
    /// survives when only the display string reaches the caller.
    pub fn wrap<E>(tool: impl Into<String>, context: &str, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ToolError::Execution {
            tool: tool.into(),
            message: format!("{}: {}", context, cause),
            cause: Some(Box::new(cause)),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ToolError::Retryable { .. })
    }

    /// Corrective text for retryable errors.
    pub fn guidance(&self) -> Option<&str> {
        match self {
            ToolError::Retryable { guidance, .. } => Some(guidance),
            ToolError::Execution { .. } => None,
        }
    }
}

// =============================================================================
// STORE ERROR
// =============================================================================
/// Typed errors for the remote record store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized ({0}) - check the store API key")]
    Unauthorized(u16),

    #[error("HTTP error ({0}): {1}")]
    Http(u16, String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid store configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            StoreError::Timeout
        } else if e.is_connect() {
            StoreError::Connection(e.to_string())
        } else if e.is_decode() {
            StoreError::Parse(e.to_string())
        } else {
            StoreError::Network(e.to_string())
        }
    }
}
