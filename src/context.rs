//! Tool execution context
//!
//! The host hands every invocation a [`ToolContext`] carrying the secrets it
//! injected for that call. Tools never read secrets from the process
//! environment themselves.

use std::collections::HashMap;
use std::fmt;

/// Per-invocation context supplied by the host.
#[derive(Clone, Default)]
pub struct ToolContext {
    secrets: HashMap<String, String>,
    tool_call_id: Option<String>,
}

impl ToolContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets.insert(name.into(), value.into());
        self
    }

    pub fn with_tool_call_id(mut self, id: &str) -> Self {
        self.tool_call_id = Some(id.to_string());
        self
    }

    /// Look up an injected secret by name
    pub fn get_secret(&self, name: &str) -> Option<&str> {
        self.secrets.get(name).map(String::as_str)
    }

    pub fn tool_call_id(&self) -> Option<&str> {
        self.tool_call_id.as_deref()
    }
}

// Secret values stay out of logs.
impl fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolContext")
            .field("secrets", &self.secrets.keys().collect::<Vec<_>>())
            .field("tool_call_id", &self.tool_call_id)
            .finish()
    }
}
