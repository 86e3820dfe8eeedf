//! # Tools Module
//!
//! The tools this crate offers to an agent host, and a small catalog that
//! invokes them by name:
//! - `SayHello`: greeting used to smoke-test host wiring
//! - `GetAudioList`: search the Found Audio catalog

pub mod audio_list;
pub mod hello;

pub use audio_list::{AudioFile, AudioListEnvelope, GetAudioList, QueryFilters};
pub use hello::SayHello;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::context::ToolContext;
use crate::error::ToolError;
use crate::store::PostgrestConnector;

/// Name, description and JSON schema of a tool's parameters.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Tool interface
#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    /// Run the tool. `args` is the JSON object of named parameters as the
    /// host received them; declared defaults are applied by the tool.
    async fn execute(
        &self,
        args: serde_json::Value,
        context: &ToolContext,
    ) -> Result<serde_json::Value, ToolError>;
}

/// Compile-time tool name, needed where the host wants a `const`.
pub trait NamedTool {
    const NAME: &'static str;
}

pub type DynTool = Arc<dyn Tool>;

// =============================================================================
// TOOL CATALOG
// =============================================================================
/// Maps tool names to their implementations.
#[derive(Default, Clone)]
pub struct ToolCatalog {
    tools: HashMap<String, DynTool>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: DynTool) {
        let name = tool.definition().name;
        self.tools.insert(name, tool);
    }

    pub fn get(&self, name: &str) -> Option<&DynTool> {
        self.tools.get(name)
    }

    /// All tool definitions, sorted by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values().map(|t| t.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Look up `name` and execute it. Returns `None` for an unknown tool.
    pub async fn invoke(
        &self,
        name: &str,
        args: serde_json::Value,
        context: &ToolContext,
    ) -> Option<Result<serde_json::Value, ToolError>> {
        let tool = self.tools.get(name)?;
        info!(tool = %name, tool_call_id = ?context.tool_call_id(), "Invoking tool");
        Some(tool.execute(args, context).await)
    }
}

impl std::fmt::Debug for ToolCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolCatalog")
            .field("tools", &self.names())
            .finish()
    }
}

/// Catalog with every tool, wired to the Supabase REST store.
pub fn default_catalog(config: &Config) -> ToolCatalog {
    let connector = Arc::new(PostgrestConnector::new(config.request_timeout));
    let mut catalog = ToolCatalog::new();
    catalog.register(Arc::new(SayHello));
    catalog.register(Arc::new(GetAudioList::new(config, connector)));
    catalog
}
