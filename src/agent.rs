//! # Agent Module
//!
//! A Rig agent backed by a local Ollama model that answers natural-language
//! requests about the Found Audio catalog by calling the catalog tools.

use anyhow::Result;
use rig::client::{CompletionClient, Nothing};
use rig::completion::Prompt;
use rig::providers::ollama;
use std::sync::Arc;
use tracing::{debug, info};

use crate::compat::RigTool;
use crate::config::Config;
use crate::context::ToolContext;
use crate::store::StoreConnector;
use crate::tools::{GetAudioList, SayHello};

/// Maximum tool-call rounds before the agent must answer
const MAX_TURNS: usize = 5;

const CATALOG_SYSTEM_PROMPT: &str = r#"
You are an AI assistant with access to foundaudio tools.
You can search for audio files using various filters.

- Use the GetAudioList tool to help users find audio content. Pass only the
  filters the user asked for: limit (1-100), search (matches title or
  description), genre, username.
- Use the SayHello tool when the user asks to be greeted.
- If a tool reports an invalid argument, correct the argument and try again.
- Summarize the audio files you found with their titles and links.
"#;

/// Natural-language front end over the catalog tools.
pub struct CatalogAgent {
    config: Config,
    context: ToolContext,
    connector: Arc<dyn StoreConnector>,
}

impl CatalogAgent {
    pub fn new(config: Config, context: ToolContext, connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            config,
            context,
            connector,
        }
    }

    /// Answer `request`, letting the model call tools as needed.
    pub async fn ask(&self, request: &str) -> Result<String> {
        info!(request = %request, "Starting catalog request");

        let ollama_client = ollama_client(&self.config.ollama_host)?;

        debug!(
            host = %self.config.ollama_host,
            model = %self.config.model,
            "Connected to Ollama"
        );

        let agent = ollama_client
            .agent(&self.config.model)
            .preamble(CATALOG_SYSTEM_PROMPT)
            .tool(RigTool::new(SayHello, self.context.clone()))
            .tool(RigTool::new(
                GetAudioList::new(&self.config, self.connector.clone()),
                self.context.clone(),
            ))
            .build();

        let response = agent
            .prompt(request)
            .multi_turn(MAX_TURNS)
            .await
            .map_err(|e| anyhow::anyhow!("Agent execution failed: {}", e))?;

        info!("Catalog request completed");

        Ok(response)
    }
}

/// Ollama client pointed at `host`. Ollama takes no API key.
fn ollama_client(host: &str) -> Result<ollama::Client> {
    ollama::Client::builder()
        .api_key(Nothing)
        .base_url(host)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create Ollama client for {}: {}", host, e))
}
