//! # foundaudio
//!
//! Command-line host for the Found Audio catalog tools.
//!
//! ```bash
//! export SUPABASE_ANON_KEY=...
//! foundaudio list --limit 10 --search dance --genre house
//! foundaudio list --username discodude
//! foundaudio hello developer
//! foundaudio tools
//! foundaudio ask "Show me some house tracks"
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use foundaudio::tools::audio_list::STORE_KEY_SECRET;
use foundaudio::{default_catalog, CatalogAgent, Config, PostgrestConnector, ToolContext, ToolError};

// =============================================================================
// CLI ARGUMENTS
// =============================================================================
#[derive(Parser, Debug)]
#[command(
    name = "foundaudio",
    version,
    about = "Search the Found Audio catalog with agent tools",
    long_about = r#"
Runs the Found Audio agent tools from the command line.

The store API key is read from SUPABASE_ANON_KEY and injected into each tool
invocation as a secret. SUPABASE_URL overrides the catalog project URL.
"#
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long = "verbose", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List audio files (GetAudioList)
    List {
        /// Number of audio files to return (1-100)
        #[arg(short = 'l', long, allow_negative_numbers = true)]
        limit: Option<i64>,

        /// Search term matched against title or description
        #[arg(short = 's', long)]
        search: Option<String>,

        /// Genre to filter by
        #[arg(short = 'g', long)]
        genre: Option<String>,

        /// Only files uploaded by this user
        #[arg(short = 'u', long)]
        username: Option<String>,
    },

    /// Greet someone (SayHello)
    Hello {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Print every tool definition as JSON
    Tools,

    /// Ask the catalog agent a question (requires Ollama)
    Ask {
        #[arg(value_name = "PROMPT")]
        prompt: String,

        /// Ollama model to use (overrides OLLAMA_MODEL)
        #[arg(short = 'm', long = "model")]
        model: Option<String>,
    },
}

// =============================================================================
// MAIN FUNCTION
// =============================================================================
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::from_env()?;

    init_logging(&config.log_level, args.verbose)?;
    if let Command::Ask { model: Some(model), .. } = &args.command {
        info!(model = %model, "Using model from command line");
        config.model = model.clone();
    }
    config.validate()?;

    info!(store = %config.store_url, "Configuration loaded");

    let context = host_context();
    let catalog = default_catalog(&config);

    let (tool, tool_args) = match args.command {
        Command::List { limit, search, genre, username } => {
            let mut tool_args = serde_json::Map::new();
            if let Some(limit) = limit {
                tool_args.insert("limit".to_string(), json!(limit));
            }
            if let Some(search) = search {
                tool_args.insert("search".to_string(), json!(search));
            }
            if let Some(genre) = genre {
                tool_args.insert("genre".to_string(), json!(genre));
            }
            if let Some(username) = username {
                tool_args.insert("username".to_string(), json!(username));
            }
            ("GetAudioList", serde_json::Value::Object(tool_args))
        }
        Command::Hello { name } => ("SayHello", json!({ "name": name })),
        Command::Tools => {
            let defs: Vec<serde_json::Value> = catalog
                .definitions()
                .into_iter()
                .map(|d| json!({ "name": d.name, "description": d.description, "parameters": d.parameters }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&defs)?);
            return Ok(());
        }
        Command::Ask { prompt, .. } => {
            let connector = Arc::new(PostgrestConnector::new(config.request_timeout));
            let agent = CatalogAgent::new(config, context, connector);
            let answer = agent.ask(&prompt).await?;
            println!("{}", answer);
            return Ok(());
        }
    };

    let result = catalog
        .invoke(tool, tool_args, &context)
        .await
        .ok_or_else(|| anyhow::anyhow!("Tool not registered: {}", tool))?;

    match result {
        Ok(serde_json::Value::String(text)) => println!("{}", text),
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(e) => {
            eprintln!("{}", failure_report(&e));
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Text shown for a failed invocation: the error, plus guidance when the
/// caller can fix its arguments.
fn failure_report(e: &ToolError) -> String {
    match e.guidance() {
        Some(guidance) => format!("{}\nHint: {}", e, guidance),
        None => e.to_string(),
    }
}

/// Secrets the host injects into every invocation.
fn host_context() -> ToolContext {
    let context = ToolContext::new();
    match std::env::var(STORE_KEY_SECRET) {
        Ok(key) => context.with_secret(STORE_KEY_SECRET, key),
        Err(_) => context,
    }
}

// =============================================================================
// LOGGING INITIALIZATION
// =============================================================================
/// `--verbose` overrides whatever `RUST_LOG` asked for.
fn log_directives(log_level: &str, verbose: bool) -> &str {
    if verbose {
        "debug"
    } else {
        log_level
    }
}

fn init_logging(log_level: &str, verbose: bool) -> Result<()> {
    let directives = log_directives(log_level, verbose);
    let filter = EnvFilter::try_new(directives)
        .map_err(|e| anyhow::anyhow!("Invalid log filter '{}': {}", directives, e))?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}
