//! # Workflow Platform
//!
//! Command-line front end for the `workflow-engine` crate: runs LLM workflow
//! graphs on the superstep engine and manages a directory of saved workflows.
//!
//! ## Quick Start
//! ```bash
//! cargo run -- run demos/summarize.json --mock
//! ```

// =============================================================================
// MODULE DECLARATIONS
// =============================================================================

/// Configuration management
mod config;

/// Subcommand implementations
mod commands;

// =============================================================================
// IMPORTS
// =============================================================================
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use workflow_engine::{FileWorkflowStore, WorkflowStore};

use crate::commands::RunOptions;
use crate::config::Config;

// =============================================================================
// CLI ARGUMENTS
// =============================================================================
#[derive(Parser, Debug)]
#[command(
    name = "workflow-platform",
    version,
    about = "Execute LLM workflow graphs with a bulk-synchronous-parallel engine",
    long_about = r#"
Workflow Platform - run declarative LLM workflows from the command line.

A workflow is a JSON graph of nodes (START, LLM, TASK, RESULT, END) and
edges. Nodes run in synchronized supersteps; each node's output reaches
its successors in the next superstep.

CONFIGURATION (environment or .env):
  LLM_PROVIDER        openai | mock (default: openai)
  LLM_API_KEY         provider credential
  LLM_MODEL           model name (default: gpt-4)
  MAX_SUPERSTEPS      superstep bound (default: 100)
  WORKFLOW_STORE_DIR  saved workflow directory (default: ./workflows)

EXAMPLES:
  # Run a workflow file offline
  workflow-platform run summarize.json --mock

  # Save it, then run the saved copy with a per-run key
  workflow-platform save summarize.json --name "Summarizer"
  workflow-platform run-saved summarize --api-key sk-...

  # Print a Mermaid diagram
  workflow-platform graph summarize.json
"#
)]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    /// Directory holding saved workflows (overrides WORKFLOW_STORE_DIR)
    #[arg(long = "store-dir", value_name = "DIR", global = true, env = "WORKFLOW_STORE_DIR")]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute a workflow JSON file and print the results
    Run {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        options: RunOptions,
    },

    /// Execute a saved workflow
    RunSaved {
        #[arg(value_name = "ID")]
        id: String,

        #[command(flatten)]
        options: RunOptions,
    },

    /// Save a workflow file to the store
    Save {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Display name
        #[arg(long = "name")]
        name: String,

        /// Store ID (defaults to the workflow's id)
        #[arg(long = "id")]
        id: Option<String>,
    },

    /// List saved workflows, most recently updated first
    List,

    /// Print a saved workflow as JSON
    Show {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Print the Mermaid diagram of a workflow file
    Graph {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

// =============================================================================
// MAIN FUNCTION
// =============================================================================
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(dir) = &cli.store_dir {
        config.store_dir = dir.clone();
    }

    init_logging(cli.verbose, config.log_filter.as_deref())?;

    match dispatch(cli.command, &config).await {
        Ok(output) => {
            print!("{}", output);
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("{}", commands::describe_failure(&e));
            Err(e)
        }
    }
}

/// Run one subcommand and return what it prints on stdout
async fn dispatch(command: Command, config: &Config) -> Result<String> {
    let store = FileWorkflowStore::new(&config.store_dir);

    match command {
        Command::Run { file, options } => {
            let workflow = commands::load_workflow(&file).await?;
            let report = commands::run(config, workflow, &options).await?;
            to_json(&report)
        }
        Command::RunSaved { id, options } => {
            let report = commands::run_saved(config, &store, &id, &options).await?;
            to_json(&report)
        }
        Command::Save { file, name, id } => {
            let stored = commands::save(&store, &file, &name, id.as_deref()).await?;
            info!(path = %store.dir().display(), "Store updated");
            Ok(format!("Saved workflow '{}' ({})\n", stored.id, stored.name))
        }
        Command::List => {
            let summaries = store
                .list()
                .await
                .context("Failed to list saved workflows")?;
            Ok(commands::format_summaries(&summaries))
        }
        Command::Show { id } => {
            let stored = store
                .get(&id)
                .await
                .with_context(|| format!("Failed to load workflow '{}'", id))?;
            to_json(&stored)
        }
        Command::Graph { file } => commands::graph(&file).await,
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    json.push('\n');
    Ok(json)
}

// =============================================================================
// LOGGING INITIALIZATION
// =============================================================================
/// Install the global tracing subscriber.
///
/// Logs go to stderr so stdout carries only command output. `--verbose`
/// wins over `RUST_LOG`; without either the level is INFO.
fn init_logging(verbose: bool, filter: Option<&str>) -> Result<()> {
    let directive = match (verbose, filter) {
        (true, _) => "debug",
        (false, Some(filter)) => filter,
        (false, None) => "info",
    };
    let env_filter = EnvFilter::try_new(directive)
        .with_context(|| format!("Invalid log filter '{}'", directive))?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}
