//! # Subcommand Implementations
//!
//! Each CLI subcommand is a plain async function over the engine and the
//! store, so it can be tested without parsing arguments or touching stdout.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use workflow_engine::{
    ExecutionReport, LanguageModel, MessageOrder, OpenAiClient, PregelError, ProviderKind,
    StoredWorkflow, Workflow, WorkflowExecutor, WorkflowStore, WorkflowSummary,
    API_KEY_CONFIG_KEY,
};

use crate::config::Config;

// =============================================================================
// RUN OPTIONS
// =============================================================================
/// Per-run flags shared by `run` and `run-saved`
#[derive(clap::Args, Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    /// Credential for this run only; takes precedence over LLM_API_KEY
    #[arg(long = "api-key", value_name = "KEY")]
    pub api_key: Option<String>,

    /// Superstep bound (overrides MAX_SUPERSTEPS)
    #[arg(long = "max-supersteps", value_name = "N")]
    pub max_supersteps: Option<usize>,

    /// Concurrent vertex computations per superstep (overrides WORKFLOW_PARALLELISM)
    #[arg(long = "parallelism", value_name = "N")]
    pub parallelism: Option<usize>,

    /// Deliver each inbox sorted by sender ID
    #[arg(long = "sort-by-sender")]
    pub sort_by_sender: bool,

    /// Use the offline mock model instead of the configured provider
    #[arg(long = "mock")]
    pub mock: bool,
}

impl RunOptions {
    /// Fold the flags into a copy of the loaded configuration
    pub fn apply(&self, config: &Config) -> Config {
        let mut config = config.clone();

        if self.mock {
            config.llm.provider = ProviderKind::Mock;
        }
        if config.llm.api_key.is_none() {
            config.llm.api_key = self.api_key.clone();
        }
        if let Some(max) = self.max_supersteps {
            config.engine.max_supersteps = max;
        }
        if let Some(parallelism) = self.parallelism {
            config.engine = config.engine.with_parallelism(parallelism);
        }
        if self.sort_by_sender {
            config.engine = config.engine.with_message_order(MessageOrder::BySender);
        }
        config
    }

    /// Workflow config overrides for this execution
    pub fn overrides(&self) -> BTreeMap<String, String> {
        self.api_key
            .iter()
            .map(|key| (API_KEY_CONFIG_KEY.to_string(), key.clone()))
            .collect()
    }
}

// =============================================================================
// WORKFLOW FILES
// =============================================================================
/// Read and parse a workflow JSON document
pub async fn load_workflow(path: &Path) -> Result<Workflow> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read workflow file {}", path.display()))?;
    let workflow: Workflow = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid workflow JSON in {}", path.display()))?;
    workflow
        .validate()
        .with_context(|| format!("Invalid workflow graph in {}", path.display()))?;
    Ok(workflow)
}

/// Mermaid diagram for a workflow file
pub async fn graph(path: &Path) -> Result<String> {
    Ok(load_workflow(path).await?.to_mermaid())
}

// =============================================================================
// EXECUTION
// =============================================================================
/// Build an executor for the configured provider
///
/// With the OpenAI provider, a per-run credential in the workflow config
/// gets its own client sharing every other provider setting.
pub fn build_executor(config: &Config) -> Result<WorkflowExecutor> {
    let model = config
        .llm
        .build_model()
        .context("Failed to initialise the language model")?;
    let executor = WorkflowExecutor::new(model, config.engine.clone());

    if config.llm.provider != ProviderKind::OpenAi {
        return Ok(executor);
    }

    let llm = config.llm.clone();
    Ok(executor.with_model_factory(move |api_key| {
        Arc::new(
            OpenAiClient::new(api_key)
                .with_model(llm.model.clone())
                .with_base_url(llm.base_url.clone())
                .with_max_tokens(llm.max_tokens)
                .with_timeout(llm.timeout),
        ) as Arc<dyn LanguageModel>
    }))
}

/// Execute a workflow; Ctrl-C cancels the execution
///
/// Credentials resolve as LLM_API_KEY, then `--api-key`, then the
/// workflow's own `openai_api_key`.
pub async fn run(config: &Config, workflow: Workflow, options: &RunOptions) -> Result<ExecutionReport> {
    let mut config = options.apply(config);
    let has_key = config.llm.api_key.as_deref().is_some_and(|key| !key.is_empty());
    if !has_key {
        if let Some(key) = workflow.config_value(API_KEY_CONFIG_KEY) {
            config.llm.api_key = Some(key.to_string());
        }
    }
    config.validate()?;

    info!(
        workflow_id = %workflow.id,
        provider = %config.llm.provider,
        model = %config.llm.model,
        max_supersteps = config.engine.max_supersteps,
        "Executing workflow"
    );

    let executor = build_executor(&config)?;
    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, cancelling execution");
                cancel.cancel();
            }
        })
    };

    let outcome = executor
        .execute_with_cancellation(workflow, options.overrides(), cancel)
        .await;
    interrupt.abort();

    Ok(outcome?)
}

/// Execute a stored workflow
pub async fn run_saved(
    config: &Config,
    store: &dyn WorkflowStore,
    id: &str,
    options: &RunOptions,
) -> Result<ExecutionReport> {
    let stored = store
        .get(id)
        .await
        .with_context(|| format!("Failed to load workflow '{}'", id))?;
    run(config, stored.definition, options).await
}

/// One-line structured description of a failure for stderr
///
/// Engine errors report their kind and, when known, the superstep and node.
pub fn describe_failure(err: &anyhow::Error) -> String {
    let pregel = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<PregelError>());

    let Some(pregel) = pregel else {
        return format!("error: {:#}", err);
    };

    let mut line = format!("error kind={}", pregel.kind());
    if let Some(superstep) = pregel.superstep() {
        let _ = write!(line, " superstep={}", superstep);
    }
    if let Some(node) = pregel.vertex_id() {
        let _ = write!(line, " node={}", node);
    }
    let _ = write!(line, ": {}", pregel);
    line
}

// =============================================================================
// STORE
// =============================================================================
/// Store a workflow file; the ID defaults to the workflow's own ID
pub async fn save(
    store: &dyn WorkflowStore,
    path: &Path,
    name: &str,
    id: Option<&str>,
) -> Result<StoredWorkflow> {
    let workflow = load_workflow(path).await?;
    let id = match id {
        Some(id) => id.to_string(),
        None if !workflow.id.is_empty() => workflow.id.clone(),
        None => anyhow::bail!("Workflow in {} has no id; pass --id", path.display()),
    };

    let stored = store
        .save(&id, name, &workflow)
        .await
        .with_context(|| format!("Failed to save workflow '{}'", id))?;
    info!(workflow_id = %stored.id, name = %stored.name, "Workflow saved");
    Ok(stored)
}

/// Render stored workflows as an aligned table
pub fn format_summaries(summaries: &[WorkflowSummary]) -> String {
    if summaries.is_empty() {
        return "No saved workflows.\n".to_string();
    }

    let id_width = summaries.iter().map(|s| s.id.len()).max().unwrap_or(0).max(2);
    let name_width = summaries.iter().map(|s| s.name.len()).max().unwrap_or(0).max(4);

    let mut out = format!(
        "{:<id_width$}  {:<name_width$}  {:>5}  {}\n",
        "ID", "NAME", "NODES", "UPDATED"
    );
    for summary in summaries {
        let _ = writeln!(
            out,
            "{:<id_width$}  {:<name_width$}  {:>5}  {}",
            summary.id,
            summary.name,
            summary.node_count,
            summary.updated_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    out
}
