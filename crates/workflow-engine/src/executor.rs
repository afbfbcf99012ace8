//! Submission interface
//!
//! `WorkflowExecutor` is what an outer service layer (HTTP handler, CLI)
//! calls: it takes a workflow plus per-request overrides, wires the vertex
//! registry for this execution, runs the superstep scheduler and returns the
//! results or a structured [`PregelError`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::llm::LanguageModel;
use crate::pregel::{BoxedVertex, ExecutionStatus, PregelConfig, PregelError, PregelRuntime};
use crate::workflow::{FactoryError, Node, NodeType, VertexRegistry, Workflow};

/// Workflow config key carrying a caller-supplied provider credential
pub const API_KEY_CONFIG_KEY: &str = "openai_api_key";

/// Builds a model from a caller-supplied credential
pub type ModelFactory = Arc<dyn Fn(&str) -> Arc<dyn LanguageModel> + Send + Sync>;

/// Outcome of a successful execution
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    pub workflow_id: String,
    pub execution_id: Uuid,
    /// Node ID → recorded result
    pub results: BTreeMap<String, Value>,
    /// Node ID → final status
    pub statuses: BTreeMap<String, ExecutionStatus>,
    /// Superstep at which quiescence was reached
    pub supersteps: usize,
    pub vertices_computed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Executes workflows against a default language model
#[derive(Clone)]
pub struct WorkflowExecutor {
    default_model: Arc<dyn LanguageModel>,
    config: PregelConfig,
    model_factory: Option<ModelFactory>,
    extensions: VertexRegistry,
}

impl std::fmt::Debug for WorkflowExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowExecutor")
            .field("default_model", &self.default_model.name())
            .field("config", &self.config)
            .field("model_factory", &self.model_factory.is_some())
            .field("extensions", &self.extensions)
            .finish()
    }
}

impl WorkflowExecutor {
    pub fn new(default_model: Arc<dyn LanguageModel>, config: PregelConfig) -> Self {
        Self {
            default_model,
            config,
            model_factory: None,
            extensions: VertexRegistry::new(),
        }
    }

    /// Build per-execution models from a credential found under
    /// [`API_KEY_CONFIG_KEY`] in the workflow config
    pub fn with_model_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&str) -> Arc<dyn LanguageModel> + Send + Sync + 'static,
    {
        self.model_factory = Some(Arc::new(factory));
        self
    }

    /// Register a vertex constructor for a node type, replacing any built-in one
    pub fn with_vertex<F>(mut self, node_type: NodeType, constructor: F) -> Self
    where
        F: Fn(&Node) -> Result<BoxedVertex, FactoryError> + Send + Sync + 'static,
    {
        self.extensions.register(node_type, constructor);
        self
    }

    pub fn config(&self) -> &PregelConfig {
        &self.config
    }

    /// Execute a workflow to completion
    ///
    /// `overrides` are merged into the workflow's config for this execution
    /// only; an override wins over a value already in the workflow.
    pub async fn execute(
        &self,
        workflow: Workflow,
        overrides: BTreeMap<String, String>,
    ) -> Result<ExecutionReport, PregelError> {
        self.execute_with_cancellation(workflow, overrides, CancellationToken::new())
            .await
    }

    /// Execute a workflow, aborting when `cancel` fires
    pub async fn execute_with_cancellation(
        &self,
        mut workflow: Workflow,
        overrides: BTreeMap<String, String>,
        cancel: CancellationToken,
    ) -> Result<ExecutionReport, PregelError> {
        workflow.config.extend(overrides);

        let registry = self.registry_for(&workflow);
        let started_at = Utc::now();
        let runtime = PregelRuntime::build(Arc::new(workflow), &registry, self.config.clone())?;
        let record = Arc::new(runtime.new_record());

        let outcome = runtime
            .run_with_cancellation(Arc::clone(&record), cancel)
            .await?;

        let report = ExecutionReport {
            workflow_id: record.workflow_id().to_string(),
            execution_id: record.execution_id(),
            results: record.results().await,
            statuses: record.statuses().await,
            supersteps: outcome.supersteps,
            vertices_computed: outcome.vertices_computed,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            workflow_id = %report.workflow_id,
            execution_id = %report.execution_id,
            supersteps = report.supersteps,
            results = report.results.len(),
            "Workflow execution finished"
        );
        Ok(report)
    }

    /// Default vertices backed by this execution's model, plus registered extensions
    fn registry_for(&self, workflow: &Workflow) -> VertexRegistry {
        let model = match (workflow.config_value(API_KEY_CONFIG_KEY), &self.model_factory) {
            (Some(api_key), Some(factory)) => {
                debug!(workflow_id = %workflow.id, "Using caller-supplied credential");
                factory(api_key)
            }
            _ => Arc::clone(&self.default_model),
        };

        let mut registry = VertexRegistry::with_defaults(model);
        registry.merge(&self.extensions);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{MockModel, ProviderError};
    use crate::pregel::ErrorKind;
    use crate::workflow::{ResultVertex, WorkflowBuilder};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Answers with the credential it was built from
    struct KeyedModel {
        key: String,
    }

    #[async_trait]
    impl LanguageModel for KeyedModel {
        async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
            Ok(format!("answered with {}", self.key))
        }

        fn name(&self) -> &str {
            "keyed"
        }
    }

    fn summarize_workflow() -> Workflow {
        WorkflowBuilder::new("summarize")
            .node("start", NodeType::Start)
            .node_with_prompt("llm", NodeType::Llm, "Summarize:")
            .node("out", NodeType::ResultSink)
            .edge("start", "llm")
            .edge("llm", "out")
            .build()
            .unwrap()
    }

    fn executor() -> WorkflowExecutor {
        WorkflowExecutor::new(Arc::new(MockModel::new()), PregelConfig::default())
    }

    #[tokio::test]
    async fn test_execute_with_default_model() {
        let report = executor()
            .execute(summarize_workflow(), BTreeMap::new())
            .await
            .unwrap();

        assert_eq!(report.workflow_id, "summarize");
        assert_eq!(report.supersteps, 3);
        assert_eq!(report.vertices_computed, 3);
        assert_eq!(
            report.results["out"],
            json!({"result": "[MOCK] Response to: Summarize:"})
        );
        assert_eq!(report.results["llm"]["debug_prompt"], json!("Summarize:"));
        assert!(!report.results.contains_key("start"));
        assert!(report
            .statuses
            .values()
            .all(|s| *s == ExecutionStatus::Succeeded));
        assert!(report.finished_at >= report.started_at);
    }

    #[tokio::test]
    async fn test_override_key_selects_model() {
        let seen_keys = Arc::new(Mutex::new(Vec::new()));
        let keys = Arc::clone(&seen_keys);
        let executor = executor().with_model_factory(move |key| {
            keys.lock().unwrap().push(key.to_string());
            Arc::new(KeyedModel { key: key.to_string() }) as Arc<dyn LanguageModel>
        });

        let mut workflow = summarize_workflow();
        workflow
            .config
            .insert(API_KEY_CONFIG_KEY.to_string(), "sk-workflow".to_string());
        let overrides = BTreeMap::from([(API_KEY_CONFIG_KEY.to_string(), "sk-request".to_string())]);

        let report = executor.execute(workflow, overrides).await.unwrap();
        assert_eq!(report.results["out"], json!({"result": "answered with sk-request"}));
        assert_eq!(*seen_keys.lock().unwrap(), vec!["sk-request"]);
    }

    #[tokio::test]
    async fn test_override_ignored_without_factory() {
        let overrides = BTreeMap::from([(API_KEY_CONFIG_KEY.to_string(), "sk-request".to_string())]);
        let report = executor()
            .execute(summarize_workflow(), overrides)
            .await
            .unwrap();
        assert!(report.results["out"]["result"]
            .as_str()
            .unwrap()
            .starts_with("[MOCK]"));
    }

    #[tokio::test]
    async fn test_empty_override_key_uses_default_model() {
        let executor = executor().with_model_factory(|key| {
            Arc::new(KeyedModel { key: key.to_string() }) as Arc<dyn LanguageModel>
        });
        let overrides = BTreeMap::from([(API_KEY_CONFIG_KEY.to_string(), String::new())]);
        let report = executor
            .execute(summarize_workflow(), overrides)
            .await
            .unwrap();
        assert!(report.results["out"]["result"]
            .as_str()
            .unwrap()
            .starts_with("[MOCK]"));
    }

    #[tokio::test]
    async fn test_unknown_node_type_is_construction_error() {
        let workflow = WorkflowBuilder::new("custom")
            .node("start", NodeType::Start)
            .node("hook", NodeType::Custom("WEBHOOK".into()))
            .edge("start", "hook")
            .build()
            .unwrap();

        let err = executor()
            .execute(workflow, BTreeMap::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Construction);
        assert_eq!(err.vertex_id().map(|v| v.as_str()), Some("hook"));
    }

    #[tokio::test]
    async fn test_registered_custom_vertex() {
        let workflow = WorkflowBuilder::new("custom")
            .node("start", NodeType::Start)
            .node("hook", NodeType::Custom("WEBHOOK".into()))
            .edge("start", "hook")
            .build()
            .unwrap();

        let executor = executor().with_vertex(NodeType::Custom("WEBHOOK".into()), |_| {
            Ok(Arc::new(ResultVertex) as BoxedVertex)
        });
        let report = executor.execute(workflow, BTreeMap::new()).await.unwrap();
        assert_eq!(report.results["hook"], json!({"type": "trigger"}));
        assert!(format!("{:?}", executor).contains("WEBHOOK"));
    }

    #[tokio::test]
    async fn test_cancelled_execution() {
        let token = CancellationToken::new();
        token.cancel();
        let err = executor()
            .execute_with_cancellation(summarize_workflow(), BTreeMap::new(), token)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn test_report_serializes() {
        let report = ExecutionReport {
            workflow_id: "wf".into(),
            execution_id: Uuid::nil(),
            results: BTreeMap::from([("out".to_string(), json!({"result": "x"}))]),
            statuses: BTreeMap::from([("out".to_string(), ExecutionStatus::Succeeded)]),
            supersteps: 2,
            vertices_computed: 2,
            started_at: Utc::now(),
            finished_at: Utc::now(),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["statuses"]["out"], json!("SUCCESS"));
        assert_eq!(value["execution_id"], json!("00000000-0000-0000-0000-000000000000"));
    }
}
