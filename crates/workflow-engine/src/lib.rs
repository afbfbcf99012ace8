//! workflow-engine: Bulk-Synchronous-Parallel execution of LLM workflow graphs
//!
//! A workflow is a declarative graph of nodes and edges. Each node is backed by a
//! vertex program; the engine runs all vertices that received messages in
//! synchronized rounds (supersteps) and routes their output along edges until no
//! node has pending input.
//!
//! - `pregel`: superstep runtime, vertex contract, messages, execution record
//! - `workflow`: graph model, node index, vertex factory and built-in vertices
//! - `llm`: language-model capability (OpenAI-compatible client, mock model)
//! - `executor`: submission interface used by outer service layers
//! - `store`: workflow persistence interface and implementations
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use workflow_engine::{MockModel, NodeType, PregelConfig, WorkflowBuilder, WorkflowExecutor};
//!
//! let workflow = WorkflowBuilder::new("demo")
//!     .node("start", NodeType::Start)
//!     .node_with_prompt("summarize", NodeType::Llm, "Summarize:")
//!     .node("out", NodeType::ResultSink)
//!     .edge("start", "summarize")
//!     .edge("summarize", "out")
//!     .build()?;
//!
//! let executor = WorkflowExecutor::new(Arc::new(MockModel::new()), PregelConfig::default());
//! let report = executor.execute(workflow, Default::default()).await?;
//! println!("{}", report.results["out"]);
//! ```

pub mod executor;
pub mod llm;
pub mod pregel;
pub mod store;
pub mod workflow;

pub use executor::{ExecutionReport, ModelFactory, WorkflowExecutor, API_KEY_CONFIG_KEY};
pub use llm::{LanguageModel, LlmConfig, MockModel, OpenAiClient, ProviderError, ProviderKind};
pub use pregel::{
    BoxedVertex, ComputeContext, ErrorKind, ExecutionRecord, ExecutionStatus, Message,
    MessageContent, MessageOrder, PregelConfig, PregelError, PregelRuntime, Vertex, VertexError,
    VertexId, WorkflowResult,
};
pub use store::{
    FileWorkflowStore, MemoryWorkflowStore, StoreError, StoredWorkflow, WorkflowStore,
    WorkflowSummary,
};
pub use workflow::{
    Edge, FactoryError, GraphError, LlmVertex, Node, NodeType, PassthroughVertex, Position,
    ResultVertex, VertexFactory, VertexRegistry, Workflow, WorkflowBuilder, WorkflowIndex,
};
