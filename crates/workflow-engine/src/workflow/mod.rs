//! Workflow Graph Model and Vertex Programs
//!
//! This module provides the declarative side of the engine: the graph a caller
//! submits, the index built from it once per execution, and the mapping from
//! node types to vertex programs.
//!
//! # Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Workflow                              │
//! │  ┌─────────┐      ┌─────────┐      ┌─────────┐              │
//! │  │  START  │ ───→ │   LLM   │ ───→ │ RESULT  │              │
//! │  └─────────┘      └─────────┘      └─────────┘              │
//! │                                                              │
//! │  Index via WorkflowIndex (O(1) node lookup, successors)      │
//! │  Instantiate via VertexFactory / VertexRegistry              │
//! │  Execute via PregelRuntime                                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use workflow_engine::workflow::{NodeType, WorkflowBuilder};
//!
//! let workflow = WorkflowBuilder::new("summarize")
//!     .node("start", NodeType::Start)
//!     .node_with_prompt("llm", NodeType::Llm, "Summarize:")
//!     .node("out", NodeType::ResultSink)
//!     .edge("start", "llm")
//!     .edge("llm", "out")
//!     .build()?;
//! ```

pub mod factory;
pub mod graph;
pub mod model;
pub mod vertices;
pub mod visualization;

pub use factory::{FactoryError, VertexConstructor, VertexFactory, VertexRegistry};
pub use graph::{GraphError, WorkflowBuilder, WorkflowIndex};
pub use model::{Edge, Node, NodeType, Position, Workflow, PROMPT_KEY};
pub use vertices::{LlmVertex, PassthroughVertex, ResultVertex};
