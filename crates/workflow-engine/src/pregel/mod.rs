//! Pregel Runtime for Workflow Graph Execution
//!
//! This module implements a Pregel-inspired runtime for executing workflow graphs.
//! Key concepts:
//!
//! - **Vertex**: Computation unit backing a workflow node (LLM call, result sink, ...)
//! - **Superstep**: Synchronized execution round
//! - **Message**: Communication between vertices, visible one superstep later
//! - **Execution record**: Shared, lock-protected store of node statuses and results
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PregelRuntime                             │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐                     │
//! │  │Superstep│→ │Superstep│→ │Superstep│→ ...                │
//! │  │    0    │  │    1    │  │    2    │                     │
//! │  └─────────┘  └─────────┘  └─────────┘                     │
//! │       │            │            │                           │
//! │       ▼            ▼            ▼                           │
//! │  ┌─────────────────────────────────────────────────────┐   │
//! │  │ Per-Superstep: Deliver → Compute → Collect → Route  │   │
//! │  └─────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Halting
//!
//! There is no explicit vote to halt. A vertex computes in a superstep only if
//! messages were delivered to it; a superstep in which no vertex computes ends
//! the execution successfully.

pub mod config;
pub mod error;
pub mod message;
pub mod record;
pub mod runtime;
pub mod vertex;

// Re-exports
pub use config::{MessageOrder, PregelConfig};
pub use error::{ErrorKind, PregelError, VertexError};
pub use message::{result_content, Message, MessageContent, RESULT_KEY, SYSTEM_SENDER};
pub use record::{ExecutionRecord, ExecutionStatus};
pub use runtime::{PregelRuntime, WorkflowResult};
pub use vertex::{BoxedVertex, ComputeContext, Vertex, VertexId};
