//! Vertex (Node) abstractions for Pregel runtime
//!
//! A Vertex is the computation unit behind a workflow node.
//! Vertices communicate via messages and execute in synchronized supersteps.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::sync::Arc;

use super::error::VertexError;
use super::message::{Message, MessageContent};
use super::record::ExecutionRecord;
use crate::workflow::{Node, Workflow, WorkflowIndex};

/// Unique identifier for a vertex in the workflow graph
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(pub String);

impl VertexId {
    /// Create a new VertexId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VertexId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for VertexId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&VertexId> for VertexId {
    fn from(id: &VertexId) -> Self {
        id.clone()
    }
}

impl Borrow<str> for VertexId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context provided to a vertex during one superstep
///
/// Provides access to:
/// - Current superstep number
/// - The vertex's own node definition (O(1) lookup through the workflow index)
/// - The shared execution record
/// - Outbox for sending messages
///
/// A fresh context is created for every active vertex in every superstep and
/// discarded once its outbox has been routed.
pub struct ComputeContext<'a> {
    /// Current superstep number (0-indexed)
    pub superstep: usize,
    vertex_id: VertexId,
    index: &'a WorkflowIndex,
    record: &'a ExecutionRecord,
    outbox: Vec<Message>,
}

impl<'a> ComputeContext<'a> {
    /// Create a new compute context
    pub fn new(
        vertex_id: VertexId,
        superstep: usize,
        index: &'a WorkflowIndex,
        record: &'a ExecutionRecord,
    ) -> Self {
        Self {
            superstep,
            vertex_id,
            index,
            record,
            outbox: Vec::new(),
        }
    }

    /// Get the current vertex ID
    pub fn id(&self) -> &VertexId {
        &self.vertex_id
    }

    /// Read-only access to the workflow being executed
    pub fn workflow(&self) -> &'a Workflow {
        self.index.workflow()
    }

    /// This vertex's node definition
    pub fn node(&self) -> Option<&'a Node> {
        self.index.node(self.vertex_id.as_str())
    }

    /// Targets of this vertex's outgoing edges, in edge declaration order
    pub fn successors(&self) -> &'a [VertexId] {
        self.index.successors(self.vertex_id.as_str())
    }

    /// The execution record shared by all vertices of this run
    pub fn record(&self) -> &'a ExecutionRecord {
        self.record
    }

    /// Send a message to another vertex
    ///
    /// Messages will be delivered at the start of the next superstep.
    pub fn send_message(&mut self, target: impl Into<VertexId>, content: MessageContent) {
        self.outbox
            .push(Message::new(self.vertex_id.clone(), target, content));
    }

    /// Send the same content along every outgoing edge
    pub fn send_to_successors(&mut self, content: MessageContent) {
        for target in self.successors() {
            self.send_message(target, content.clone());
        }
    }

    /// Check if this is the first superstep
    pub fn is_first_superstep(&self) -> bool {
        self.superstep == 0
    }

    /// Messages emitted so far in this superstep
    pub fn outbox(&self) -> &[Message] {
        &self.outbox
    }

    /// Consume the context and return the outbox
    pub fn into_outbox(self) -> Vec<Message> {
        self.outbox
    }
}

/// The core vertex trait for Pregel computation
///
/// Each node type plugs into the runtime through an implementation of this
/// trait. `compute` is called once per superstep in which the vertex has
/// incoming messages; a vertex with an empty inbox is simply not called.
///
/// # Example
///
/// ```ignore
/// struct EchoVertex;
///
/// #[async_trait]
/// impl Vertex for EchoVertex {
///     async fn compute(
///         &self,
///         ctx: &mut ComputeContext<'_>,
///         messages: &[Message],
///     ) -> Result<(), VertexError> {
///         for msg in messages {
///             ctx.send_to_successors(msg.content.clone());
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Vertex: Send + Sync {
    /// Execute the vertex's computation for one superstep
    ///
    /// `messages` are the messages emitted to this vertex during the previous
    /// superstep. Returning an error aborts the whole execution.
    async fn compute(
        &self,
        ctx: &mut ComputeContext<'_>,
        messages: &[Message],
    ) -> Result<(), VertexError>;

    /// Short name used in logs
    fn name(&self) -> &'static str {
        "vertex"
    }
}

/// Shared vertex for dynamic dispatch
pub type BoxedVertex = Arc<dyn Vertex>;
