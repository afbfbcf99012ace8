//! Error types for Pregel runtime
//!
//! `PregelError` is the single inspectable outcome of a failed execution.
//! It distinguishes construction failures, vertex failures and the round
//! limit, and carries the superstep and node where that is known.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::vertex::VertexId;
use crate::llm::ProviderError;
use crate::workflow::{FactoryError, GraphError, NodeType};

/// Failure returned by a vertex program's `compute`
#[derive(Debug, Error)]
pub enum VertexError {
    /// The language-model capability failed
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Any other unrecoverable failure
    #[error("{0}")]
    Failed(String),
}

impl VertexError {
    /// Create a generic failure
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Coarse classification of a `PregelError`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Invalid graph or unresolvable node type; no superstep ran
    Construction,
    /// A vertex program failed
    VertexCompute,
    /// Quiescence not reached within the superstep bound
    RoundLimitExceeded,
    /// Cancelled from outside
    Cancelled,
    /// Runtime fault such as a panicking vertex task
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Construction => "construction",
            ErrorKind::VertexCompute => "vertex_compute",
            ErrorKind::RoundLimitExceeded => "round_limit_exceeded",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Errors that can occur during Pregel runtime execution
#[derive(Debug, Error)]
pub enum PregelError {
    /// Structural problem in the workflow graph
    #[error("invalid workflow graph: {0}")]
    InvalidGraph(#[from] GraphError),

    /// The vertex factory could not build a vertex for a node
    #[error("failed to create vertex for node {node_id} (type {node_type}): {source}")]
    Construction {
        node_id: VertexId,
        node_type: NodeType,
        #[source]
        source: FactoryError,
    },

    /// A vertex's compute call failed
    #[error("error in superstep {superstep} at node {vertex_id}: {source}")]
    VertexCompute {
        superstep: usize,
        vertex_id: VertexId,
        #[source]
        source: VertexError,
    },

    /// Maximum supersteps exceeded
    #[error("execution exceeded max steps ({0})")]
    MaxSuperstepsExceeded(usize),

    /// Cancelled through the cancellation token
    #[error("execution cancelled at superstep {superstep}")]
    Cancelled { superstep: usize },

    /// A vertex task panicked or was aborted unexpectedly
    #[error("vertex task for {vertex_id} failed: {message}")]
    TaskJoin { vertex_id: VertexId, message: String },
}

impl PregelError {
    /// Create a construction error
    pub fn construction(
        node_id: impl Into<VertexId>,
        node_type: NodeType,
        source: FactoryError,
    ) -> Self {
        Self::Construction {
            node_id: node_id.into(),
            node_type,
            source,
        }
    }

    /// Create a vertex compute error
    pub fn vertex_compute(
        superstep: usize,
        vertex_id: impl Into<VertexId>,
        source: VertexError,
    ) -> Self {
        Self::VertexCompute {
            superstep,
            vertex_id: vertex_id.into(),
            source,
        }
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PregelError::InvalidGraph(_) | PregelError::Construction { .. } => {
                ErrorKind::Construction
            }
            PregelError::VertexCompute { .. } => ErrorKind::VertexCompute,
            PregelError::MaxSuperstepsExceeded(_) => ErrorKind::RoundLimitExceeded,
            PregelError::Cancelled { .. } => ErrorKind::Cancelled,
            PregelError::TaskJoin { .. } => ErrorKind::Internal,
        }
    }

    /// Superstep at which the execution failed, when known
    pub fn superstep(&self) -> Option<usize> {
        match self {
            PregelError::VertexCompute { superstep, .. } | PregelError::Cancelled { superstep } => {
                Some(*superstep)
            }
            _ => None,
        }
    }

    /// Node at which the execution failed, when known
    pub fn vertex_id(&self) -> Option<&VertexId> {
        match self {
            PregelError::Construction { node_id, .. } => Some(node_id),
            PregelError::VertexCompute { vertex_id, .. } | PregelError::TaskJoin { vertex_id, .. } => {
                Some(vertex_id)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    // Ensure errors are Send + Sync (compile-time check)
    static_assertions::assert_impl_all!(super::PregelError: Send, Sync);
    static_assertions::assert_impl_all!(super::VertexError: Send, Sync);
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_max_supersteps_display() {
        let err = PregelError::MaxSuperstepsExceeded(100);
        assert_eq!(format!("{}", err), "execution exceeded max steps (100)");
        assert_eq!(err.kind(), ErrorKind::RoundLimitExceeded);
        assert!(err.superstep().is_none());
    }

    #[test]
    fn test_vertex_compute_error() {
        let err = PregelError::vertex_compute(1, "llm", VertexError::failed("boom"));
        assert_eq!(format!("{}", err), "error in superstep 1 at node llm: boom");
        assert_eq!(err.kind(), ErrorKind::VertexCompute);
        assert_eq!(err.superstep(), Some(1));
        assert_eq!(err.vertex_id().map(VertexId::as_str), Some("llm"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_provider_error_converts_into_vertex_error() {
        let err: VertexError = ProviderError::EmptyResponse.into();
        assert!(matches!(err, VertexError::Provider(ProviderError::EmptyResponse)));
    }

    #[test]
    fn test_construction_error() {
        let tag = NodeType::Custom("WEBHOOK".into());
        let err = PregelError::construction(
            "hook",
            tag.clone(),
            FactoryError::UnknownNodeType(tag),
        );
        assert_eq!(err.kind(), ErrorKind::Construction);
        assert_eq!(err.vertex_id().map(VertexId::as_str), Some("hook"));
        let text = err.to_string();
        assert!(text.contains("hook"));
        assert!(text.contains("WEBHOOK"));
    }

    #[test]
    fn test_invalid_graph_is_construction_kind() {
        let err: PregelError = GraphError::DuplicateNode("a".into()).into();
        assert_eq!(err.kind(), ErrorKind::Construction);
        assert!(err.vertex_id().is_none());
    }

    #[test]
    fn test_cancelled_and_internal_kinds() {
        let cancelled = PregelError::Cancelled { superstep: 3 };
        assert_eq!(cancelled.kind(), ErrorKind::Cancelled);
        assert_eq!(cancelled.superstep(), Some(3));

        let join = PregelError::TaskJoin {
            vertex_id: "x".into(),
            message: "panicked".into(),
        };
        assert_eq!(join.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ErrorKind::RoundLimitExceeded).unwrap(),
            "\"round_limit_exceeded\""
        );
        assert_eq!(ErrorKind::VertexCompute.to_string(), "vertex_compute");
    }
}
