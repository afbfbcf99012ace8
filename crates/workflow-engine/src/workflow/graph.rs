//! Graph validation, node index and builder DSL.
//!
//! `WorkflowIndex` is built once per execution and gives vertices O(1)
//! access to their node definition and outgoing edges. `WorkflowBuilder`
//! provides a fluent API for assembling a validated `Workflow` in code.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;

use super::model::{Edge, Node, NodeType, Workflow};
use crate::pregel::VertexId;

/// Structural errors in a workflow graph.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("node id must not be empty")]
    EmptyNodeId,
    #[error("duplicate node id: {0}")]
    DuplicateNode(String),
    #[error("edge {edge_id} references unknown source node {node_id}")]
    UnknownSource { edge_id: String, node_id: String },
    #[error("edge {edge_id} references unknown target node {node_id}")]
    UnknownTarget { edge_id: String, node_id: String },
}

/// ID-indexed view of a workflow
#[derive(Debug, Clone)]
pub struct WorkflowIndex {
    workflow: Arc<Workflow>,
    positions: HashMap<VertexId, usize>,
    successors: HashMap<VertexId, Vec<VertexId>>,
    start_nodes: Vec<VertexId>,
}

impl WorkflowIndex {
    /// Validate the workflow and index it
    pub fn build(workflow: Arc<Workflow>) -> Result<Self, GraphError> {
        let (positions, successors) = index_edges(&workflow)?;

        let start_nodes = workflow
            .nodes
            .iter()
            .filter(|n| n.node_type.is_start())
            .map(|n| n.id.clone())
            .collect();

        Ok(Self {
            workflow,
            positions,
            successors,
            start_nodes,
        })
    }

    /// The indexed workflow
    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    /// Look up a node by ID
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.positions.get(id).map(|&i| &self.workflow.nodes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Targets of a node's outgoing edges, one entry per edge, in edge order
    pub fn successors(&self, id: &str) -> &[VertexId] {
        self.successors.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Nodes typed START, in declaration order
    pub fn start_nodes(&self) -> &[VertexId] {
        &self.start_nodes
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl Workflow {
    /// Check node IDs and edge endpoints
    pub fn validate(&self) -> Result<(), GraphError> {
        index_edges(self).map(|_| ())
    }
}

type Positions = HashMap<VertexId, usize>;
type Successors = HashMap<VertexId, Vec<VertexId>>;

/// Map node IDs to declaration positions and sources to edge targets,
/// rejecting empty or duplicate IDs and dangling edge endpoints
fn index_edges(workflow: &Workflow) -> Result<(Positions, Successors), GraphError> {
    let mut positions = HashMap::with_capacity(workflow.nodes.len());
    for (i, node) in workflow.nodes.iter().enumerate() {
        if node.id.as_str().is_empty() {
            return Err(GraphError::EmptyNodeId);
        }
        if positions.insert(node.id.clone(), i).is_some() {
            return Err(GraphError::DuplicateNode(node.id.to_string()));
        }
    }

    let mut successors: Successors = HashMap::new();
    for edge in &workflow.edges {
        if !positions.contains_key(&edge.source) {
            return Err(GraphError::UnknownSource {
                edge_id: edge.id.clone(),
                node_id: edge.source.to_string(),
            });
        }
        if !positions.contains_key(&edge.target) {
            return Err(GraphError::UnknownTarget {
                edge_id: edge.id.clone(),
                node_id: edge.target.to_string(),
            });
        }
        successors
            .entry(edge.source.clone())
            .or_default()
            .push(edge.target.clone());
    }

    Ok((positions, successors))
}

/// Builder for constructing workflows with a fluent API.
#[derive(Debug, Clone, Default)]
pub struct WorkflowBuilder {
    id: String,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    config: BTreeMap<String, String>,
}

impl WorkflowBuilder {
    /// Create a new workflow builder.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Add a node with empty data.
    pub fn node(self, id: impl Into<VertexId>, node_type: NodeType) -> Self {
        self.add_node(Node::new(id, node_type))
    }

    /// Add a node with a prompt template.
    pub fn node_with_prompt(
        self,
        id: impl Into<VertexId>,
        node_type: NodeType,
        prompt: impl Into<String>,
    ) -> Self {
        self.add_node(Node::new(id, node_type).with_prompt(prompt))
    }

    /// Add a node with arbitrary data.
    pub fn node_with_data(
        self,
        id: impl Into<VertexId>,
        node_type: NodeType,
        data: Map<String, Value>,
    ) -> Self {
        let mut node = Node::new(id, node_type);
        node.data = data;
        self.add_node(node)
    }

    /// Add a fully specified node.
    pub fn add_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Add an edge; IDs are assigned as `e1`, `e2`, ...
    pub fn edge(mut self, source: impl Into<VertexId>, target: impl Into<VertexId>) -> Self {
        let id = format!("e{}", self.edges.len() + 1);
        self.edges.push(Edge::new(id, source, target));
        self
    }

    /// Set a config entry.
    pub fn config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Validate and build the workflow.
    pub fn build(self) -> Result<Workflow, GraphError> {
        let workflow = Workflow {
            id: self.id,
            nodes: self.nodes,
            edges: self.edges,
            config: self.config,
        };
        workflow.validate()?;
        Ok(workflow)
    }
}
