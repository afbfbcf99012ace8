//! Node, Edge and Workflow definitions
//!
//! These types mirror the JSON documents submitted by callers:
//!
//! ```json
//! {
//!   "id": "wf-1",
//!   "nodes": [
//!     {"id": "start", "type": "START", "position": {"x": 0, "y": 0}, "data": {}},
//!     {"id": "llm", "type": "LLM", "data": {"prompt": "Summarize:"}}
//!   ],
//!   "edges": [{"id": "e1", "source": "start", "target": "llm"}],
//!   "config": {"openai_api_key": "sk-..."}
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::pregel::VertexId;

/// Node data key holding the static prompt template
pub const PROMPT_KEY: &str = "prompt";

/// The type tag of a node
///
/// Serialized as an upper-case wire string. Parsing is case-insensitive for
/// the built-in tags; any other string is kept verbatim as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    /// Entry point; receives the seeded trigger message
    Start,
    /// Generic task step, executed like `Llm`
    Task,
    /// Terminal node, records results like `ResultSink`
    End,
    /// Invokes the language model
    Llm,
    /// Records incoming results
    ResultSink,
    /// Any tag without built-in behavior
    Custom(String),
}

impl NodeType {
    /// Wire representation
    pub fn as_str(&self) -> &str {
        match self {
            NodeType::Start => "START",
            NodeType::Task => "TASK",
            NodeType::End => "END",
            NodeType::Llm => "LLM",
            NodeType::ResultSink => "RESULT",
            NodeType::Custom(tag) => tag,
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, NodeType::Start)
    }
}

impl From<&str> for NodeType {
    fn from(tag: &str) -> Self {
        match tag.to_ascii_uppercase().as_str() {
            "START" => NodeType::Start,
            "TASK" => NodeType::Task,
            "END" => NodeType::End,
            "LLM" => NodeType::Llm,
            "RESULT" => NodeType::ResultSink,
            _ => NodeType::Custom(tag.to_string()),
        }
    }
}

impl From<String> for NodeType {
    fn from(tag: String) -> Self {
        NodeType::from(tag.as_str())
    }
}

impl From<NodeType> for String {
    fn from(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Custom(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Editor coordinates; carried through, never interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A node of the workflow graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: VertexId,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// Opaque configuration, e.g. `{"prompt": "..."}`
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl Node {
    /// Create a node with empty data
    pub fn new(id: impl Into<VertexId>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            node_type,
            position: None,
            data: Map::new(),
            metadata: None,
        }
    }

    /// Set a data field
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Set the prompt template
    pub fn with_prompt(self, prompt: impl Into<String>) -> Self {
        self.with_data(PROMPT_KEY, prompt.into())
    }

    /// Set editor coordinates
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Position { x, y });
        self
    }

    /// The prompt template, if `data.prompt` is a string
    pub fn prompt(&self) -> Option<&str> {
        self.data.get(PROMPT_KEY).and_then(Value::as_str)
    }
}

/// A directed edge between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(default)]
    pub id: String,
    pub source: VertexId,
    pub target: VertexId,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<VertexId>,
        target: impl Into<VertexId>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }
}

/// A workflow graph as submitted by a caller
///
/// Immutable once handed to the engine; the runtime only reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    /// Per-run string settings, e.g. a caller-supplied credential
    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

impl Workflow {
    /// Create an empty workflow
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Non-empty config value
    pub fn config_value(&self, key: &str) -> Option<&str> {
        self.config
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_type_parsing_is_case_insensitive() {
        assert_eq!(NodeType::from("START"), NodeType::Start);
        assert_eq!(NodeType::from("start"), NodeType::Start);
        assert_eq!(NodeType::from("Llm"), NodeType::Llm);
        assert_eq!(NodeType::from("result"), NodeType::ResultSink);
        assert_eq!(NodeType::from("task"), NodeType::Task);
        assert_eq!(NodeType::from("End"), NodeType::End);
        assert_eq!(
            NodeType::from("Webhook"),
            NodeType::Custom("Webhook".to_string())
        );
    }

    #[test]
    fn test_node_type_wire_strings() {
        assert_eq!(serde_json::to_value(NodeType::ResultSink).unwrap(), json!("RESULT"));
        assert_eq!(serde_json::to_value(NodeType::Llm).unwrap(), json!("LLM"));
        assert_eq!(
            serde_json::to_value(NodeType::Custom("Webhook".into())).unwrap(),
            json!("Webhook")
        );
        assert_eq!(NodeType::Start.to_string(), "START");
    }

    #[test]
    fn test_workflow_deserialization() {
        let workflow: Workflow = serde_json::from_value(json!({
            "id": "wf-1",
            "nodes": [
                {"id": "start", "type": "START", "position": {"x": 10, "y": 20}, "data": {}},
                {"id": "llm", "type": "llm", "data": {"prompt": "Summarize:"}},
                {"id": "out", "type": "RESULT", "metadata": {"color": "red"}}
            ],
            "edges": [
                {"id": "e1", "source": "start", "target": "llm"},
                {"source": "llm", "target": "out"}
            ],
            "config": {"openai_api_key": "sk-test"}
        }))
        .unwrap();

        assert_eq!(workflow.nodes.len(), 3);
        assert_eq!(workflow.nodes[0].position, Some(Position { x: 10.0, y: 20.0 }));
        assert_eq!(workflow.nodes[1].node_type, NodeType::Llm);
        assert_eq!(workflow.nodes[1].prompt(), Some("Summarize:"));
        assert!(workflow.nodes[2].data.is_empty());
        assert!(workflow.nodes[2].metadata.is_some());
        assert_eq!(workflow.edges[1].id, "");
        assert_eq!(workflow.config_value("openai_api_key"), Some("sk-test"));
    }

    #[test]
    fn test_non_string_prompt_is_ignored() {
        let node = Node::new("llm", NodeType::Llm).with_data(PROMPT_KEY, 42);
        assert!(node.prompt().is_none());
    }

    #[test]
    fn test_empty_config_value_is_absent() {
        let mut workflow = Workflow::new("wf");
        workflow.config.insert("openai_api_key".into(), String::new());
        assert!(workflow.config_value("openai_api_key").is_none());
    }

    #[test]
    fn test_node_serialization_omits_empty_optionals() {
        let node = Node::new("a", NodeType::Task).with_prompt("hi");
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value, json!({"id": "a", "type": "TASK", "data": {"prompt": "hi"}}));
    }
}
