//! Vertex factory: node type → vertex program
//!
//! The runtime never matches on node types itself. It asks a
//! [`VertexFactory`] for one vertex per node before the first superstep, so
//! new node kinds are added by registering a constructor.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use super::model::{Node, NodeType};
use super::vertices::{LlmVertex, PassthroughVertex, ResultVertex};
use crate::llm::LanguageModel;
use crate::pregel::BoxedVertex;

/// Errors raised while building a vertex for a node
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FactoryError {
    #[error("unknown node type: {0}")]
    UnknownNodeType(NodeType),
    #[error("invalid node configuration: {0}")]
    InvalidConfig(String),
}

/// Builds the vertex program for a node
pub trait VertexFactory: Send + Sync {
    fn create(&self, node: &Node) -> Result<BoxedVertex, FactoryError>;
}

impl<F> VertexFactory for F
where
    F: Fn(&Node) -> Result<BoxedVertex, FactoryError> + Send + Sync,
{
    fn create(&self, node: &Node) -> Result<BoxedVertex, FactoryError> {
        self(node)
    }
}

/// A registered constructor for one node type
pub type VertexConstructor = Arc<dyn Fn(&Node) -> Result<BoxedVertex, FactoryError> + Send + Sync>;

/// Table-driven [`VertexFactory`]
#[derive(Clone, Default)]
pub struct VertexRegistry {
    constructors: HashMap<NodeType, VertexConstructor>,
}

impl std::fmt::Debug for VertexRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.constructors.keys().map(NodeType::as_str).collect();
        types.sort_unstable();
        f.debug_struct("VertexRegistry")
            .field("node_types", &types)
            .finish()
    }
}

impl VertexRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in node types
    ///
    /// - `START` → [`PassthroughVertex`]
    /// - `TASK`, `LLM` → [`LlmVertex`] backed by `model`
    /// - `RESULT`, `END` → [`ResultVertex`]
    pub fn with_defaults(model: Arc<dyn LanguageModel>) -> Self {
        let mut registry = Self::new();
        registry.register(NodeType::Start, |_| Ok(Arc::new(PassthroughVertex) as BoxedVertex));

        let llm: BoxedVertex = Arc::new(LlmVertex::new(model));
        for node_type in [NodeType::Task, NodeType::Llm] {
            let llm = Arc::clone(&llm);
            registry.register(node_type, move |_| Ok(Arc::clone(&llm)));
        }

        for node_type in [NodeType::ResultSink, NodeType::End] {
            registry.register(node_type, |_| Ok(Arc::new(ResultVertex) as BoxedVertex));
        }
        registry
    }

    /// Register (or replace) the constructor for a node type
    pub fn register<F>(&mut self, node_type: NodeType, constructor: F) -> &mut Self
    where
        F: Fn(&Node) -> Result<BoxedVertex, FactoryError> + Send + Sync + 'static,
    {
        self.constructors.insert(node_type, Arc::new(constructor));
        self
    }

    /// Copy every constructor of `other` into this registry, replacing on conflict
    pub fn merge(&mut self, other: &VertexRegistry) -> &mut Self {
        for (node_type, constructor) in &other.constructors {
            self.constructors
                .insert(node_type.clone(), Arc::clone(constructor));
        }
        self
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl VertexFactory for VertexRegistry {
    fn create(&self, node: &Node) -> Result<BoxedVertex, FactoryError> {
        let constructor = self
            .constructors
            .get(&node.node_type)
            .ok_or_else(|| FactoryError::UnknownNodeType(node.node_type.clone()))?;
        constructor(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockModel;

    fn defaults() -> VertexRegistry {
        VertexRegistry::with_defaults(Arc::new(MockModel::new()))
    }

    #[test]
    fn test_defaults_cover_builtin_types() {
        let registry = defaults();
        for node_type in [
            NodeType::Start,
            NodeType::Task,
            NodeType::End,
            NodeType::Llm,
            NodeType::ResultSink,
        ] {
            assert!(
                registry.create(&Node::new("n", node_type.clone())).is_ok(),
                "missing {}",
                node_type
            );
        }
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_default_vertex_kinds() {
        let registry = defaults();
        let name = |t: NodeType| registry.create(&Node::new("n", t)).unwrap().name();
        assert_eq!(name(NodeType::Start), "passthrough");
        assert_eq!(name(NodeType::Llm), "llm");
        assert_eq!(name(NodeType::Task), "llm");
        assert_eq!(name(NodeType::ResultSink), "result");
        assert_eq!(name(NodeType::End), "result");
    }

    #[test]
    fn test_unknown_type_is_an_error() {
        let registry = defaults();
        let node = Node::new("hook", NodeType::Custom("WEBHOOK".into()));
        let err = registry.create(&node).err().unwrap();
        assert_eq!(
            err,
            FactoryError::UnknownNodeType(NodeType::Custom("WEBHOOK".into()))
        );
    }

    #[test]
    fn test_register_custom_type_and_merge() {
        let mut extra = VertexRegistry::new();
        extra.register(NodeType::Custom("ECHO".into()), |_| Ok(Arc::new(PassthroughVertex) as BoxedVertex));

        let mut registry = defaults();
        registry.merge(&extra);
        assert!(registry
            .create(&Node::new("e", NodeType::Custom("ECHO".into())))
            .is_ok());
        assert!(format!("{:?}", registry).contains("ECHO"));
    }

    #[test]
    fn test_constructor_can_reject_node() {
        let mut registry = VertexRegistry::new();
        registry.register(NodeType::Llm, |node| {
            if node.prompt().is_none() {
                return Err(FactoryError::InvalidConfig("prompt required".into()));
            }
            Ok(Arc::new(ResultVertex) as BoxedVertex)
        });
        let err = registry.create(&Node::new("x", NodeType::Llm)).err().unwrap();
        assert!(matches!(err, FactoryError::InvalidConfig(_)));
    }

    #[test]
    fn test_closure_is_a_factory() {
        let factory = |_: &Node| -> Result<BoxedVertex, FactoryError> { Ok(Arc::new(ResultVertex)) };
        let vertex = VertexFactory::create(&factory, &Node::new("a", NodeType::Task)).unwrap();
        assert_eq!(vertex.name(), "result");
    }
}
