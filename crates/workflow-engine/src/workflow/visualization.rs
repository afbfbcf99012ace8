//! Mermaid diagram generation for workflows
//!
//! # Node Shapes
//!
//! | NodeType     | Shape         | Mermaid Syntax   |
//! |--------------|---------------|------------------|
//! | START / END  | Stadium       | `id([label])`    |
//! | LLM / TASK   | Rectangle     | `id[label]`      |
//! | RESULT       | Subroutine    | `id[[label]]`    |
//! | custom       | Hexagon       | `id{{label}}`    |

use std::fmt::Write;

use super::model::{Node, NodeType, Workflow};
use crate::pregel::VertexId;

/// Sanitize a node ID for use as a Mermaid node identifier.
///
/// Mermaid node IDs must be alphanumeric (plus underscores); anything else
/// becomes an underscore. `end` is reserved by Mermaid and gets a suffix.
pub fn sanitize_id(id: &str) -> String {
    let safe: String = id
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if safe.eq_ignore_ascii_case("end") {
        format!("{}_node", safe)
    } else {
        safe
    }
}

/// Render a node declaration with the shape for its type.
pub fn render_node(node: &Node) -> String {
    let safe_id = sanitize_id(node.id.as_str());
    let label = node.id.as_str();

    match &node.node_type {
        NodeType::Start | NodeType::End => format!("    {}([{}])", safe_id, label),
        NodeType::Llm | NodeType::Task => format!("    {}[{}]", safe_id, label),
        NodeType::ResultSink => format!("    {}[[{}]]", safe_id, label),
        NodeType::Custom(tag) => format!("    {}{{{{{}: {}}}}}", safe_id, label, tag),
    }
}

/// Render an edge between two nodes.
pub fn render_edge(from: &VertexId, to: &VertexId) -> String {
    format!(
        "    {} --> {}",
        sanitize_id(from.as_str()),
        sanitize_id(to.as_str())
    )
}

impl Workflow {
    /// Generate a Mermaid flowchart of the workflow structure.
    ///
    /// # Example Output
    ///
    /// ```text
    /// graph TD
    ///     start([start])
    ///     llm[llm]
    ///     out[[out]]
    ///
    ///     start --> llm
    ///     llm --> out
    /// ```
    pub fn to_mermaid(&self) -> String {
        let mut output = String::from("graph TD\n");

        for node in &self.nodes {
            // Writing to a String cannot fail.
            let _ = writeln!(output, "{}", render_node(node));
        }

        output.push('\n');

        for edge in &self.edges {
            let _ = writeln!(output, "{}", render_edge(&edge.source, &edge.target));
        }

        output
    }
}
