//! Message types for Pregel vertex communication
//!
//! Vertices communicate by sending messages to each other.
//! A message emitted during superstep `r` is delivered at the start of `r + 1`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::vertex::VertexId;

/// Opaque message payload: string keys to arbitrary JSON values
pub type MessageContent = serde_json::Map<String, Value>;

/// Sender identity used for the synthetic trigger messages seeded into start nodes
pub const SYSTEM_SENDER: &str = "system";

/// Payload key carrying a vertex's output
pub const RESULT_KEY: &str = "result";

const TYPE_KEY: &str = "type";
const TRIGGER_TYPE: &str = "trigger";

/// A message travelling along an edge between two vertices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub from: VertexId,
    pub to: VertexId,
    pub content: MessageContent,
}

impl Message {
    /// Create a message
    pub fn new(from: impl Into<VertexId>, to: impl Into<VertexId>, content: MessageContent) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            content,
        }
    }

    /// The `{type: "trigger"}` message that activates a start node in superstep 0
    pub fn trigger(to: impl Into<VertexId>) -> Self {
        let mut content = MessageContent::new();
        content.insert(TYPE_KEY.to_string(), Value::String(TRIGGER_TYPE.to_string()));
        Self::new(SYSTEM_SENDER, to, content)
    }

    /// Whether this is a seeded trigger message
    pub fn is_trigger(&self) -> bool {
        self.from.as_str() == SYSTEM_SENDER
            && self.content.get(TYPE_KEY).and_then(Value::as_str) == Some(TRIGGER_TYPE)
    }

    /// Look up a payload field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.content.get(key)
    }

    /// The `result` field, if present
    pub fn result(&self) -> Option<&Value> {
        self.get(RESULT_KEY)
    }
}

/// Build a `{result: value}` payload
pub fn result_content(value: impl Into<Value>) -> MessageContent {
    let mut content = MessageContent::new();
    content.insert(RESULT_KEY.to_string(), value.into());
    content
}
