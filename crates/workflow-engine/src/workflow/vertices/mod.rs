//! Vertex implementations for the built-in node types
//!
//! # Available Vertices
//!
//! - [`llm::LlmVertex`]: composes a prompt, calls the language model, forwards the result
//! - [`result::ResultVertex`]: records incoming payloads; terminal
//! - [`passthrough::PassthroughVertex`]: forwards payloads along outgoing edges

pub mod llm;
pub mod passthrough;
pub mod result;

pub use llm::{compose_prompt, LlmVertex, CONTEXT_SEPARATOR, DEFAULT_PROMPT};
pub use passthrough::PassthroughVertex;
pub use result::ResultVertex;
