//! LlmVertex: language-model node
//!
//! Composes a prompt from the node's template and the `result` of every
//! incoming message, calls the injected [`LanguageModel`], records
//! `{result, debug_prompt, timestamp}` and forwards `{result}` along every
//! outgoing edge. A provider failure aborts the execution; there is no retry.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::llm::LanguageModel;
use crate::pregel::{result_content, ComputeContext, Message, Vertex, VertexError};
use crate::workflow::Node;

/// Separator placed between the template and the upstream context
pub const CONTEXT_SEPARATOR: &str = "\nContext: ";

/// Prompt used when neither a template nor any context is available
pub const DEFAULT_PROMPT: &str = "Hello";

/// Build the prompt sent to the model.
///
/// Upstream results are rendered as text (strings verbatim, other JSON values
/// as JSON) and joined with a single space.
pub fn compose_prompt(template: Option<&str>, messages: &[Message]) -> String {
    let context = messages
        .iter()
        .filter_map(Message::result)
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ");

    let template = template.unwrap_or_default();
    let prompt = if context.is_empty() {
        template.to_string()
    } else {
        format!("{}{}{}", template, CONTEXT_SEPARATOR, context)
    };

    if prompt.is_empty() {
        DEFAULT_PROMPT.to_string()
    } else {
        prompt
    }
}

/// Vertex that invokes a language model
pub struct LlmVertex {
    model: Arc<dyn LanguageModel>,
}

impl LlmVertex {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// The model this vertex calls
    pub fn model(&self) -> &Arc<dyn LanguageModel> {
        &self.model
    }
}

impl std::fmt::Debug for LlmVertex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmVertex")
            .field("model", &self.model.name())
            .finish()
    }
}

#[async_trait]
impl Vertex for LlmVertex {
    async fn compute(
        &self,
        ctx: &mut ComputeContext<'_>,
        messages: &[Message],
    ) -> Result<(), VertexError> {
        let template = ctx.node().and_then(Node::prompt);
        let prompt = compose_prompt(template, messages);

        debug!(
            vertex_id = %ctx.id(),
            superstep = ctx.superstep,
            model = self.model.name(),
            prompt_len = prompt.len(),
            "Invoking language model"
        );

        let result = match self.model.generate(&prompt).await {
            Ok(result) => result,
            Err(e) => {
                warn!(vertex_id = %ctx.id(), error = %e, "Language model call failed");
                return Err(e.into());
            }
        };

        ctx.record()
            .set_result(
                ctx.id().as_str(),
                json!({
                    "result": result,
                    "debug_prompt": prompt,
                    "timestamp": Utc::now().to_rfc3339(),
                }),
            )
            .await;

        ctx.send_to_successors(result_content(result));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}
