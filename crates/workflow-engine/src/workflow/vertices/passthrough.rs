//! PassthroughVertex: forwards the latest incoming payload along each outgoing edge

use async_trait::async_trait;

use crate::pregel::{ComputeContext, Message, Vertex, VertexError};

/// Identity vertex; used for START nodes.
///
/// Sends at most one message per outgoing edge per superstep, carrying the
/// last payload of the inbox, so cycles through START nodes grow linearly.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughVertex;

#[async_trait]
impl Vertex for PassthroughVertex {
    async fn compute(
        &self,
        ctx: &mut ComputeContext<'_>,
        messages: &[Message],
    ) -> Result<(), VertexError> {
        if let Some(message) = messages.last() {
            ctx.send_to_successors(message.content.clone());
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "passthrough"
    }
}
