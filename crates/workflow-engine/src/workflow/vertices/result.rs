//! ResultVertex: terminal node that records what reaches it

use async_trait::async_trait;
use serde_json::Value;

use crate::pregel::{ComputeContext, Message, Vertex, VertexError};

/// Copies each incoming payload into the execution record under its own node ID
///
/// With several messages in one superstep the last one delivered wins; use
/// `MessageOrder::BySender` for a sender-based tie-break. Emits nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultVertex;

#[async_trait]
impl Vertex for ResultVertex {
    async fn compute(
        &self,
        ctx: &mut ComputeContext<'_>,
        messages: &[Message],
    ) -> Result<(), VertexError> {
        let record = ctx.record();
        for message in messages {
            record
                .set_result(ctx.id().as_str(), Value::Object(message.content.clone()))
                .await;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "result"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pregel::{result_content, ExecutionRecord, VertexId};
    use crate::workflow::{NodeType, WorkflowBuilder, WorkflowIndex};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_records_last_message_and_emits_nothing() {
        let workflow = WorkflowBuilder::new("wf")
            .node("out", NodeType::ResultSink)
            .build()
            .unwrap();
        let index = WorkflowIndex::build(Arc::new(workflow)).unwrap();
        let record = ExecutionRecord::new("wf");
        let mut ctx = ComputeContext::new(VertexId::new("out"), 2, &index, &record);

        let inbox = vec![
            Message::new("a", "out", result_content("first")),
            Message::new("b", "out", result_content("second")),
        ];
        ResultVertex.compute(&mut ctx, &inbox).await.unwrap();

        assert!(ctx.outbox().is_empty());
        assert_eq!(record.result("out").await, Some(json!({"result": "second"})));
    }
}
