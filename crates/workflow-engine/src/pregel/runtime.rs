//! Pregel Runtime - superstep scheduler for workflow graphs
//!
//! The runtime executes workflows through synchronized supersteps.
//! Each superstep follows the sequence: Deliver → Compute → Collect → Route.
//!
//! Messages produced in superstep `r` are only routed after every active
//! vertex of `r` has finished, so they are visible no earlier than `r + 1`.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::{MessageOrder, PregelConfig};
use super::error::{PregelError, VertexError};
use super::message::Message;
use super::record::{ExecutionRecord, ExecutionStatus};
use super::vertex::{BoxedVertex, ComputeContext, Vertex, VertexId};
use crate::workflow::{VertexFactory, Workflow, WorkflowIndex};

type Inboxes = HashMap<VertexId, Vec<Message>>;
type TaskOutput = (usize, VertexId, Result<Vec<Message>, VertexError>);

/// Summary of a successful run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowResult {
    /// Superstep at which quiescence was detected (number of rounds that computed)
    pub supersteps: usize,
    /// Total vertex computations across all supersteps
    pub vertices_computed: usize,
    /// Total messages delivered to existing recipients
    pub messages_routed: usize,
}

/// Pregel Runtime for executing one workflow graph
///
/// Built once per execution: the workflow is indexed, and one vertex is
/// constructed per node through the supplied factory. Construction errors
/// surface from [`PregelRuntime::build`], before any superstep runs.
pub struct PregelRuntime {
    config: PregelConfig,
    index: Arc<WorkflowIndex>,
    vertices: HashMap<VertexId, BoxedVertex>,
}

impl std::fmt::Debug for PregelRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PregelRuntime")
            .field("config", &self.config)
            .field("workflow_id", &self.index.workflow().id)
            .field("vertices", &self.vertices.len())
            .finish()
    }
}

impl PregelRuntime {
    /// Validate the graph and construct a vertex for every node
    pub fn build(
        workflow: Arc<Workflow>,
        factory: &dyn VertexFactory,
        config: PregelConfig,
    ) -> Result<Self, PregelError> {
        let index = Arc::new(WorkflowIndex::build(workflow)?);

        let mut vertices = HashMap::with_capacity(index.workflow().nodes.len());
        for node in &index.workflow().nodes {
            let vertex = factory.create(node).map_err(|source| {
                PregelError::construction(node.id.clone(), node.node_type.clone(), source)
            })?;
            vertices.insert(node.id.clone(), vertex);
        }

        Ok(Self {
            config,
            index,
            vertices,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &PregelConfig {
        &self.config
    }

    /// The index built for this workflow
    pub fn index(&self) -> &WorkflowIndex {
        &self.index
    }

    /// Create an execution record for this workflow, with every node `Pending`
    /// when status tracking is enabled
    pub fn new_record(&self) -> ExecutionRecord {
        let workflow = self.index.workflow();
        if self.config.track_status {
            ExecutionRecord::with_nodes(workflow.id.clone(), workflow.nodes.iter().map(|n| n.id.0.clone()))
        } else {
            ExecutionRecord::new(workflow.id.clone())
        }
    }

    /// Run the workflow to quiescence
    pub async fn run(&self, record: Arc<ExecutionRecord>) -> Result<WorkflowResult, PregelError> {
        self.run_with_cancellation(record, CancellationToken::new())
            .await
    }

    /// Run the workflow, aborting with [`PregelError::Cancelled`] once `cancel` fires
    pub async fn run_with_cancellation(
        &self,
        record: Arc<ExecutionRecord>,
        cancel: CancellationToken,
    ) -> Result<WorkflowResult, PregelError> {
        let workflow_id = self.index.workflow().id.as_str();
        let execution_id = record.execution_id();
        info!(
            workflow_id,
            %execution_id,
            nodes = self.vertices.len(),
            max_supersteps = self.config.max_supersteps,
            "Starting workflow execution"
        );

        let mut inboxes = self.seed();
        let mut vertices_computed = 0;
        let mut messages_routed = 0;

        for superstep in 0..self.config.max_supersteps {
            if cancel.is_cancelled() {
                warn!(workflow_id, %execution_id, superstep, "Execution cancelled");
                return Err(PregelError::Cancelled { superstep });
            }

            let active = self.take_active(&mut inboxes);
            if active.is_empty() {
                info!(
                    workflow_id,
                    %execution_id,
                    supersteps = superstep,
                    vertices_computed,
                    "Workflow reached quiescence"
                );
                return Ok(WorkflowResult {
                    supersteps: superstep,
                    vertices_computed,
                    messages_routed,
                });
            }

            debug!(workflow_id, superstep, active = active.len(), "Executing superstep");
            vertices_computed += active.len();

            let outboxes = self
                .compute_vertices(superstep, active, &record, &cancel)
                .await?;

            let (next, routed) = self.route_messages(superstep, outboxes);
            inboxes = next;
            messages_routed += routed;
        }

        warn!(
            workflow_id,
            %execution_id,
            max_supersteps = self.config.max_supersteps,
            "Execution exceeded max supersteps"
        );
        Err(PregelError::MaxSuperstepsExceeded(self.config.max_supersteps))
    }

    /// Superstep-0 inboxes: one trigger per start node
    fn seed(&self) -> Inboxes {
        let mut inboxes = Inboxes::new();
        for id in self.index.start_nodes() {
            inboxes
                .entry(id.clone())
                .or_default()
                .push(Message::trigger(id));
        }
        inboxes
    }

    /// Remove non-empty inboxes, in node-declaration order
    fn take_active(&self, inboxes: &mut Inboxes) -> Vec<(VertexId, Vec<Message>)> {
        self.index
            .workflow()
            .nodes
            .iter()
            .filter_map(|node| {
                inboxes
                    .remove(&node.id)
                    .filter(|messages| !messages.is_empty())
                    .map(|messages| (node.id.clone(), messages))
            })
            .collect()
    }

    /// Compute all active vertices; returns their outboxes in the order given
    async fn compute_vertices(
        &self,
        superstep: usize,
        active: Vec<(VertexId, Vec<Message>)>,
        record: &Arc<ExecutionRecord>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Vec<Message>>, PregelError> {
        if self.config.effective_parallelism() == 1 || active.len() == 1 {
            return self
                .compute_sequential(superstep, active, record, cancel)
                .await;
        }

        let semaphore = Arc::new(Semaphore::new(self.config.effective_parallelism()));
        let track_status = self.config.track_status;
        let mut tasks: JoinSet<TaskOutput> = JoinSet::new();
        let mut task_vertices = HashMap::new();
        let mut outboxes = vec![Vec::new(); active.len()];

        for (slot, (vertex_id, messages)) in active.into_iter().enumerate() {
            let Some(vertex) = self.vertices.get(&vertex_id).cloned() else {
                continue;
            };
            let semaphore = Arc::clone(&semaphore);
            let index = Arc::clone(&self.index);
            let record = Arc::clone(record);
            let vid = vertex_id.clone();

            let handle = tasks.spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => {
                        compute_vertex(
                            vertex.as_ref(),
                            vid.clone(),
                            superstep,
                            &messages,
                            &index,
                            &record,
                            track_status,
                        )
                        .await
                    }
                    Err(_) => Err(VertexError::failed("scheduler semaphore closed")),
                };
                (slot, vid, outcome)
            });
            task_vertices.insert(handle.id(), vertex_id);
        }

        loop {
            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!(superstep, "Execution cancelled with vertices in flight");
                    abort_round(&mut tasks).await;
                    if track_status {
                        fail_interrupted(record, task_vertices.values()).await;
                    }
                    return Err(PregelError::Cancelled { superstep });
                }
                joined = tasks.join_next() => joined,
            };

            let Some(joined) = joined else {
                break;
            };

            match joined {
                Ok((slot, _, Ok(outbox))) => outboxes[slot] = outbox,
                Ok((_, vertex_id, Err(source))) => {
                    warn!(superstep, %vertex_id, error = %source, "Vertex computation failed");
                    abort_round(&mut tasks).await;
                    if track_status {
                        fail_interrupted(record, task_vertices.values()).await;
                    }
                    return Err(PregelError::vertex_compute(superstep, vertex_id, source));
                }
                Err(join_error) => {
                    let vertex_id = task_vertices
                        .get(&join_error.id())
                        .cloned()
                        .unwrap_or_else(|| VertexId::new("unknown"));
                    abort_round(&mut tasks).await;
                    if track_status {
                        fail_interrupted(record, task_vertices.values()).await;
                    }
                    return Err(PregelError::TaskJoin {
                        vertex_id,
                        message: join_error.to_string(),
                    });
                }
            }
        }

        Ok(outboxes)
    }

    /// Compute active vertices one at a time, in declaration order
    async fn compute_sequential(
        &self,
        superstep: usize,
        active: Vec<(VertexId, Vec<Message>)>,
        record: &ExecutionRecord,
        cancel: &CancellationToken,
    ) -> Result<Vec<Vec<Message>>, PregelError> {
        let mut outboxes = Vec::with_capacity(active.len());

        for (vertex_id, messages) in active {
            let Some(vertex) = self.vertices.get(&vertex_id) else {
                outboxes.push(Vec::new());
                continue;
            };

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!(superstep, %vertex_id, "Execution cancelled with vertex in flight");
                    if self.config.track_status {
                        fail_interrupted(record, [&vertex_id]).await;
                    }
                    return Err(PregelError::Cancelled { superstep });
                }
                outcome = compute_vertex(
                    vertex.as_ref(),
                    vertex_id.clone(),
                    superstep,
                    &messages,
                    &self.index,
                    record,
                    self.config.track_status,
                ) => outcome,
            };

            match outcome {
                Ok(outbox) => outboxes.push(outbox),
                Err(source) => {
                    warn!(superstep, %vertex_id, error = %source, "Vertex computation failed");
                    return Err(PregelError::vertex_compute(superstep, vertex_id, source));
                }
            }
        }

        Ok(outboxes)
    }

    /// Group outgoing messages by recipient into the next superstep's inboxes
    fn route_messages(&self, superstep: usize, outboxes: Vec<Vec<Message>>) -> (Inboxes, usize) {
        let mut inboxes = Inboxes::new();
        let mut routed = 0;

        for message in outboxes.into_iter().flatten() {
            if !self.index.contains(message.to.as_str()) {
                warn!(
                    superstep,
                    from = %message.from,
                    to = %message.to,
                    "Dropping message addressed to unknown vertex"
                );
                continue;
            }
            routed += 1;
            inboxes.entry(message.to.clone()).or_default().push(message);
        }

        if self.config.message_order == MessageOrder::BySender {
            for inbox in inboxes.values_mut() {
                inbox.sort_by(|a, b| a.from.cmp(&b.from));
            }
        }

        (inboxes, routed)
    }
}

/// Run one vertex's compute with status bookkeeping; returns its outbox
async fn compute_vertex(
    vertex: &dyn Vertex,
    vertex_id: VertexId,
    superstep: usize,
    messages: &[Message],
    index: &WorkflowIndex,
    record: &ExecutionRecord,
    track_status: bool,
) -> Result<Vec<Message>, VertexError> {
    if track_status {
        record
            .set_status(vertex_id.as_str(), ExecutionStatus::Running)
            .await;
    }
    debug!(
        superstep,
        vertex_id = %vertex_id,
        vertex = vertex.name(),
        messages = messages.len(),
        "Computing vertex"
    );

    let mut ctx = ComputeContext::new(vertex_id.clone(), superstep, index, record);
    let result = vertex.compute(&mut ctx, messages).await;

    let status = if result.is_ok() {
        ExecutionStatus::Succeeded
    } else {
        ExecutionStatus::Failed
    };
    if track_status {
        record.set_status(vertex_id.as_str(), status).await;
    }

    result.map(|()| ctx.into_outbox())
}

/// Abort a round's remaining tasks and wait until none is running
async fn abort_round(tasks: &mut JoinSet<TaskOutput>) {
    tasks.abort_all();
    while tasks.join_next().await.is_some() {}
}

/// Mark vertices whose compute was cut off mid-flight as failed
async fn fail_interrupted<'a>(
    record: &ExecutionRecord,
    vertex_ids: impl IntoIterator<Item = &'a VertexId>,
) {
    for vertex_id in vertex_ids {
        if record.status(vertex_id.as_str()).await == Some(ExecutionStatus::Running) {
            record
                .set_status(vertex_id.as_str(), ExecutionStatus::Failed)
                .await;
        }
    }
}
