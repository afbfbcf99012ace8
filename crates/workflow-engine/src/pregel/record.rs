//! Execution record shared by the vertices of one workflow run
//!
//! The record is created once per execution, written concurrently by the
//! vertex tasks of a superstep, and handed back to the caller afterwards.
//! All access goes through an internal `RwLock`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Per-node execution status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionStatus {
    #[default]
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "RUNNING")]
    Running,
    #[serde(rename = "SUCCESS")]
    Succeeded,
    #[serde(rename = "FAILED")]
    Failed,
}

impl ExecutionStatus {
    /// Whether the node has finished computing (successfully or not)
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionStatus::Succeeded | ExecutionStatus::Failed)
    }
}

#[derive(Debug, Default)]
struct RecordInner {
    status: HashMap<String, ExecutionStatus>,
    results: HashMap<String, Value>,
}

/// Concurrency-safe store of per-node statuses and results for one run
#[derive(Debug)]
pub struct ExecutionRecord {
    workflow_id: String,
    execution_id: Uuid,
    inner: RwLock<RecordInner>,
}

impl ExecutionRecord {
    /// Create an empty record for a workflow
    pub fn new(workflow_id: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            execution_id: Uuid::new_v4(),
            inner: RwLock::new(RecordInner::default()),
        }
    }

    /// Create a record with every given node marked `Pending`
    pub fn with_nodes<I, S>(workflow_id: impl Into<String>, node_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let status = node_ids
            .into_iter()
            .map(|id| (id.into(), ExecutionStatus::Pending))
            .collect();
        Self {
            workflow_id: workflow_id.into(),
            execution_id: Uuid::new_v4(),
            inner: RwLock::new(RecordInner {
                status,
                results: HashMap::new(),
            }),
        }
    }

    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    /// Unique ID of this execution
    pub fn execution_id(&self) -> Uuid {
        self.execution_id
    }

    /// Store a node's result, replacing any previous value
    pub async fn set_result(&self, node_id: impl Into<String>, value: Value) {
        self.inner.write().await.results.insert(node_id.into(), value);
    }

    /// Read a node's result
    pub async fn result(&self, node_id: &str) -> Option<Value> {
        self.inner.read().await.results.get(node_id).cloned()
    }

    /// Snapshot of all results, ordered by node ID
    pub async fn results(&self) -> BTreeMap<String, Value> {
        self.inner
            .read()
            .await
            .results
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Update a node's status
    pub async fn set_status(&self, node_id: impl Into<String>, status: ExecutionStatus) {
        self.inner.write().await.status.insert(node_id.into(), status);
    }

    /// Read a node's status
    pub async fn status(&self, node_id: &str) -> Option<ExecutionStatus> {
        self.inner.read().await.status.get(node_id).copied()
    }

    /// Snapshot of all statuses, ordered by node ID
    pub async fn statuses(&self) -> BTreeMap<String, ExecutionStatus> {
        self.inner
            .read()
            .await
            .status
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    static_assertions::assert_impl_all!(ExecutionRecord: Send, Sync);

    #[tokio::test]
    async fn test_result_last_write_wins() {
        let record = ExecutionRecord::new("wf");
        record.set_result("out", json!("first")).await;
        record.set_result("out", json!("second")).await;

        assert_eq!(record.result("out").await, Some(json!("second")));
        assert_eq!(record.results().await.len(), 1);
        assert!(record.result("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_with_nodes_starts_pending() {
        let record = ExecutionRecord::with_nodes("wf", ["a", "b"]);
        let statuses = record.statuses().await;
        assert_eq!(statuses.len(), 2);
        assert!(statuses.values().all(|s| *s == ExecutionStatus::Pending));

        record.set_status("a", ExecutionStatus::Succeeded).await;
        assert_eq!(record.status("a").await, Some(ExecutionStatus::Succeeded));
        assert_eq!(record.status("b").await, Some(ExecutionStatus::Pending));
    }

    #[test]
    fn test_execution_ids_are_unique() {
        let a = ExecutionRecord::new("wf");
        let b = ExecutionRecord::new("wf");
        assert_ne!(a.execution_id(), b.execution_id());
        assert_eq!(a.workflow_id(), "wf");
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_value(ExecutionStatus::Succeeded).unwrap(),
            json!("SUCCESS")
        );
        let parsed: ExecutionStatus = serde_json::from_value(json!("PENDING")).unwrap();
        assert_eq!(parsed, ExecutionStatus::Pending);
        assert!(ExecutionStatus::Failed.is_terminal());
        assert!(!ExecutionStatus::Running.is_terminal());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_under_distinct_keys() {
        let record = Arc::new(ExecutionRecord::new("stress"));
        let mut handles = Vec::new();

        for task in 0..16 {
            let record = Arc::clone(&record);
            handles.push(tokio::spawn(async move {
                for i in 0..50 {
                    let key = format!("node-{}-{}", task, i);
                    record.set_status(key.clone(), ExecutionStatus::Running).await;
                    record.set_result(key.clone(), json!(i)).await;
                    record.set_status(key, ExecutionStatus::Succeeded).await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let results = record.results().await;
        assert_eq!(results.len(), 16 * 50);
        assert_eq!(results.get("node-3-49"), Some(&json!(49)));
        let statuses = record.statuses().await;
        assert!(statuses.values().all(|s| *s == ExecutionStatus::Succeeded));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_same_key_keep_one_value() {
        let record = Arc::new(ExecutionRecord::new("stress"));
        let mut handles = Vec::new();
        for task in 0..8 {
            let record = Arc::clone(&record);
            handles.push(tokio::spawn(async move {
                record.set_result("shared", json!(task)).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let value = record.result("shared").await.unwrap();
        let n = value.as_i64().unwrap();
        assert!((0..8).contains(&n));
    }
}
