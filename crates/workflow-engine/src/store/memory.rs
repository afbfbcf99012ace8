//! In-process workflow store

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::{sort_summaries, validate_id, StoreError, StoredWorkflow, WorkflowStore, WorkflowSummary};
use crate::workflow::Workflow;

/// Keeps definitions in memory for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryWorkflowStore {
    entries: RwLock<HashMap<String, StoredWorkflow>>,
}

impl MemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl WorkflowStore for MemoryWorkflowStore {
    async fn save(
        &self,
        id: &str,
        name: &str,
        workflow: &Workflow,
    ) -> Result<StoredWorkflow, StoreError> {
        validate_id(id)?;

        let mut entries = self.entries.write().await;
        let stored = match entries.remove(id) {
            Some(existing) => existing.updated(name, workflow),
            None => StoredWorkflow::created(id, name, workflow),
        };
        entries.insert(id.to_string(), stored.clone());

        debug!(workflow_id = %id, "Saved workflow in memory");
        Ok(stored)
    }

    async fn get(&self, id: &str) -> Result<StoredWorkflow, StoreError> {
        self.entries
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn list(&self) -> Result<Vec<WorkflowSummary>, StoreError> {
        let mut summaries: Vec<_> = self
            .entries
            .read()
            .await
            .values()
            .map(StoredWorkflow::summary)
            .collect();
        sort_summaries(&mut summaries);
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{NodeType, WorkflowBuilder};
    use std::sync::Arc;
    use std::time::Duration;

    fn workflow(id: &str) -> Workflow {
        WorkflowBuilder::new(id)
            .node("start", NodeType::Start)
            .node("out", NodeType::ResultSink)
            .edge("start", "out")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let store = MemoryWorkflowStore::new();
        let saved = store.save("wf-1", "Demo", &workflow("wf-1")).await.unwrap();

        let loaded = store.get("wf-1").await.unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.definition.nodes.len(), 2);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = MemoryWorkflowStore::new();
        assert!(store.is_empty().await);
        assert!(matches!(
            store.get("nope").await,
            Err(StoreError::NotFound(id)) if id == "nope"
        ));
    }

    #[tokio::test]
    async fn test_upsert_keeps_created_at() {
        let store = MemoryWorkflowStore::new();
        let first = store.save("wf", "v1", &workflow("wf")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = store.save("wf", "v2", &Workflow::new("wf")).await.unwrap();

        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at > first.updated_at);
        assert_eq!(store.get("wf").await.unwrap().name, "v2");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_list_most_recent_first() {
        let store = MemoryWorkflowStore::new();
        for id in ["a", "b", "c"] {
            store.save(id, id, &workflow(id)).await.unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        store.save("a", "a again", &workflow("a")).await.unwrap();

        let ids: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["a", "c", "b"]);
    }

    #[tokio::test]
    async fn test_rejects_invalid_id() {
        let store = MemoryWorkflowStore::new();
        assert!(matches!(
            store.save("../x", "bad", &Workflow::new("x")).await,
            Err(StoreError::InvalidId(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_saves() {
        let store = Arc::new(MemoryWorkflowStore::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let id = format!("wf-{}", i);
                    store.save(&id, "concurrent", &Workflow::new(&id)).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(store.list().await.unwrap().len(), 16);
    }
}
