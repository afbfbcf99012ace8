//! Workflow definition persistence
//!
//! The engine never touches a store. The surrounding service layer saves
//! definitions, looks them up by ID and hands them to the executor.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │              WorkflowStore               │
//! │   ┌──────────────┐   ┌──────────────┐    │
//! │   │    Memory    │   │     File     │    │
//! │   └──────────────┘   └──────────────┘    │
//! │                  │                       │
//! │                  ▼                       │
//! │            StoredWorkflow                │
//! └──────────────────────────────────────────┘
//! ```

mod file;
mod memory;

pub use file::FileWorkflowStore;
pub use memory::MemoryWorkflowStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::workflow::Workflow;

/// Errors raised by a [`WorkflowStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("workflow not found: {0}")]
    NotFound(String),

    #[error("invalid workflow id '{0}'")]
    InvalidId(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A persisted workflow definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredWorkflow {
    pub id: String,
    pub name: String,
    pub definition: Workflow,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredWorkflow {
    pub fn summary(&self) -> WorkflowSummary {
        WorkflowSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            node_count: self.definition.nodes.len(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Replace the definition of an existing entry, keeping its creation time
    fn updated(self, name: &str, definition: &Workflow) -> Self {
        Self {
            name: name.to_string(),
            definition: definition.clone(),
            updated_at: Utc::now(),
            ..self
        }
    }

    fn created(id: &str, name: &str, definition: &Workflow) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            name: name.to_string(),
            definition: definition.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Listing entry for a stored workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub id: String,
    pub name: String,
    pub node_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persistence for workflow definitions
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Insert or replace a workflow
    ///
    /// Replacing keeps the original `created_at` and refreshes `updated_at`.
    async fn save(
        &self,
        id: &str,
        name: &str,
        workflow: &Workflow,
    ) -> Result<StoredWorkflow, StoreError>;

    /// Load a workflow by ID
    async fn get(&self, id: &str) -> Result<StoredWorkflow, StoreError>;

    /// All stored workflows, most recently updated first
    async fn list(&self) -> Result<Vec<WorkflowSummary>, StoreError>;
}

/// IDs double as file names, so only a conservative character set is allowed
pub(crate) fn validate_id(id: &str) -> Result<(), StoreError> {
    let valid = !id.is_empty()
        && !id.starts_with('.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidId(id.to_string()))
    }
}

/// Newest first; ties broken by ID for a stable listing
pub(crate) fn sort_summaries(summaries: &mut [WorkflowSummary]) {
    summaries.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_validate_id() {
        for id in ["wf-1", "summarize_v2", "a.b"] {
            assert!(validate_id(id).is_ok(), "{} should be valid", id);
        }
        for id in ["", "../etc", "a/b", "a\\b", ".hidden", "with space"] {
            assert!(
                matches!(validate_id(id), Err(StoreError::InvalidId(_))),
                "{:?} should be rejected",
                id
            );
        }
    }

    #[test]
    fn test_sort_summaries_newest_first() {
        let now = Utc::now();
        let summary = |id: &str, age_secs: i64| WorkflowSummary {
            id: id.to_string(),
            name: id.to_string(),
            node_count: 0,
            created_at: now,
            updated_at: now - Duration::seconds(age_secs),
        };
        let mut summaries = vec![summary("old", 60), summary("b", 0), summary("a", 0)];
        sort_summaries(&mut summaries);
        let ids: Vec<_> = summaries.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "old"]);
    }

    #[test]
    fn test_updated_keeps_created_at() {
        let original = StoredWorkflow::created("wf", "First", &Workflow::new("wf"));
        let created_at = original.created_at;
        let updated = original.updated("Second", &Workflow::new("wf"));
        assert_eq!(updated.created_at, created_at);
        assert!(updated.updated_at >= created_at);
        assert_eq!(updated.name, "Second");
        assert_eq!(updated.summary().node_count, 0);
    }
}
