//! File-backed workflow store
//!
//! One pretty-printed JSON document per workflow:
//!
//! ```text
//! workflows/
//! ├── summarize.json
//! └── triage-v2.json
//! ```

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{sort_summaries, validate_id, StoreError, StoredWorkflow, WorkflowStore, WorkflowSummary};
use crate::workflow::Workflow;

const EXTENSION: &str = "json";

/// Stores each workflow as `{dir}/{id}.json`
///
/// Writes go to a temporary file that is synced and then renamed over the
/// target, so readers never observe a partially written document.
#[derive(Debug)]
pub struct FileWorkflowStore {
    dir: PathBuf,
    /// Serializes read-modify-write in `save`
    write_lock: Mutex<()>,
}

impl FileWorkflowStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", id, EXTENSION))
    }

    fn temp_path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.tmp", id))
    }

    async fn read_entry(path: &Path) -> Result<StoredWorkflow, StoreError> {
        let data = fs::read(path).await?;
        Ok(serde_json::from_slice(&data)?)
    }

    async fn write_entry(&self, entry: &StoredWorkflow) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).await?;

        let data = serde_json::to_vec_pretty(entry)?;
        let temp_path = self.temp_path_for(&entry.id);

        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;

        fs::rename(&temp_path, self.path_for(&entry.id)).await?;
        Ok(())
    }
}

#[async_trait]
impl WorkflowStore for FileWorkflowStore {
    async fn save(
        &self,
        id: &str,
        name: &str,
        workflow: &Workflow,
    ) -> Result<StoredWorkflow, StoreError> {
        validate_id(id)?;
        let _guard = self.write_lock.lock().await;

        let stored = match self.get(id).await {
            Ok(existing) => existing.updated(name, workflow),
            Err(StoreError::NotFound(_)) => StoredWorkflow::created(id, name, workflow),
            Err(e) => return Err(e),
        };
        self.write_entry(&stored).await?;

        debug!(workflow_id = %id, path = %self.path_for(id).display(), "Saved workflow");
        Ok(stored)
    }

    async fn get(&self, id: &str) -> Result<StoredWorkflow, StoreError> {
        validate_id(id)?;
        match Self::read_entry(&self.path_for(id)).await {
            Err(StoreError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound(id.to_string()))
            }
            other => other,
        }
    }

    async fn list(&self) -> Result<Vec<WorkflowSummary>, StoreError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut summaries = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            match Self::read_entry(&path).await {
                Ok(stored) => summaries.push(stored.summary()),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable workflow file"),
            }
        }

        sort_summaries(&mut summaries);
        Ok(summaries)
    }
}
