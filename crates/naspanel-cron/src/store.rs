//! Durable job storage.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::CronError;
use crate::job::StoredJob;

/// Durable list of job records.
///
/// Only the stable fields of a job are stored. Runtime state (`lastRun`,
/// `nextRun`, `isActive`) is rebuilt after load.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Load every stored record in order. A store that was never written
    /// loads as empty.
    async fn load_all(&self) -> Result<Vec<StoredJob>, CronError>;

    /// Replace the stored set with `jobs`.
    async fn save_all(&self, jobs: &[StoredJob]) -> Result<(), CronError>;
}

/// In-memory job store for testing.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    jobs: tokio::sync::Mutex<Vec<StoredJob>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with `jobs`.
    pub fn with_jobs(jobs: Vec<StoredJob>) -> Self {
        Self {
            jobs: tokio::sync::Mutex::new(jobs),
        }
    }

    pub async fn snapshot(&self) -> Vec<StoredJob> {
        self.jobs.lock().await.clone()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn load_all(&self) -> Result<Vec<StoredJob>, CronError> {
        Ok(self.jobs.lock().await.clone())
    }

    async fn save_all(&self, jobs: &[StoredJob]) -> Result<(), CronError> {
        *self.jobs.lock().await = jobs.to_vec();
        Ok(())
    }
}

/// JSON file store: one pretty-printed array of records.
#[derive(Debug, Clone)]
pub struct FileJobStore {
    path: PathBuf,
}

impl FileJobStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl JobStore for FileJobStore {
    async fn load_all(&self) -> Result<Vec<StoredJob>, CronError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No jobs file at {:?}, starting empty", self.path);
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(CronError::Persistence(format!(
                    "Failed to read jobs file {:?}: {}",
                    self.path, e
                )));
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let entries: Vec<serde_json::Value> = serde_json::from_str(&content).map_err(|e| {
            CronError::Persistence(format!("Failed to parse jobs file {:?}: {}", self.path, e))
        })?;

        let mut jobs = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<StoredJob>(entry) {
                Ok(job) => jobs.push(job),
                Err(e) => warn!("Skipping malformed job #{} in {:?}: {}", index, self.path, e),
            }
        }

        debug!("Loaded {} jobs from {:?}", jobs.len(), self.path);
        Ok(jobs)
    }

    async fn save_all(&self, jobs: &[StoredJob]) -> Result<(), CronError> {
        let content = serde_json::to_string_pretty(jobs)
            .map_err(|e| CronError::Persistence(format!("Failed to serialize jobs: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                CronError::Persistence(format!("Failed to create directory {:?}: {}", parent, e))
            })?;
        }

        // Atomic replace: write aside, then rename over the old file.
        let temp = self.temp_path();
        fs::write(&temp, content).await.map_err(|e| {
            CronError::Persistence(format!("Failed to write jobs file {:?}: {}", temp, e))
        })?;
        if let Err(e) = fs::rename(&temp, &self.path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(CronError::Persistence(format!(
                "Failed to replace jobs file {:?}: {}",
                self.path, e
            )));
        }

        debug!("Saved {} jobs to {:?}", jobs.len(), self.path);
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
