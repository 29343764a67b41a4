//! Job data model.
//!
//! [`StoredJob`] is the durable form: the stable fields only. [`JobRecord`] is
//! what callers see, with the runtime fields filled in from live state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name given to jobs created or loaded without one.
pub const DEFAULT_JOB_NAME: &str = "New Cron Job";

fn default_name() -> String {
    DEFAULT_JOB_NAME.to_string()
}

/// Persisted job fields.
///
/// Field order is the on-disk key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredJob {
    #[serde(default)]
    pub id: String,
    #[serde(default = "default_name")]
    pub name: String,
    pub schedule: String,
    pub command: String,
    #[serde(default)]
    pub description: String,
}

impl StoredJob {
    pub fn new(id: impl Into<String>, schedule: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: default_name(),
            schedule: schedule.into(),
            command: command.into(),
            description: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Request to create a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJob {
    #[serde(default)]
    pub name: Option<String>,
    pub schedule: String,
    pub command: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewJob {
    pub fn new(schedule: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: None,
            schedule: schedule.into(),
            command: command.into(),
            description: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Build the durable record under `id`. A blank name falls back to
    /// [`DEFAULT_JOB_NAME`].
    pub(crate) fn into_stored(self, id: String) -> StoredJob {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(default_name);
        StoredJob {
            id,
            name,
            schedule: self.schedule.trim().to_string(),
            command: self.command,
            description: self.description.unwrap_or_default(),
        }
    }
}

/// A job as exposed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: String,
    pub name: String,
    pub schedule: String,
    pub command: String,
    pub description: String,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl JobRecord {
    pub(crate) fn from_stored(
        job: &StoredJob,
        last_run: Option<DateTime<Utc>>,
        next_run: Option<DateTime<Utc>>,
        is_active: bool,
    ) -> Self {
        Self {
            id: job.id.clone(),
            name: job.name.clone(),
            schedule: job.schedule.clone(),
            command: job.command.clone(),
            description: job.description.clone(),
            last_run,
            next_run,
            is_active,
        }
    }
}
