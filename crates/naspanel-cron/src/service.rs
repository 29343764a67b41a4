//! Cron job service: the single entry point for job management.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use naspanel_exec::{CommandRunner, DEFAULT_TIMEOUT};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::engine::{JobDue, ScheduleEngine};
use crate::error::CronError;
use crate::grammar::ScheduleGrammar;
use crate::job::{JobRecord, NewJob, StoredJob, DEFAULT_JOB_NAME};
use crate::store::JobStore;

/// Service tuning.
#[derive(Debug, Clone)]
pub struct CronServiceConfig {
    /// Ceiling for every command run, scheduled or manual.
    pub command_timeout: Duration,
    /// Capacity of the due-event queue.
    pub queue_capacity: usize,
}

impl Default for CronServiceConfig {
    fn default() -> Self {
        Self {
            command_timeout: DEFAULT_TIMEOUT,
            queue_capacity: 256,
        }
    }
}

/// A stored record that was not armed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedJob {
    pub id: String,
    pub reason: String,
}

/// Result of [`CronJobService::initialize`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    pub armed: usize,
    pub skipped: Vec<SkippedJob>,
}

/// Result of a successful manual run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub id: String,
    pub last_run: DateTime<Utc>,
    pub output: String,
}

struct JobEntry {
    job: StoredJob,
    last_run: Option<DateTime<Utc>>,
}

impl JobEntry {
    fn new(job: StoredJob) -> Self {
        Self {
            job,
            last_run: None,
        }
    }
}

/// Coordinates the job store, the schedule engine and the command runner.
///
/// Every mutation holds the job-list lock for its whole duration, so create,
/// delete and startup never interleave. Command runs only take the lock to
/// read the command and to record `last_run`.
pub struct CronJobService {
    store: Arc<dyn JobStore>,
    runner: Arc<dyn CommandRunner>,
    engine: ScheduleEngine,
    config: CronServiceConfig,
    jobs: Mutex<Vec<JobEntry>>,
    due_rx: parking_lot::Mutex<Option<mpsc::Receiver<JobDue>>>,
    dispatcher: parking_lot::Mutex<Option<JoinHandle<()>>>,
    initialized: AtomicBool,
}

impl CronJobService {
    pub fn new(
        store: Arc<dyn JobStore>,
        runner: Arc<dyn CommandRunner>,
        grammar: Arc<dyn ScheduleGrammar>,
        clock: Arc<dyn Clock>,
        config: CronServiceConfig,
    ) -> Self {
        let (engine, due_rx) = ScheduleEngine::new(grammar, clock, config.queue_capacity);
        Self {
            store,
            runner,
            engine,
            config,
            jobs: Mutex::new(Vec::new()),
            due_rx: parking_lot::Mutex::new(Some(due_rx)),
            dispatcher: parking_lot::Mutex::new(None),
            initialized: AtomicBool::new(false),
        }
    }

    /// Load stored jobs and arm them.
    ///
    /// Records with an invalid schedule, an empty command or a duplicate id
    /// are skipped and reported; the rest are armed. Records without an id
    /// get a fresh one. Nothing is written back to the store here.
    pub async fn initialize(&self) -> Result<InitReport, CronError> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Err(CronError::AlreadyStarted);
        }

        let stored = match self.store.load_all().await {
            Ok(stored) => stored,
            Err(e) => {
                self.initialized.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };

        let mut jobs = self.jobs.lock().await;
        let mut report = InitReport::default();

        for mut job in stored {
            if job.id.trim().is_empty() {
                job.id = Uuid::new_v4().to_string();
                debug!("Assigned id {} to stored job '{}'", job.id, job.name);
            }
            if job.name.trim().is_empty() {
                job.name = DEFAULT_JOB_NAME.to_string();
            }

            let skip_reason = if jobs.iter().any(|e| e.job.id == job.id) {
                Some("duplicate id".to_string())
            } else if job.command.trim().is_empty() {
                Some(CronError::InvalidCommand.to_string())
            } else {
                self.engine
                    .arm(&job.id, &job.schedule)
                    .err()
                    .map(|e| e.to_string())
            };

            match skip_reason {
                Some(reason) => {
                    warn!("Skipping cron job {} ('{}'): {}", job.id, job.name, reason);
                    report.skipped.push(SkippedJob { id: job.id, reason });
                }
                None => {
                    report.armed += 1;
                    jobs.push(JobEntry::new(job));
                }
            }
        }

        info!(
            "Cron jobs initialized: {} armed, {} skipped",
            report.armed,
            report.skipped.len()
        );
        Ok(report)
    }

    /// Start consuming due events. Can only be called once.
    pub fn spawn_dispatcher(self: &Arc<Self>) -> Result<(), CronError> {
        let mut due_rx = self
            .due_rx
            .lock()
            .take()
            .ok_or(CronError::AlreadyStarted)?;
        let service: Weak<Self> = Arc::downgrade(self);

        let handle = tokio::spawn(async move {
            while let Some(due) = due_rx.recv().await {
                let Some(service) = service.upgrade() else {
                    break;
                };
                // Each run gets its own task so a slow command never delays
                // other jobs.
                tokio::spawn(async move {
                    service.handle_due(due).await;
                });
            }
            debug!("Cron dispatcher stopped");
        });

        *self.dispatcher.lock() = Some(handle);
        Ok(())
    }

    /// [`initialize`](Self::initialize) followed by
    /// [`spawn_dispatcher`](Self::spawn_dispatcher).
    pub async fn start(self: &Arc<Self>) -> Result<InitReport, CronError> {
        let report = self.initialize().await?;
        self.spawn_dispatcher()?;
        Ok(report)
    }

    /// Disarm every job and stop the dispatcher. Storage is not touched and
    /// in-flight commands keep running.
    pub fn shutdown(&self) -> usize {
        let disarmed = self.engine.disarm_all();
        if let Some(handle) = self.dispatcher.lock().take() {
            handle.abort();
        }
        info!("Cron service stopped ({} jobs disarmed)", disarmed);
        disarmed
    }

    pub async fn list(&self) -> Vec<JobRecord> {
        let jobs = self.jobs.lock().await;
        jobs.iter().map(|entry| self.record(entry)).collect()
    }

    pub async fn get(&self, id: &str) -> Result<JobRecord, CronError> {
        let jobs = self.jobs.lock().await;
        jobs.iter()
            .find(|entry| entry.job.id == id)
            .map(|entry| self.record(entry))
            .ok_or_else(|| CronError::NotFound(id.to_string()))
    }

    /// Validate, arm and persist a new job.
    ///
    /// Invalid input is rejected before anything changes. If the store write
    /// fails the new trigger is disarmed again.
    pub async fn create(&self, new_job: NewJob) -> Result<JobRecord, CronError> {
        let schedule = new_job.schedule.trim();
        self.engine
            .grammar()
            .check(schedule)
            .map_err(|reason| CronError::invalid_schedule(schedule, reason))?;
        if new_job.command.trim().is_empty() {
            return Err(CronError::InvalidCommand);
        }

        let job = new_job.into_stored(Uuid::new_v4().to_string());

        let mut jobs = self.jobs.lock().await;
        self.engine.arm(&job.id, &job.schedule)?;
        jobs.push(JobEntry::new(job.clone()));

        if let Err(e) = self.persist(&jobs).await {
            jobs.pop();
            self.engine.disarm(&job.id);
            error!("Failed to persist new cron job {}: {}", job.id, e);
            return Err(e);
        }

        info!("Created cron job {} ('{}') [{}]", job.id, job.name, job.schedule);
        Ok(JobRecord::from_stored(
            &job,
            None,
            self.engine.next_fire(&job.id),
            self.engine.is_armed(&job.id),
        ))
    }

    /// Disarm and remove a job.
    ///
    /// A failed store write does not re-arm the job. It stays listed as
    /// inactive so the delete can be retried.
    pub async fn delete(&self, id: &str) -> Result<(), CronError> {
        let mut jobs = self.jobs.lock().await;
        let index = jobs
            .iter()
            .position(|entry| entry.job.id == id)
            .ok_or_else(|| CronError::NotFound(id.to_string()))?;

        self.engine.disarm(id);
        let entry = jobs.remove(index);

        if let Err(e) = self.persist(&jobs).await {
            error!("Failed to persist deletion of cron job {}: {}", id, e);
            jobs.insert(index, entry);
            return Err(e);
        }

        info!("Deleted cron job {} ('{}')", id, entry.job.name);
        Ok(())
    }

    /// Run a job's command now, outside its schedule.
    ///
    /// `last_run` is recorded whether or not the command succeeds; a command
    /// failure is returned to the caller.
    pub async fn run_now(&self, id: &str) -> Result<RunOutcome, CronError> {
        let command = self
            .command_of(id)
            .await
            .ok_or_else(|| CronError::NotFound(id.to_string()))?;

        info!("Running cron job {} on demand", id);
        let result = self.runner.run(&command, self.config.command_timeout).await;
        let last_run = self.record_run(id).await;

        match result {
            Ok(output) => Ok(RunOutcome {
                id: id.to_string(),
                last_run,
                output,
            }),
            Err(e) => {
                warn!("Cron job {} failed on demand: {}", id, e);
                Err(CronError::Command(e))
            }
        }
    }

    /// Handle one due event. Failures are logged and never disarm the job.
    pub async fn handle_due(&self, due: JobDue) {
        if !self.engine.is_armed(&due.id) {
            debug!("Ignoring due event for unarmed job {}", due.id);
            return;
        }
        let Some(command) = self.command_of(&due.id).await else {
            debug!("Ignoring due event for removed job {}", due.id);
            return;
        };

        debug!("Cron job {} due at {}", due.id, due.scheduled_at);
        let result = self.runner.run(&command, self.config.command_timeout).await;
        self.record_run(&due.id).await;

        match result {
            Ok(output) => debug!("Cron job {} finished ({} bytes of output)", due.id, output.len()),
            Err(e) => error!(
                "Cron job {} failed: {} (exit code: {:?}, stderr: {})",
                due.id,
                e,
                e.exit_code(),
                e.stderr().trim()
            ),
        }
    }

    pub fn armed_count(&self) -> usize {
        self.engine.armed_count()
    }

    fn record(&self, entry: &JobEntry) -> JobRecord {
        let id = &entry.job.id;
        JobRecord::from_stored(
            &entry.job,
            entry.last_run,
            self.engine.next_fire(id),
            self.engine.is_armed(id),
        )
    }

    async fn command_of(&self, id: &str) -> Option<String> {
        let jobs = self.jobs.lock().await;
        jobs.iter()
            .find(|entry| entry.job.id == id)
            .map(|entry| entry.job.command.clone())
    }

    /// Stamp `last_run` on a job that may have been deleted meanwhile.
    async fn record_run(&self, id: &str) -> DateTime<Utc> {
        let now = self.engine.clock().now();
        let mut jobs = self.jobs.lock().await;
        if let Some(entry) = jobs.iter_mut().find(|entry| entry.job.id == id) {
            entry.last_run = Some(now);
        }
        now
    }

    async fn persist(&self, jobs: &[JobEntry]) -> Result<(), CronError> {
        let stored: Vec<StoredJob> = jobs.iter().map(|entry| entry.job.clone()).collect();
        self.store.save_all(&stored).await
    }
}

impl Drop for CronJobService {
    fn drop(&mut self) {
        if let Some(handle) = self.dispatcher.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
