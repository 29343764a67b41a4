//! Live schedule triggers.
//!
//! Each armed job owns one tokio task that sleeps until the next fire
//! instant and then posts a [`JobDue`] event to a bounded queue. The engine
//! never runs commands itself; the consumer of the queue does.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::CronError;
use crate::grammar::ScheduleGrammar;

/// Seconds a firing may be late before it is dropped instead of delivered.
/// Missed firings are not caught up.
pub const MISSED_FIRE_GRACE_SECS: i64 = 60;

/// "Job due" event posted by a trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDue {
    pub id: String,
    /// The schedule instant this event was fired for.
    pub scheduled_at: DateTime<Utc>,
}

type NextFire = Arc<Mutex<Option<DateTime<Utc>>>>;

struct Trigger {
    next_fire: NextFire,
    handle: JoinHandle<()>,
}

impl Trigger {
    fn is_live(&self) -> bool {
        !self.handle.is_finished()
    }
}

/// Owns the set of armed triggers, at most one per job id.
pub struct ScheduleEngine {
    grammar: Arc<dyn ScheduleGrammar>,
    clock: Arc<dyn Clock>,
    due_tx: mpsc::Sender<JobDue>,
    triggers: Mutex<HashMap<String, Trigger>>,
}

impl ScheduleEngine {
    /// Create an engine and the receiving end of its due-event queue.
    pub fn new(
        grammar: Arc<dyn ScheduleGrammar>,
        clock: Arc<dyn Clock>,
        queue_capacity: usize,
    ) -> (Self, mpsc::Receiver<JobDue>) {
        let (due_tx, due_rx) = mpsc::channel(queue_capacity.max(1));
        let engine = Self {
            grammar,
            clock,
            due_tx,
            triggers: Mutex::new(HashMap::new()),
        };
        (engine, due_rx)
    }

    pub fn grammar(&self) -> &Arc<dyn ScheduleGrammar> {
        &self.grammar
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Arm `id` with `expr`, replacing any trigger it already has.
    ///
    /// Returns the first fire instant. An invalid expression leaves the
    /// existing trigger (if any) untouched. Must be called inside a tokio
    /// runtime.
    pub fn arm(&self, id: &str, expr: &str) -> Result<DateTime<Utc>, CronError> {
        self.grammar
            .check(expr)
            .map_err(|reason| CronError::invalid_schedule(expr, reason))?;
        let first = self
            .grammar
            .next_fire_after(expr, self.clock.now())
            .ok_or_else(|| CronError::invalid_schedule(expr, "schedule never fires"))?;

        let next_fire: NextFire = Arc::new(Mutex::new(Some(first)));
        let task = TriggerTask {
            id: id.to_string(),
            schedule: expr.to_string(),
            grammar: self.grammar.clone(),
            clock: self.clock.clone(),
            due_tx: self.due_tx.clone(),
            next_fire: next_fire.clone(),
        };

        let mut triggers = self.triggers.lock();
        if let Some(old) = triggers.remove(id) {
            old.handle.abort();
            debug!("Replaced trigger for job {}", id);
        }
        let handle = tokio::spawn(task.run(first));
        triggers.insert(id.to_string(), Trigger { next_fire, handle });

        debug!("Armed job {} ({}), next run at {}", id, expr, first);
        Ok(first)
    }

    /// Stop the trigger for `id`. Returns whether one was armed.
    pub fn disarm(&self, id: &str) -> bool {
        match self.triggers.lock().remove(id) {
            Some(trigger) => {
                trigger.handle.abort();
                debug!("Disarmed job {}", id);
                true
            }
            None => false,
        }
    }

    /// Stop every trigger. Returns how many were armed.
    pub fn disarm_all(&self) -> usize {
        let drained: Vec<_> = self.triggers.lock().drain().collect();
        for (_, trigger) in &drained {
            trigger.handle.abort();
        }
        drained.len()
    }

    pub fn is_armed(&self, id: &str) -> bool {
        self.triggers.lock().get(id).is_some_and(Trigger::is_live)
    }

    /// Next fire instant of a live trigger.
    pub fn next_fire(&self, id: &str) -> Option<DateTime<Utc>> {
        let triggers = self.triggers.lock();
        let trigger = triggers.get(id).filter(|t| t.is_live())?;
        let next = *trigger.next_fire.lock();
        next
    }

    pub fn armed_count(&self) -> usize {
        self.triggers.lock().values().filter(|t| t.is_live()).count()
    }

    pub fn armed_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .triggers
            .lock()
            .iter()
            .filter(|(_, t)| t.is_live())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }
}

impl Drop for ScheduleEngine {
    fn drop(&mut self) {
        for (_, trigger) in self.triggers.get_mut().drain() {
            trigger.handle.abort();
        }
    }
}

struct TriggerTask {
    id: String,
    schedule: String,
    grammar: Arc<dyn ScheduleGrammar>,
    clock: Arc<dyn Clock>,
    due_tx: mpsc::Sender<JobDue>,
    next_fire: NextFire,
}

impl TriggerTask {
    async fn run(self, first: DateTime<Utc>) {
        let mut due = first;
        loop {
            let wait = (due - self.clock.now()).to_std().unwrap_or(Duration::ZERO);
            tokio::time::sleep(wait).await;

            let now = self.clock.now();
            if now < due {
                // Woke up early against the wall clock.
                continue;
            }

            if now - due > chrono::Duration::seconds(MISSED_FIRE_GRACE_SECS) {
                warn!(
                    "Skipping missed run of job {} scheduled at {} (now {})",
                    self.id, due, now
                );
            } else {
                let event = JobDue {
                    id: self.id.clone(),
                    scheduled_at: due,
                };
                if self.due_tx.send(event).await.is_err() {
                    debug!("Due queue closed, stopping trigger for job {}", self.id);
                    break;
                }
            }

            let from = if now > due { now } else { due };
            match self.grammar.next_fire_after(&self.schedule, from) {
                Some(next) => {
                    *self.next_fire.lock() = Some(next);
                    due = next;
                }
                None => {
                    warn!("Schedule of job {} has no further runs", self.id);
                    *self.next_fire.lock() = None;
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
