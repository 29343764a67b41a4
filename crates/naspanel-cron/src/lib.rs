//! # NAS Panel Cron
//!
//! Scheduled command execution for the NAS panel.
//!
//! ```text
//!   HTTP layer
//!       │
//!       ▼
//!  CronJobService ──validate──▶ ScheduleGrammar
//!       │   │
//!       │   ├──arm/disarm──▶ ScheduleEngine ──JobDue──┐
//!       │   └──save_all────▶ JobStore                 │
//!       │                                             │
//!       ◀─────────────── dispatcher (queue consumer) ◀┘
//!       │
//!       ▼
//!  CommandRunner
//! ```
//!
//! The service is the only writer to the store and the engine. Every
//! mutation runs under one lock in the order validate, arm, persist; delete
//! disarms before persisting. Triggers never run commands themselves: they
//! post [`JobDue`] events to a queue that the service drains.

pub mod clock;
pub mod engine;
pub mod error;
pub mod grammar;
pub mod job;
pub mod service;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{JobDue, ScheduleEngine, MISSED_FIRE_GRACE_SECS};
pub use error::CronError;
pub use grammar::{CronGrammar, ScheduleGrammar};
pub use job::{JobRecord, NewJob, StoredJob, DEFAULT_JOB_NAME};
pub use service::{CronJobService, CronServiceConfig, InitReport, RunOutcome, SkippedJob};
pub use store::{FileJobStore, JobStore, MemoryJobStore};
