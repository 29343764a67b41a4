//! Shared handler state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use naspanel_cron::CronJobService;

use crate::auth::AuthGate;

/// Application state shared across handlers.
pub struct AppState {
    pub cron: Arc<CronJobService>,
    pub auth: AuthGate,
    start_time: Instant,
}

impl AppState {
    pub fn new(cron: Arc<CronJobService>, auth: AuthGate) -> Self {
        Self {
            cron,
            auth,
            start_time: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}
