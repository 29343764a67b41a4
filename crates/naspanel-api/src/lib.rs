//! # NAS Panel API
//!
//! HTTP surface for the NAS panel: cron-job management routes behind a
//! bearer-token gate, plus an unauthenticated health check.

pub mod auth;
pub mod cron_jobs;
pub mod error;
pub mod health;
pub mod routes;
pub mod server;
pub mod state;

pub use auth::AuthGate;
pub use error::ApiError;
pub use routes::create_router;
pub use server::{ApiConfig, ApiServer};
pub use state::AppState;
