//! HTTP route definitions.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::auth::require_token;
use crate::cron_jobs;
use crate::health::health_check;
use crate::state::AppState;

/// Build the application router.
///
/// ```text
/// /system/cron-jobs            (bearer token required)
///   GET    /system/cron-jobs           - List jobs
///   POST   /system/cron-jobs           - Create job
///   GET    /system/cron-jobs/{id}      - Get job
///   DELETE /system/cron-jobs/{id}      - Delete job
///   POST   /system/cron-jobs/{id}/run  - Run job now
///
/// /health                      - Health check (no auth)
/// ```
pub fn create_router(state: Arc<AppState>) -> Router {
    let cron_routes = Router::new()
        .route(
            "/",
            get(cron_jobs::list_jobs).post(cron_jobs::create_job),
        )
        .route(
            "/{id}",
            get(cron_jobs::get_job).delete(cron_jobs::delete_job),
        )
        .route("/{id}/run", post(cron_jobs::run_job))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token))
        .with_state(state.clone());

    let health_route = Router::new()
        .route("/health", get(health_check))
        .with_state(state);

    Router::new()
        .nest("/system/cron-jobs", cron_routes)
        .merge(health_route)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
