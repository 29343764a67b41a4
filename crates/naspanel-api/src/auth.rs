//! Bearer-token authentication gate.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// Accepted bearer tokens. A disabled gate lets every request through.
#[derive(Debug, Clone, Default)]
pub struct AuthGate {
    enabled: bool,
    tokens: Vec<String>,
}

impl AuthGate {
    pub fn new(tokens: Vec<String>) -> Self {
        Self {
            enabled: true,
            tokens,
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Check an `Authorization` header value.
    pub fn allows(&self, header: Option<&str>) -> bool {
        if !self.enabled {
            return true;
        }
        let Some(token) = header.and_then(|h| h.strip_prefix("Bearer ")) else {
            return false;
        };
        let token = token.trim();
        !token.is_empty() && self.tokens.iter().any(|t| t == token)
    }
}

/// Middleware rejecting requests without an accepted bearer token.
pub async fn require_token(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if !state.auth.allows(header) {
        debug!("Rejected unauthenticated request to {}", request.uri().path());
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(request).await)
}
