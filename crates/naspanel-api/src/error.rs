//! API error types and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use naspanel_cron::CronError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors returned by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Cron(#[from] CronError),

    /// Request body could not be read.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Missing or invalid bearer token")]
    Unauthorized,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Cron(e) => match e {
                CronError::InvalidSchedule { .. } | CronError::InvalidCommand => {
                    StatusCode::BAD_REQUEST
                }
                CronError::NotFound(_) => StatusCode::NOT_FOUND,
                CronError::Command(_) => StatusCode::BAD_GATEWAY,
                CronError::InvalidTimezone(_)
                | CronError::Persistence(_)
                | CronError::AlreadyStarted => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let mut body = json!({
            "success": false,
            "error": self.to_string(),
        });
        if let ApiError::Cron(CronError::Command(exec)) = &self {
            body["exitCode"] = json!(exec.exit_code());
            body["stderr"] = json!(exec.stderr());
            body["timedOut"] = json!(exec.is_timeout());
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use naspanel_exec::{ExecError, ExitReason};

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        let invalid = ApiError::from(CronError::InvalidSchedule {
            expr: "* * * *".to_string(),
            reason: "expected 5 or 6 fields, found 4".to_string(),
        });
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(CronError::InvalidCommand).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(CronError::NotFound("x".to_string())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(CronError::Persistence("disk full".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let response = ApiError::from(CronError::NotFound("abc".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Job not found: abc");
        assert!(body.get("stderr").is_none());
    }

    #[tokio::test]
    async fn test_command_failure_body() {
        let err = ApiError::from(CronError::Command(ExecError::Failed {
            exit: ExitReason::Code(2),
            stdout: "partial".to_string(),
            stderr: "disk not found".to_string(),
        }));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["exitCode"], 2);
        assert_eq!(body["stderr"], "disk not found");
        assert_eq!(body["timedOut"], false);
    }

    #[tokio::test]
    async fn test_timeout_body() {
        let err = ApiError::from(CronError::Command(ExecError::Timeout {
            timeout_ms: 500,
            stdout: String::new(),
            stderr: String::new(),
        }));
        let body = body_json(err.into_response()).await;
        assert_eq!(body["timedOut"], true);
        assert!(body["exitCode"].is_null());
    }
}
