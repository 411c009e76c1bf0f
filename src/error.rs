//! Error types for the dispatch server.
//!
//! Uses thiserror for ergonomic error definitions that integrate
//! with axum's response system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // FSM errors: missing credentials, non-2xx, `type: "error"` bodies
    #[error(transparent)]
    Zuper(#[from] zuper_client::Error),

    #[error(transparent)]
    Llm(#[from] zuper_llm::Error),

    /// The API accepted an assignment but the job shows no assignees afterwards.
    #[error("Assignment verification failed: {0}")]
    Unverified(String),

    // Validation errors
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Zuper(e) if e.is_missing_credential() => StatusCode::UNAUTHORIZED,
            Self::Zuper(zuper_client::Error::Domain(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Zuper(_) => StatusCode::BAD_GATEWAY,

            Self::Llm(zuper_llm::Error::NoProviders) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Llm(zuper_llm::Error::RateLimitExceeded) => StatusCode::TOO_MANY_REQUESTS,
            Self::Llm(_) => StatusCode::BAD_GATEWAY,

            Self::Unverified(_) => StatusCode::CONFLICT,
            Self::InvalidParams(_) | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Zuper(e) if e.is_missing_credential() => "MISSING_CREDENTIALS",
            Self::Zuper(zuper_client::Error::Http { .. }) => "ZUPER_API_ERROR",
            Self::Zuper(zuper_client::Error::Domain(_)) => "ZUPER_REJECTED",
            Self::Zuper(_) => "ZUPER_UNREACHABLE",
            Self::Llm(zuper_llm::Error::NoProviders) => "LLM_UNAVAILABLE",
            Self::Llm(zuper_llm::Error::StepLimit(_)) => "AGENT_STEP_LIMIT",
            Self::Llm(_) => "LLM_ERROR",
            Self::Unverified(_) => "ASSIGNMENT_UNVERIFIED",
            Self::InvalidParams(_) => "INVALID_PARAMS",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        let message = self.to_string();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidInput(format!("JSON parsing error: {}", err))
    }
}
