use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use reviewer_core::DomainError;
use reviewer_types::api::{ErrorBody, ErrorResponse};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Request could not be read at all. Rendered as `{"error": "<msg>"}`.
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Domain(err) => match err {
                DomainError::Validation(_) | DomainError::TeamExists => StatusCode::BAD_REQUEST,
                DomainError::PrExists
                | DomainError::PrMerged
                | DomainError::NotAssigned
                | DomainError::NoCandidate
                | DomainError::ConcurrentUpdate => StatusCode::CONFLICT,
                DomainError::NotFound(_) => StatusCode::NOT_FOUND,
                DomainError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::BadRequest(message) => {
                (status, Json(json!({ "error": message }))).into_response()
            }
            Self::Domain(err) => {
                let message = if let DomainError::Store { .. } = err {
                    // Backend detail stays in the logs.
                    error!("Store failure: {}", err);
                    "internal server error".to_string()
                } else {
                    err.to_string()
                };
                let body = ErrorResponse {
                    error: ErrorBody {
                        code: err.code().to_string(),
                        message,
                    },
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

/// Unwraps a JSON body, collapsing every rejection into one client error.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            warn!("Rejected request body: {}", rejection.body_text());
            Err(ApiError::BadRequest("Invalid JSON format".into()))
        }
    }
}

/// Required query parameter; an empty value counts as missing.
pub fn required_param(value: Option<String>, name: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::BadRequest(format!("{} is required", name))),
    }
}
