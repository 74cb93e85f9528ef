use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::DomainError;

/// Failure returned by a dispatcher branch.
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    Unauthorized,
    NotFound {
        message: String,
        available: Vec<&'static str>,
    },
    MethodNotAllowed {
        allowed: Vec<&'static str>,
    },
    Internal {
        message: String,
        details: String,
    },
}

impl ApiError {
    /// Log `err` and wrap it as a 500 carrying `message` plus the error text.
    pub fn internal(message: &str, err: impl std::fmt::Display) -> Self {
        tracing::error!("{}: {}", message, err);
        ApiError::Internal {
            message: message.to_string(),
            details: err.to_string(),
        }
    }

    /// Turn a service error into a response, using `context` as the
    /// generic message when it is a server-side failure.
    pub fn from_domain(context: &str, err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::Validation(msg),
            DomainError::NotFound(what) => ApiError::NotFound {
                message: format!("Not found: {}", what),
                available: Vec::new(),
            },
            other => ApiError::internal(context, other.detail()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::from_domain("Request failed", err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(msg) => {
                tracing::warn!("Rejected request: {}", msg);
                (status, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::Unauthorized => {
                let mut res = (status, Json(json!({ "error": "Unauthorized" }))).into_response();
                res.headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                res
            }
            ApiError::NotFound { message, available } => {
                let body = if available.is_empty() {
                    json!({ "error": message })
                } else {
                    json!({ "error": message, "available": available })
                };
                (status, Json(body)).into_response()
            }
            ApiError::MethodNotAllowed { allowed } => {
                let mut res = (
                    status,
                    Json(json!({ "error": "Method not allowed", "allowed": allowed })),
                )
                    .into_response();
                if let Ok(value) = HeaderValue::from_str(&allowed.join(", ")) {
                    res.headers_mut().insert(header::ALLOW, value);
                }
                res
            }
            ApiError::Internal { message, details } => (
                status,
                Json(json!({ "error": message, "details": details })),
            )
                .into_response(),
        }
    }
}

pub type ApiResult = Result<Response, ApiError>;
