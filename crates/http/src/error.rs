//! Error type shared by every handler, and the JSON envelope it renders to:
//!
//! ```json
//! {"error": {"code", "message", "details": [..], "trace_id", "timestamp"}}
//! ```

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;
use validator::{ValidationErrors, ValidationErrorsKind};

#[derive(Error, Debug)]
pub enum AppError {
    /// Request could not be bound or failed a field rule (422)
    #[error("validation error: {message}")]
    Validation { message: String, details: Vec<Value> },

    #[error("conflict: {message}")]
    Conflict { message: String, details: Vec<Value> },

    #[error("not found: {0}")]
    NotFound(String),

    /// Missing or rejected credentials; rendered with a Bearer challenge
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Well-formed request the handler refuses, e.g. an inverted range
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(details: Vec<Value>, message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn conflict(details: Vec<Value>, message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code placed in the envelope
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::Conflict { .. } => "conflict",
            AppError::NotFound(_) => "not_found",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::BadRequest(_) => "bad_request",
            AppError::Internal(_) => "internal_error",
        }
    }

    fn into_parts(self) -> (String, Vec<Value>) {
        match self {
            AppError::Validation { message, details } | AppError::Conflict { message, details } => {
                (message, details)
            }
            AppError::NotFound(message)
            | AppError::Unauthorized(message)
            | AppError::Forbidden(message)
            | AppError::BadRequest(message) => (message, Vec::new()),
            AppError::Internal(err) => (format!("{:#}", err), Vec::new()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details = Vec::new();
        flatten_validation_errors(None, &errors, &mut details);
        details.sort_by(|a, b| a["field"].as_str().cmp(&b["field"].as_str()));

        let message = details
            .iter()
            .filter_map(|detail| detail["message"].as_str())
            .collect::<Vec<_>>()
            .join("; ");

        AppError::validation(details, message)
    }
}

/// One detail per failed rule, keyed by a dotted path (`shelf.name`,
/// `tags[2]`).
fn flatten_validation_errors(prefix: Option<&str>, errors: &ValidationErrors, out: &mut Vec<Value>) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(prefix) => format!("{}.{}", prefix, field),
            None => field.to_string(),
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = match &error.message {
                        Some(message) => message.to_string(),
                        None => format!("{} failed '{}' check", path, error.code),
                    };
                    out.push(json!({
                        "field": path,
                        "code": error.code,
                        "message": message,
                    }));
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                flatten_validation_errors(Some(&path), nested, out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    flatten_validation_errors(Some(&format!("{}[{}]", path, index)), nested, out);
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let trace_id = Uuid::new_v4();
        let status = self.status();
        let code = self.code();
        let (message, details) = self.into_parts();

        if status.is_server_error() {
            tracing::error!(
                error_id = %trace_id,
                error_code = code,
                status_code = status.as_u16(),
                message = %message,
                "request failed"
            );
        } else {
            tracing::warn!(
                error_id = %trace_id,
                error_code = code,
                status_code = status.as_u16(),
                "request rejected"
            );
        }

        // Release builds never leak internal error chains.
        let message = if cfg!(debug_assertions) || !status.is_server_error() {
            message
        } else {
            "An internal server error occurred".to_string()
        };

        let body = json!({
            "error": {
                "code": code,
                "message": message,
                "details": details,
                "trace_id": trace_id.to_string(),
                "timestamp": OffsetDateTime::now_utc().to_string(),
            }
        });

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
