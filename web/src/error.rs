//! Error types for web handlers.
//!
//! This module bridges domain errors and HTTP responses. Every error is
//! rendered as a JSON object with an `error` message, a machine-readable
//! `code`, and whatever context the failure carries:
//!
//! ```json
//! {
//!   "error": "Event is at full capacity",
//!   "code": "EVENT_FULL",
//!   "capacity": 50,
//!   "current_registrations": 50,
//!   "available": false
//! }
//! ```

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use event_registration_core::{RegistrationError, ValidationError};
use serde_json::{Map, Value};
use std::fmt;

/// Application error type for web handlers.
///
/// Implements Axum's `IntoResponse`, so handlers can return
/// [`WebResult`](crate::WebResult) and use `?` on domain errors.
///
/// # Examples
///
/// ```
/// use axum::http::StatusCode;
/// use event_registration_core::{EventId, RegistrationError};
/// use event_registration_web::AppError;
///
/// let err = AppError::from(RegistrationError::EventNotFound {
///     event_id: EventId::new("meetup"),
/// });
/// assert_eq!(err.status(), StatusCode::NOT_FOUND);
/// assert_eq!(err.code(), "EVENT_NOT_FOUND");
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Extra fields merged into the response body
    context: Map<String, Value>,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: code.into(),
            context: Map::new(),
            source: None,
        }
    }

    /// Attach a source error. It is logged, never sent to the client.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Add a context field to the response body.
    #[must_use]
    pub fn with_context(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, code)
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message, code)
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message, code)
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message,
            "INTERNAL_SERVER_ERROR",
        )
    }

    /// HTTP status this error renders with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        } else {
            tracing::debug!(status = %self.status, code = %self.code, "Request rejected");
        }

        let mut body = self.context;
        body.insert("error".to_string(), Value::String(self.message));
        body.insert("code".to_string(), Value::String(self.code));

        (self.status, Json(Value::Object(body))).into_response()
    }
}

impl From<RegistrationError> for AppError {
    fn from(err: RegistrationError) -> Self {
        let message = err.to_string();

        match err {
            RegistrationError::Validation(validation) => validation.into(),
            RegistrationError::EventNotFound { event_id } => {
                Self::not_found(message, "EVENT_NOT_FOUND")
                    .with_context("event_id", event_id.to_string())
            }
            RegistrationError::EventConcluded { event_id } => {
                Self::bad_request(message, "EVENT_CONCLUDED")
                    .with_context("event_id", event_id.to_string())
                    .with_context("status", "completed")
            }
            RegistrationError::EventFull {
                capacity,
                registrations,
            } => Self::bad_request(message, "EVENT_FULL")
                .with_context("capacity", capacity)
                .with_context("current_registrations", registrations)
                .with_context("available", false),
            RegistrationError::AlreadyRegistered { email } => {
                Self::conflict(message, "ALREADY_REGISTERED").with_context("email", email)
            }
            RegistrationError::DuplicateEvent { event_id } => {
                Self::conflict(message, "DUPLICATE_EVENT")
                    .with_context("existing_event_id", event_id.to_string())
            }
            RegistrationError::RegistrationNotFound { event_id, email } => {
                Self::not_found(message, "REGISTRATION_NOT_FOUND")
                    .with_context("event_id", event_id.to_string())
                    .with_context("email", email)
            }
            RegistrationError::Storage(details) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "DATABASE_ERROR",
            )
            .with_context("details", details.clone())
            .with_source(anyhow::anyhow!(details)),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        let error = Self::bad_request(err.to_string(), "VALIDATION_ERROR");

        match err {
            ValidationError::MissingFields(missing) => error.with_context(
                "missing_fields",
                serde_json::to_value(missing).unwrap_or_default(),
            ),
            ValidationError::InvalidEmail => error.with_context("example", "user@example.com"),
            ValidationError::MissingEventFields
            | ValidationError::InvalidDateTime
            | ValidationError::InvalidCapacity => error,
        }
    }
}

/// Malformed or missing JSON bodies are a client error.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text(), "INVALID_JSON")
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}
