//! # Event Registration Web
//!
//! Axum HTTP service for event registration.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Imperative Shell (Axum)         │  ← HTTP, JSON, correlation ids
//! │  - Request parsing (JsonBody)           │  ← Tracing, metrics
//! │  - Response serialization (AppError)    │
//! ├─────────────────────────────────────────┤
//! │         Validation (core)               │  ← Pure, no I/O
//! ├─────────────────────────────────────────┤
//! │         EventRepository                 │  ← PostgreSQL or in-memory
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Request Flow
//!
//! 1. **HTTP Request** arrives at an Axum handler
//! 2. **Validate** the payload with `event_registration_core::validation`
//! 3. **Call** the repository (registration and cancellation are atomic there)
//! 4. **Record** metrics
//! 5. **Map** the result or `RegistrationError` to an HTTP response

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use config::Config;
pub use error::AppError;
pub use extractors::{CorrelationId, JsonBody};
pub use middleware::{correlation_id, CORRELATION_ID_HEADER};
pub use router::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
