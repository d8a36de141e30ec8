//! Application state for Axum handlers.

use chrono::{DateTime, Utc};
use event_registration_core::{Clock, EventRepository};
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Generic over the repository so the same router serves `PostgreSQL` in
/// production and the in-memory repository in tests.
pub struct AppState<R> {
    /// Event and registration storage
    pub repository: Arc<R>,
    /// Source of "now" for the concluded-event check
    pub clock: Arc<dyn Clock>,
}

// Manual impl: `R` itself need not be `Clone`.
impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R: EventRepository> AppState<R> {
    /// Create a new application state.
    #[must_use]
    pub fn new(repository: R, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository: Arc::new(repository),
            clock,
        }
    }

    /// Current time according to the injected clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
