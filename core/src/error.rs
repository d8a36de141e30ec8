//! Error types for event and registration operations.

use crate::types::EventId;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Result type alias for registration operations.
pub type Result<T> = std::result::Result<T, RegistrationError>;

/// Which required fields of a payload were absent.
///
/// Serializes as an object mapping every required field to `true` when it
/// was missing, e.g. `{"email": true, "event_id": false, "name": false}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MissingFields(BTreeMap<&'static str, bool>);

impl MissingFields {
    /// Build from `(field, present)` pairs.
    ///
    /// Returns `None` when every field is present.
    #[must_use]
    pub fn check<const N: usize>(fields: [(&'static str, bool); N]) -> Option<Self> {
        let missing: BTreeMap<_, _> = fields
            .into_iter()
            .map(|(name, present)| (name, !present))
            .collect();
        missing.values().any(|m| *m).then_some(Self(missing))
    }

    /// Whether `field` was missing.
    #[must_use]
    pub fn is_missing(&self, field: &str) -> bool {
        self.0.get(field).copied().unwrap_or(false)
    }
}

/// Payload-shape failures. Always the caller's fault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// One of `id`, `title`, `dateTime`, `location`, `capacity` is absent.
    #[error("All event fields are required.")]
    MissingEventFields,

    /// `dateTime` is not an ISO 8601 date or date-time.
    #[error("Invalid date/time format (must be ISO).")]
    InvalidDateTime,

    /// `capacity` is not an integer in `1..=1000`.
    #[error("Capacity must be between 1 and 1000.")]
    InvalidCapacity,

    /// Required registration or cancellation fields are absent.
    #[error("All fields are required")]
    MissingFields(MissingFields),

    /// Email does not look like `local@domain.tld`.
    #[error("Invalid email format")]
    InvalidEmail,
}

/// Everything that can go wrong while creating events or managing registrations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The request payload is malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No event with this identifier.
    #[error("Event not found")]
    EventNotFound {
        /// Identifier that was looked up
        event_id: EventId,
    },

    /// The event is scheduled in the past.
    #[error("Event has already concluded")]
    EventConcluded {
        /// The concluded event
        event_id: EventId,
    },

    /// Every seat is taken.
    #[error("Event is at full capacity")]
    EventFull {
        /// Event capacity
        capacity: u32,
        /// Registrations at the time of the check
        registrations: u32,
    },

    /// This email already holds a registration for the event.
    #[error("Email already registered for this event")]
    AlreadyRegistered {
        /// The duplicate email
        email: String,
    },

    /// An event with this identifier already exists.
    #[error("Event with this ID already exists")]
    DuplicateEvent {
        /// The conflicting identifier
        event_id: EventId,
    },

    /// No registration for this email on this event.
    #[error("Registration not found")]
    RegistrationNotFound {
        /// Event that was searched
        event_id: EventId,
        /// Email that was searched
        email: String,
    },

    /// The datastore failed.
    #[error("Database error: {0}")]
    Storage(String),
}

impl RegistrationError {
    /// Returns `true` if the caller can fix the request and retry.
    ///
    /// # Examples
    ///
    /// ```
    /// # use event_registration_core::{RegistrationError, ValidationError};
    /// assert!(RegistrationError::from(ValidationError::InvalidEmail).is_client_error());
    /// assert!(!RegistrationError::Storage("connection reset".into()).is_client_error());
    /// ```
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}
