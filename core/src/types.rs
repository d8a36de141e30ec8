//! Domain types for events and registrations.
//!
//! Two families of types live here:
//!
//! - **Payloads** (`*Payload`): what arrives over the wire. Every field is
//!   optional so that missing fields are reported by validation instead of
//!   failing deserialization.
//! - **Validated values** (`NewEvent`, `RegistrationRequest`, ...): what the
//!   repository accepts. They can only be built by the validation layer or
//!   by code that already holds trusted data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Caller-supplied event identifier.
///
/// Identifiers are chosen by whoever creates the event and are stored as
/// text. Numeric identifiers in JSON payloads are accepted and normalized to
/// their decimal form (see [`RawId`]).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Create an event identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// An identifier as it appears in a JSON payload: either a string or an integer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    /// `"id": "rustconf-2030"`
    Text(String),
    /// `"id": 42`
    Integer(i64),
}

impl RawId {
    /// Normalize into an [`EventId`], treating blank strings as absent.
    #[must_use]
    pub fn to_event_id(&self) -> Option<EventId> {
        match self {
            Self::Text(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| EventId::new(trimmed))
            }
            Self::Integer(n) => Some(EventId::new(n.to_string())),
        }
    }
}

// ============================================================================
// Stored records
// ============================================================================

/// A scheduled event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Caller-supplied identifier
    pub id: EventId,
    /// Event title
    pub title: String,
    /// Scheduled start
    pub date_time: DateTime<Utc>,
    /// Venue
    pub location: String,
    /// Maximum number of registrations
    pub capacity: u32,
    /// Current number of registrations
    pub registrations: u32,
}

impl Event {
    /// Seats still available.
    #[must_use]
    pub const fn remaining_capacity(&self) -> u32 {
        self.capacity.saturating_sub(self.registrations)
    }

    /// Whether every seat is taken.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.registrations >= self.capacity
    }

    /// Whether the event is scheduled strictly before `now`.
    #[must_use]
    pub fn has_concluded(&self, now: DateTime<Utc>) -> bool {
        self.date_time < now
    }
}

/// A participant as listed under an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registrant {
    /// Participant name
    pub name: String,
    /// Participant email
    pub email: String,
}

/// A stored registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Event the participant registered for
    pub event_id: EventId,
    /// Participant name
    pub name: String,
    /// Participant email
    pub email: String,
}

/// An event together with everyone registered for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWithRegistrants {
    /// The event row
    #[serde(flatten)]
    pub event: Event,
    /// Registered participants in registration order
    pub registered_users: Vec<Registrant>,
}

/// Outcome of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationReceipt {
    /// The stored registration
    pub registration: Registration,
    /// Seats left after this registration, read from the updated event row
    pub remaining_capacity: u32,
}

// ============================================================================
// Wire payloads
// ============================================================================

/// Body of `POST /create`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateEventPayload {
    /// Event identifier
    pub id: Option<RawId>,
    /// Event title
    pub title: Option<String>,
    /// ISO 8601 date-time
    #[serde(rename = "dateTime")]
    pub date_time: Option<String>,
    /// Venue
    pub location: Option<String>,
    /// Kept as raw JSON so a non-numeric capacity is a validation error
    pub capacity: Option<serde_json::Value>,
}

/// Body of `POST /register`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationPayload {
    /// Event to register for
    pub event_id: Option<RawId>,
    /// Participant name
    pub name: Option<String>,
    /// Participant email
    pub email: Option<String>,
}

/// Body of `DELETE /cancel-registration`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancellationPayload {
    /// Event the registration belongs to
    pub event_id: Option<RawId>,
    /// Participant email
    pub email: Option<String>,
}

// ============================================================================
// Validated commands
// ============================================================================

/// A validated event ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    /// Event identifier
    pub id: EventId,
    /// Event title
    pub title: String,
    /// Scheduled start
    pub date_time: DateTime<Utc>,
    /// Venue
    pub location: String,
    /// Capacity in `1..=1000`
    pub capacity: u32,
}

impl NewEvent {
    /// The stored form of this event before anyone registers.
    #[must_use]
    pub fn into_event(self) -> Event {
        Event {
            id: self.id,
            title: self.title,
            date_time: self.date_time,
            location: self.location,
            capacity: self.capacity,
            registrations: 0,
        }
    }
}

/// A validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    /// Event to register for
    pub event_id: EventId,
    /// Participant name
    pub name: String,
    /// Participant email
    pub email: String,
}

/// A validated cancellation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationRequest {
    /// Event the registration belongs to
    pub event_id: EventId,
    /// Participant email
    pub email: String,
}
