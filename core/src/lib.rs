//! Core domain for the event registration service.
//!
//! This crate holds everything that does not touch I/O:
//!
//! - **Types**: events, registrations and the request payloads that create them
//! - **Validation**: pure predicates over payloads and fetched event rows
//! - **Errors**: the domain error taxonomy shared by every layer
//! - **Repository**: the datastore seam implemented by the Postgres and
//!   in-memory backends
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        HTTP shell (web crate)           │  ← JSON, status codes
//! ├─────────────────────────────────────────┤
//! │        Validation (this crate)          │  ← Pure, no I/O
//! ├─────────────────────────────────────────┤
//! │        EventRepository (trait)          │  ← Postgres / in-memory
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use event_registration_core::validation::validate_event;
//! use event_registration_core::types::CreateEventPayload;
//!
//! let payload: CreateEventPayload = serde_json::from_value(serde_json::json!({
//!     "id": "rustconf-2030",
//!     "title": "RustConf",
//!     "dateTime": "2030-09-10T09:00:00Z",
//!     "location": "Montreal",
//!     "capacity": 250
//! }))
//! .unwrap();
//!
//! let event = validate_event(&payload).unwrap();
//! assert_eq!(event.capacity, 250);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod environment;
pub mod error;
pub mod repository;
pub mod types;
pub mod validation;

pub use environment::{Clock, SystemClock};
pub use error::{MissingFields, RegistrationError, Result, ValidationError};
pub use repository::EventRepository;
pub use types::{
    CancellationPayload, CancellationRequest, CreateEventPayload, Event, EventId,
    EventWithRegistrants, NewEvent, RawId, Registrant, Registration, RegistrationPayload,
    RegistrationReceipt, RegistrationRequest,
};
