//! Event repository trait.

use crate::error::Result;
use crate::types::{
    CancellationRequest, Event, EventId, EventWithRegistrants, NewEvent, RegistrationReceipt,
    RegistrationRequest,
};
use chrono::{DateTime, Utc};
use std::future::Future;

/// Event and registration storage.
///
/// This trait abstracts over the datastore (`PostgreSQL` in production, an
/// in-memory map in tests). Implementations own the atomicity of
/// [`register`](Self::register) and [`cancel`](Self::cancel): the counter on
/// the event and the registration rows must change together.
pub trait EventRepository: Send + Sync {
    /// Check whether an event with this identifier exists.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationError::Storage` if the datastore fails.
    fn event_exists(&self, event_id: &EventId) -> impl Future<Output = Result<bool>> + Send;

    /// Insert a new event with zero registrations.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The identifier is taken → `RegistrationError::DuplicateEvent`
    /// - The datastore fails → `RegistrationError::Storage`
    fn create_event(&self, event: &NewEvent) -> impl Future<Output = Result<Event>> + Send;

    /// Fetch a single event.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationError::Storage` if the datastore fails.
    fn find_event(&self, event_id: &EventId)
    -> impl Future<Output = Result<Option<Event>>> + Send;

    /// List every event ordered by date-time, each with its registrants.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationError::Storage` if the datastore fails.
    fn list_events_with_registrants(
        &self,
    ) -> impl Future<Output = Result<Vec<EventWithRegistrants>>> + Send;

    /// Register a participant and bump the event counter atomically.
    ///
    /// `now` decides whether the event has already concluded.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No such event → `RegistrationError::EventNotFound`
    /// - The event is in the past → `RegistrationError::EventConcluded`
    /// - No seats left → `RegistrationError::EventFull`
    /// - The email is already registered → `RegistrationError::AlreadyRegistered`
    /// - The datastore fails → `RegistrationError::Storage`
    fn register(
        &self,
        request: &RegistrationRequest,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<RegistrationReceipt>> + Send;

    /// Remove a registration and decrement the event counter atomically.
    ///
    /// Returns the event as it stands after the cancellation.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No matching registration → `RegistrationError::RegistrationNotFound`
    /// - The datastore fails → `RegistrationError::Storage`
    fn cancel(&self, request: &CancellationRequest) -> impl Future<Output = Result<Event>> + Send;

    /// Verify the datastore is reachable.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationError::Storage` if the datastore is unreachable.
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;
}
