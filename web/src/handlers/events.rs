//! Event endpoints.
//!
//! - `POST /api/event/create` - Create an event
//! - `GET /api/event/get-all-events` - List events with their registrants

use crate::extractors::{CorrelationId, JsonBody};
use crate::metrics;
use crate::state::AppState;
use crate::WebResult;
use axum::{extract::State, http::StatusCode, Json};
use event_registration_core::types::{CreateEventPayload, Event, EventWithRegistrants};
use event_registration_core::validation::validate_event;
use event_registration_core::{EventRepository, RegistrationError};
use serde::Serialize;

/// Response after creating an event.
#[derive(Debug, Serialize)]
pub struct CreateEventResponse {
    /// Success message
    pub message: &'static str,
    /// The stored event
    pub event: Event,
}

/// Response for listing events.
#[derive(Debug, Serialize)]
pub struct ListEventsResponse {
    /// Number of events
    pub count: usize,
    /// Events ordered by date-time, each with its registered users
    pub events: Vec<EventWithRegistrants>,
}

/// Create a new event.
///
/// Duplicate identifiers are caught up front, and again by the unique
/// constraint if a concurrent request wins the race.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/event/create \
///   -H "Content-Type: application/json" \
///   -d '{"id": "rustconf", "title": "RustConf", "dateTime": "2030-09-10T09:00:00Z",
///        "location": "Montreal", "capacity": 300}'
/// ```
///
/// # Errors
///
/// - 400 if a field is missing, the date is not ISO 8601, or the capacity is out of range
/// - 409 if the identifier is taken
/// - 500 on datastore failure
pub async fn create_event<R: EventRepository>(
    State(state): State<AppState<R>>,
    correlation_id: CorrelationId,
    JsonBody(payload): JsonBody<CreateEventPayload>,
) -> WebResult<(StatusCode, Json<CreateEventResponse>)> {
    let new_event = validate_event(&payload)?;

    if state.repository.event_exists(&new_event.id).await? {
        return Err(RegistrationError::DuplicateEvent {
            event_id: new_event.id,
        }
        .into());
    }

    let event = state.repository.create_event(&new_event).await?;

    metrics::record_event_created();
    metrics::update_remaining_capacity(event.id.as_str(), event.remaining_capacity());
    tracing::info!(
        correlation_id = %correlation_id.0,
        event_id = %event.id,
        capacity = event.capacity,
        "Event created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateEventResponse {
            message: "Event created successfully",
            event,
        }),
    ))
}

/// List every event with its registered users.
///
/// # Errors
///
/// - 500 on datastore failure
pub async fn list_events<R: EventRepository>(
    State(state): State<AppState<R>>,
) -> WebResult<Json<ListEventsResponse>> {
    let events = state.repository.list_events_with_registrants().await?;

    Ok(Json(ListEventsResponse {
        count: events.len(),
        events,
    }))
}
