//! Registration endpoints.
//!
//! - `POST /api/event/register` - Register a participant
//! - `DELETE /api/event/:event_id/user/:email` - Cancel by path
//! - `DELETE /api/event/cancel-registration` - Cancel by JSON body
//!
//! Both cancellation routes share validation and storage; they differ only
//! in where the event identifier and email come from.

use crate::extractors::{CorrelationId, JsonBody};
use crate::metrics;
use crate::state::AppState;
use crate::WebResult;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use event_registration_core::types::{
    CancellationPayload, EventId, RawId, Registration, RegistrationPayload,
};
use event_registration_core::validation::{validate_cancellation, validate_registration};
use event_registration_core::{EventRepository, RegistrationError};
use serde::Serialize;

/// Response after a successful registration.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// Always `true`
    pub success: bool,
    /// The stored registration
    pub registration: Registration,
    /// Seats left after this registration
    pub remaining_capacity: u32,
    /// Success message
    pub message: &'static str,
}

/// Response after a successful cancellation.
#[derive(Debug, Serialize)]
pub struct CancelResponse {
    /// Always `true`
    pub success: bool,
    /// Success message
    pub message: &'static str,
    /// Event the registration belonged to
    pub event_id: EventId,
    /// Email whose registration was removed
    pub email: String,
}

/// Register a participant for an event.
///
/// Existence, schedule, capacity and duplicate checks run atomically in the
/// repository; the reported remaining capacity reflects this registration.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/event/register \
///   -H "Content-Type: application/json" \
///   -d '{"event_id": "rustconf", "name": "Ada", "email": "ada@example.com"}'
/// ```
///
/// # Errors
///
/// - 400 for missing fields, a malformed email, a concluded event, or a full event
/// - 404 if the event does not exist
/// - 409 if the email is already registered for the event
/// - 500 on datastore failure
pub async fn register<R: EventRepository>(
    State(state): State<AppState<R>>,
    correlation_id: CorrelationId,
    JsonBody(payload): JsonBody<RegistrationPayload>,
) -> WebResult<(StatusCode, Json<RegisterResponse>)> {
    let result = match validate_registration(&payload) {
        Ok(request) => state.repository.register(&request, state.now()).await,
        Err(err) => Err(err.into()),
    };

    let receipt = result.inspect_err(|err: &RegistrationError| {
        if err.is_client_error() {
            metrics::record_registration_rejected(err);
        }
    })?;

    metrics::record_registration_created();
    metrics::update_remaining_capacity(
        receipt.registration.event_id.as_str(),
        receipt.remaining_capacity,
    );
    tracing::info!(
        correlation_id = %correlation_id.0,
        event_id = %receipt.registration.event_id,
        remaining_capacity = receipt.remaining_capacity,
        "Participant registered"
    );

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            registration: receipt.registration,
            remaining_capacity: receipt.remaining_capacity,
            message: "Successfully registered for event",
        }),
    ))
}

/// Cancel a registration identified by path segments.
///
/// # Errors
///
/// - 400 for a malformed email
/// - 404 if no such registration exists
/// - 500 on datastore failure
pub async fn cancel_user_registration<R: EventRepository>(
    State(state): State<AppState<R>>,
    correlation_id: CorrelationId,
    Path((event_id, email)): Path<(String, String)>,
) -> WebResult<Json<CancelResponse>> {
    let payload = CancellationPayload {
        event_id: Some(RawId::Text(event_id)),
        email: Some(email),
    };

    cancel(&state, correlation_id, &payload).await
}

/// Cancel a registration identified by a `{event_id, email}` body.
///
/// # Errors
///
/// - 400 for missing fields or a malformed email
/// - 404 if no such registration exists
/// - 500 on datastore failure
pub async fn cancel_registration<R: EventRepository>(
    State(state): State<AppState<R>>,
    correlation_id: CorrelationId,
    JsonBody(payload): JsonBody<CancellationPayload>,
) -> WebResult<Json<CancelResponse>> {
    cancel(&state, correlation_id, &payload).await
}

async fn cancel<R: EventRepository>(
    state: &AppState<R>,
    correlation_id: CorrelationId,
    payload: &CancellationPayload,
) -> WebResult<Json<CancelResponse>> {
    let request = validate_cancellation(payload)?;
    let event = state.repository.cancel(&request).await?;

    metrics::record_registration_cancelled();
    metrics::update_remaining_capacity(event.id.as_str(), event.remaining_capacity());
    tracing::info!(
        correlation_id = %correlation_id.0,
        event_id = %request.event_id,
        registrations = event.registrations,
        "Registration cancelled"
    );

    Ok(Json(CancelResponse {
        success: true,
        message: "Registration cancelled successfully",
        event_id: request.event_id,
        email: request.email,
    }))
}
