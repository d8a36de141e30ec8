//! Router configuration for the event registration service.

use crate::error::AppError;
use crate::handlers::{events, health, registrations};
use crate::middleware::correlation_id;
use crate::state::AppState;
use axum::{
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use event_registration_core::EventRepository;
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

/// Build the complete Axum router.
///
/// # Routes
///
/// - `GET /health` - Liveness
/// - `GET /ready` - Readiness (pings the datastore)
/// - `POST /api/event/create` - Create an event
/// - `GET /api/event/get-all-events` - List events with registrants
/// - `POST /api/event/register` - Register for an event
/// - `DELETE /api/event/:event_id/user/:email` - Cancel a registration
/// - `DELETE /api/event/cancel-registration` - Cancel a registration (JSON body)
///
/// Anything else is answered with 404 `{"error": "Route not found"}`.
///
/// # Example
///
/// ```
/// use event_registration_testing::{test_clock, InMemoryEventRepository};
/// use event_registration_web::{build_router, AppState};
/// use std::sync::Arc;
///
/// let state = AppState::new(InMemoryEventRepository::new(), Arc::new(test_clock()));
/// let app = build_router(state);
/// ```
pub fn build_router<R>(state: AppState<R>) -> Router
where
    R: EventRepository + 'static,
{
    let api_routes = Router::new()
        .route("/create", post(events::create_event::<R>))
        .route("/get-all-events", get(events::list_events::<R>))
        .route("/register", post(registrations::register::<R>))
        .route(
            "/cancel-registration",
            delete(registrations::cancel_registration::<R>),
        )
        .route(
            "/:event_id/user/:email",
            delete(registrations::cancel_user_registration::<R>),
        );

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check::<R>))
        .nest("/api/event", api_routes)
        .fallback(route_not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(correlation_id))
        .layer(CatchPanicLayer::custom(handle_panic))
}

#[allow(clippy::unused_async)]
async fn route_not_found() -> AppError {
    AppError::not_found("Route not found", "ROUTE_NOT_FOUND")
}

#[allow(clippy::needless_pass_by_value)]
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    AppError::internal("Internal Server Error")
        .with_source(anyhow::anyhow!("handler panicked: {detail}"))
        .into_response()
}
