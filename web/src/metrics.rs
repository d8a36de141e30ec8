//! Business metrics for the event registration service.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `event_registration_events_created_total` - Total events created
//! - `event_registration_registrations_total{status}` - Registrations by status
//!   (`created`, `rejected`, `cancelled`); rejections also carry a `reason`
//!
//! ## Gauges
//! - `event_registration_remaining_capacity{event_id}` - Seats left per event
//!
//! The gauge holds one series per event ever registered against and series
//! are never removed, so its cardinality grows with the number of events.
//!
//! Without an installed recorder every call is a no-op, so handlers record
//! unconditionally.

use event_registration_core::RegistrationError;
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns error if a recorder is already installed or the listener cannot bind.
pub fn install_exporter(addr: SocketAddr) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics exporter: {e}"))?;

    register_metrics();
    tracing::info!(%addr, "Metrics server started - available at http://{addr}/metrics");
    Ok(())
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        "event_registration_events_created_total",
        "Total number of events created"
    );
    describe_counter!(
        "event_registration_registrations_total",
        "Total number of registrations by status (created, rejected, cancelled)"
    );
    describe_gauge!(
        "event_registration_remaining_capacity",
        "Seats still available per event"
    );
}

/// Record an event created.
pub fn record_event_created() {
    metrics::counter!("event_registration_events_created_total").increment(1);
    tracing::debug!("Recorded event_created metric");
}

/// Record a successful registration.
pub fn record_registration_created() {
    metrics::counter!("event_registration_registrations_total", "status" => "created").increment(1);
}

/// Record a rejected registration attempt.
pub fn record_registration_rejected(error: &RegistrationError) {
    let reason = rejection_reason(error);
    metrics::counter!(
        "event_registration_registrations_total",
        "status" => "rejected",
        "reason" => reason
    )
    .increment(1);
    tracing::debug!(reason, "Recorded registration_rejected metric");
}

/// Record a cancelled registration.
pub fn record_registration_cancelled() {
    metrics::counter!("event_registration_registrations_total", "status" => "cancelled")
        .increment(1);
}

/// Update the remaining-capacity gauge for an event.
///
/// Creates a new series the first time an `event_id` is seen.
pub fn update_remaining_capacity(event_id: &str, remaining: u32) {
    metrics::gauge!("event_registration_remaining_capacity", "event_id" => event_id.to_owned())
        .set(f64::from(remaining));
}

/// Label value for a rejected registration.
const fn rejection_reason(error: &RegistrationError) -> &'static str {
    match error {
        RegistrationError::Validation(_) => "invalid",
        RegistrationError::EventNotFound { .. } => "not_found",
        RegistrationError::EventConcluded { .. } => "concluded",
        RegistrationError::EventFull { .. } => "full",
        RegistrationError::AlreadyRegistered { .. } => "duplicate",
        RegistrationError::DuplicateEvent { .. }
        | RegistrationError::RegistrationNotFound { .. }
        | RegistrationError::Storage(_) => "error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_registration_core::EventId;

    #[test]
    fn test_rejection_reasons() {
        assert_eq!(
            rejection_reason(&RegistrationError::EventFull {
                capacity: 1,
                registrations: 1
            }),
            "full"
        );
        assert_eq!(
            rejection_reason(&RegistrationError::EventConcluded {
                event_id: EventId::new("a")
            }),
            "concluded"
        );
        assert_eq!(
            rejection_reason(&RegistrationError::Storage("down".to_string())),
            "error"
        );
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        register_metrics();
        record_event_created();
        record_registration_created();
        record_registration_cancelled();
        update_remaining_capacity("meetup", 3);
    }
}
