//! Pure validation over request payloads and fetched event rows.
//!
//! Nothing here performs I/O. Payload validators turn a wire payload into a
//! validated command or a [`ValidationError`]; [`check_registration_allowed`]
//! decides whether a fetched event can take one more registration.

use crate::error::{MissingFields, RegistrationError, ValidationError};
use crate::types::{
    CancellationPayload, CancellationRequest, CreateEventPayload, Event, NewEvent, RawId,
    RegistrationPayload, RegistrationRequest,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Smallest accepted capacity.
pub const MIN_CAPACITY: u32 = 1;

/// Largest accepted capacity.
pub const MAX_CAPACITY: u32 = 1000;

/// Naive formats accepted after RFC 3339; interpreted as UTC.
const NAIVE_DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Validate a `POST /create` payload.
///
/// # Errors
///
/// - [`ValidationError::MissingEventFields`] if any field is absent or blank
/// - [`ValidationError::InvalidDateTime`] if `dateTime` does not parse
/// - [`ValidationError::InvalidCapacity`] if `capacity` is not an integer in `1..=1000`
pub fn validate_event(payload: &CreateEventPayload) -> Result<NewEvent, ValidationError> {
    let (Some(id), Some(title), Some(raw_date_time), Some(location), Some(capacity)) = (
        payload.id.as_ref().and_then(RawId::to_event_id),
        non_blank(payload.title.as_deref()),
        non_blank(payload.date_time.as_deref()),
        non_blank(payload.location.as_deref()),
        payload.capacity.as_ref(),
    ) else {
        return Err(ValidationError::MissingEventFields);
    };

    let date_time = parse_date_time(raw_date_time).ok_or(ValidationError::InvalidDateTime)?;
    let capacity = parse_capacity(capacity).ok_or(ValidationError::InvalidCapacity)?;

    Ok(NewEvent {
        id,
        title: title.to_string(),
        date_time,
        location: location.to_string(),
        capacity,
    })
}

/// Validate a `POST /register` payload.
///
/// Only checks shape. Existence, schedule, capacity and duplicates are
/// decided against the stored event by the repository.
///
/// # Errors
///
/// - [`ValidationError::MissingFields`] naming every absent field
/// - [`ValidationError::InvalidEmail`] if the email is malformed
pub fn validate_registration(
    payload: &RegistrationPayload,
) -> Result<RegistrationRequest, ValidationError> {
    let event_id = payload.event_id.as_ref().and_then(RawId::to_event_id);
    let name = non_blank(payload.name.as_deref());
    let email = non_blank(payload.email.as_deref());

    let missing = MissingFields::check([
        ("event_id", event_id.is_some()),
        ("name", name.is_some()),
        ("email", email.is_some()),
    ]);
    let (Some(event_id), Some(name), Some(email)) = (event_id, name, email) else {
        return Err(ValidationError::MissingFields(missing.unwrap_or_default()));
    };

    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(RegistrationRequest {
        event_id,
        name: name.to_string(),
        email: email.to_string(),
    })
}

/// Validate a cancellation, from either the path or the body route.
///
/// # Errors
///
/// - [`ValidationError::MissingFields`] naming every absent field
/// - [`ValidationError::InvalidEmail`] if the email is malformed
pub fn validate_cancellation(
    payload: &CancellationPayload,
) -> Result<CancellationRequest, ValidationError> {
    let event_id = payload.event_id.as_ref().and_then(RawId::to_event_id);
    let email = non_blank(payload.email.as_deref());

    let missing =
        MissingFields::check([("event_id", event_id.is_some()), ("email", email.is_some())]);
    let (Some(event_id), Some(email)) = (event_id, email) else {
        return Err(ValidationError::MissingFields(missing.unwrap_or_default()));
    };

    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(CancellationRequest {
        event_id,
        email: email.to_string(),
    })
}

/// Decide whether `event` can take one more registration at `now`.
///
/// # Errors
///
/// - [`RegistrationError::EventConcluded`] if the event is scheduled before `now`
/// - [`RegistrationError::EventFull`] if `registrations >= capacity`
pub fn check_registration_allowed(
    event: &Event,
    now: DateTime<Utc>,
) -> Result<(), RegistrationError> {
    if event.has_concluded(now) {
        return Err(RegistrationError::EventConcluded {
            event_id: event.id.clone(),
        });
    }

    if event.is_full() {
        return Err(RegistrationError::EventFull {
            capacity: event.capacity,
            registrations: event.registrations,
        });
    }

    Ok(())
}

/// Check an email against `^[^\s@]+@[^\s@]+\.[^\s@]+$`.
///
/// # Examples
///
/// ```
/// use event_registration_core::validation::is_valid_email;
///
/// assert!(is_valid_email("user@example.com"));
/// assert!(is_valid_email("first.last+tag@mail.example.org"));
/// assert!(!is_valid_email("user@localhost"));
/// assert!(!is_valid_email("user @example.com"));
/// assert!(!is_valid_email("user@@example.com"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    // Needs a dot with at least one character on each side.
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Parse an ISO 8601 date or date-time.
///
/// Offsets are honoured; naive values are taken as UTC.
#[must_use]
pub fn parse_date_time(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Some(parsed.with_timezone(&Utc));
    }

    NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Accept JSON numbers with an integral value in `MIN_CAPACITY..=MAX_CAPACITY`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Range checked first
fn parse_capacity(value: &serde_json::Value) -> Option<u32> {
    let n = value.as_f64()?;
    let in_range = (f64::from(MIN_CAPACITY)..=f64::from(MAX_CAPACITY)).contains(&n);
    (in_range && n.fract() == 0.0).then_some(n as u32)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
