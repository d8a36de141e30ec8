//! # Event Registration Testing
//!
//! Testing utilities for the event registration service.
//!
//! This crate provides:
//! - [`InMemoryEventRepository`]: a thread-safe, in-memory `EventRepository`
//! - [`FixedClock`]: deterministic time
//! - Fixtures for events and registrations relative to the test clock
//!
//! ## Example
//!
//! ```
//! use event_registration_core::{Clock, EventRepository};
//! use event_registration_testing::{fixtures, test_clock, InMemoryEventRepository};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let repo = InMemoryEventRepository::new();
//! repo.create_event(&fixtures::upcoming_event("meetup", 2)).await.unwrap();
//!
//! let receipt = repo
//!     .register(&fixtures::registration("meetup", "Ada"), test_clock().now())
//!     .await
//!     .unwrap();
//! assert_eq!(receipt.remaining_capacity, 1);
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use chrono::{DateTime, Utc};
use event_registration_core::environment::Clock;

pub mod repository;

pub use repository::InMemoryEventRepository;

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use event_registration_testing::mocks::FixedClock;
    /// use event_registration_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2030-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(super::fixtures::test_now())
    }
}

/// Builders for events and registrations, dated relative to [`test_clock`].
pub mod fixtures {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use event_registration_core::types::{
        CancellationRequest, EventId, NewEvent, RegistrationRequest,
    };

    /// The instant returned by [`test_clock`](super::test_clock).
    #[must_use]
    pub fn test_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_default()
    }

    /// An event thirty days after the test clock.
    #[must_use]
    pub fn upcoming_event(id: &str, capacity: u32) -> NewEvent {
        event_at(id, capacity, test_now() + Duration::days(30))
    }

    /// An event one day before the test clock.
    #[must_use]
    pub fn past_event(id: &str, capacity: u32) -> NewEvent {
        event_at(id, capacity, test_now() - Duration::days(1))
    }

    /// An event at an explicit date-time.
    #[must_use]
    pub fn event_at(id: &str, capacity: u32, date_time: DateTime<Utc>) -> NewEvent {
        NewEvent {
            id: EventId::new(id),
            title: format!("Event {id}"),
            date_time,
            location: "Test Hall".to_string(),
            capacity,
        }
    }

    /// A registration whose email is derived from the name (`Ada` → `ada@example.com`).
    #[must_use]
    pub fn registration(event_id: &str, name: &str) -> RegistrationRequest {
        RegistrationRequest {
            event_id: EventId::new(event_id),
            name: name.to_string(),
            email: email_for(name),
        }
    }

    /// A cancellation matching [`registration`].
    #[must_use]
    pub fn cancellation(event_id: &str, name: &str) -> CancellationRequest {
        CancellationRequest {
            event_id: EventId::new(event_id),
            email: email_for(name),
        }
    }

    /// The email [`registration`] derives for `name`.
    #[must_use]
    pub fn email_for(name: &str) -> String {
        format!("{}@example.com", name.to_lowercase().replace(' ', "."))
    }
}

/// Install a test-friendly `tracing` subscriber.
///
/// Output goes through the test harness writer so it is only shown for
/// failing tests. Safe to call from every test; only the first call wins.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
        assert_eq!(time1, fixtures::test_now());
    }

    #[test]
    fn test_fixture_dates_relative_to_clock() {
        let now = test_clock().now();
        assert!(fixtures::upcoming_event("a", 1).date_time > now);
        assert!(fixtures::past_event("b", 1).date_time < now);
    }

    #[test]
    fn test_email_for() {
        assert_eq!(fixtures::email_for("Ada Lovelace"), "ada.lovelace@example.com");
    }
}
