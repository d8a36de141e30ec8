//! In-memory event repository for testing.

use chrono::{DateTime, Utc};
use event_registration_core::error::{RegistrationError, Result};
use event_registration_core::types::{
    CancellationRequest, Event, EventId, EventWithRegistrants, NewEvent, Registrant,
    Registration, RegistrationReceipt, RegistrationRequest,
};
use event_registration_core::validation::check_registration_allowed;
use event_registration_core::EventRepository;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Tables {
    events: HashMap<EventId, Event>,
    /// Registration order is preserved for listings.
    registrations: Vec<Registration>,
    failure: Option<String>,
}

/// In-memory event repository.
///
/// Every operation runs under a single mutex, so registration and
/// cancellation are atomic just like the Postgres transactions. Clones share
/// the same storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryEventRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with `RegistrationError::Storage(message)`.
    pub fn fail_with(&self, message: impl Into<String>) {
        if let Ok(mut tables) = self.tables.lock() {
            tables.failure = Some(message.into());
        }
    }

    /// Snapshot of all stored registrations, in registration order.
    #[must_use]
    pub fn registrations(&self) -> Vec<Registration> {
        self.tables
            .lock()
            .map(|tables| tables.registrations.clone())
            .unwrap_or_default()
    }
}

fn lock(tables: &Mutex<Tables>) -> Result<MutexGuard<'_, Tables>> {
    let guard = tables
        .lock()
        .map_err(|_| RegistrationError::Storage("In-memory store poisoned".to_string()))?;

    if let Some(message) = &guard.failure {
        return Err(RegistrationError::Storage(message.clone()));
    }

    Ok(guard)
}

impl EventRepository for InMemoryEventRepository {
    fn event_exists(&self, event_id: &EventId) -> impl Future<Output = Result<bool>> + Send {
        let tables = Arc::clone(&self.tables);
        let event_id = event_id.clone();

        async move { Ok(lock(&tables)?.events.contains_key(&event_id)) }
    }

    fn create_event(&self, event: &NewEvent) -> impl Future<Output = Result<Event>> + Send {
        let tables = Arc::clone(&self.tables);
        let event = event.clone();

        async move {
            let mut tables = lock(&tables)?;

            if tables.events.contains_key(&event.id) {
                return Err(RegistrationError::DuplicateEvent { event_id: event.id });
            }

            let stored = event.into_event();
            tables.events.insert(stored.id.clone(), stored.clone());
            Ok(stored)
        }
    }

    fn find_event(
        &self,
        event_id: &EventId,
    ) -> impl Future<Output = Result<Option<Event>>> + Send {
        let tables = Arc::clone(&self.tables);
        let event_id = event_id.clone();

        async move { Ok(lock(&tables)?.events.get(&event_id).cloned()) }
    }

    fn list_events_with_registrants(
        &self,
    ) -> impl Future<Output = Result<Vec<EventWithRegistrants>>> + Send {
        let tables = Arc::clone(&self.tables);

        async move {
            let tables = lock(&tables)?;

            let mut events: Vec<&Event> = tables.events.values().collect();
            events.sort_by(|a, b| a.date_time.cmp(&b.date_time).then_with(|| a.id.cmp(&b.id)));

            Ok(events
                .into_iter()
                .map(|event| EventWithRegistrants {
                    event: event.clone(),
                    registered_users: tables
                        .registrations
                        .iter()
                        .filter(|r| r.event_id == event.id)
                        .map(|r| Registrant {
                            name: r.name.clone(),
                            email: r.email.clone(),
                        })
                        .collect(),
                })
                .collect())
        }
    }

    fn register(
        &self,
        request: &RegistrationRequest,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<RegistrationReceipt>> + Send {
        let tables = Arc::clone(&self.tables);
        let request = request.clone();

        async move {
            let mut guard = lock(&tables)?;
            let tables = &mut *guard;

            let event = tables.events.get_mut(&request.event_id).ok_or_else(|| {
                RegistrationError::EventNotFound {
                    event_id: request.event_id.clone(),
                }
            })?;

            check_registration_allowed(event, now)?;

            let duplicate = tables
                .registrations
                .iter()
                .any(|r| r.event_id == request.event_id && r.email == request.email);
            if duplicate {
                return Err(RegistrationError::AlreadyRegistered {
                    email: request.email,
                });
            }

            event.registrations += 1;
            let remaining_capacity = event.remaining_capacity();

            let registration = Registration {
                event_id: request.event_id,
                name: request.name,
                email: request.email,
            };
            tables.registrations.push(registration.clone());

            Ok(RegistrationReceipt {
                registration,
                remaining_capacity,
            })
        }
    }

    fn cancel(&self, request: &CancellationRequest) -> impl Future<Output = Result<Event>> + Send {
        let tables = Arc::clone(&self.tables);
        let request = request.clone();

        async move {
            let mut guard = lock(&tables)?;
            let tables = &mut *guard;

            let not_found = || RegistrationError::RegistrationNotFound {
                event_id: request.event_id.clone(),
                email: request.email.clone(),
            };

            let position = tables
                .registrations
                .iter()
                .position(|r| r.event_id == request.event_id && r.email == request.email)
                .ok_or_else(not_found)?;
            let event = tables
                .events
                .get_mut(&request.event_id)
                .ok_or_else(not_found)?;

            tables.registrations.remove(position);
            event.registrations = event.registrations.saturating_sub(1);

            Ok(event.clone())
        }
    }

    fn ping(&self) -> impl Future<Output = Result<()>> + Send {
        let tables = Arc::clone(&self.tables);

        async move {
            lock(&tables)?;
            Ok(())
        }
    }
}
