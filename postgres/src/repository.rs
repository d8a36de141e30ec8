//! PostgreSQL event repository implementation.
//!
//! # Concurrency
//!
//! Registration is check-then-act on the event row, so it runs inside a
//! transaction that first takes `SELECT ... FOR UPDATE` on the event:
//!
//! ```text
//!   Request A: SELECT ... FOR UPDATE (acquires lock, registrations = 9/10)
//!   Request B: SELECT ... FOR UPDATE (blocks on A's lock)
//!   Request A: INSERT users, UPDATE registrations 9→10, COMMIT
//!   Request B: lock acquired, reads registrations = 10/10 → EventFull
//! ```
//!
//! The increment is additionally guarded by `registrations < capacity` and
//! the table carries a `CHECK (registrations <= capacity)`, so the counter
//! can never pass the capacity even if the lock were bypassed.

use chrono::{DateTime, Utc};
use event_registration_core::error::{RegistrationError, Result};
use event_registration_core::types::{
    CancellationRequest, Event, EventId, EventWithRegistrants, NewEvent, Registrant,
    Registration, RegistrationReceipt, RegistrationRequest,
};
use event_registration_core::validation::check_registration_allowed;
use event_registration_core::EventRepository;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

const EVENT_COLUMNS: &str = "id, title, date_time, location, capacity, registrations";

/// Row shape of the `events` table.
#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: String,
    title: String,
    date_time: DateTime<Utc>,
    location: String,
    capacity: i32,
    registrations: i32,
}

impl TryFrom<EventRow> for Event {
    type Error = RegistrationError;

    fn try_from(row: EventRow) -> Result<Self> {
        Ok(Self {
            id: EventId::new(row.id),
            title: row.title,
            date_time: row.date_time,
            location: row.location,
            capacity: non_negative(row.capacity, "capacity")?,
            registrations: non_negative(row.registrations, "registrations")?,
        })
    }
}

/// An event row plus its registrants aggregated by `json_agg`.
#[derive(Debug, sqlx::FromRow)]
struct EventListingRow {
    #[sqlx(flatten)]
    event: EventRow,
    registered_users: Json<Vec<Registrant>>,
}

fn non_negative(value: i32, column: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        RegistrationError::Storage(format!("Invalid {column} in events row: {value}"))
    })
}

/// Roll back a rejected transaction. A failed rollback is logged; the
/// connection discards the transaction when it returns to the pool.
async fn rollback(tx: Transaction<'_, Postgres>) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!(error = %e, "Failed to roll back transaction");
    }
}

/// PostgreSQL event repository.
///
/// Cloning is cheap: the pool is reference counted.
#[derive(Clone)]
pub struct PostgresEventRepository {
    /// PostgreSQL connection pool.
    pool: PgPool,
}

impl PostgresEventRepository {
    /// Create a new PostgreSQL event repository.
    ///
    /// # Arguments
    ///
    /// * `pool` - PostgreSQL connection pool
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations.
    ///
    /// Creates the `events` and `users` tables if they don't already exist.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationError::Storage` if migrations fail.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RegistrationError::Storage(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl EventRepository for PostgresEventRepository {
    #[tracing::instrument(skip(self), fields(event_id = %event_id))]
    async fn event_exists(&self, event_id: &EventId) -> Result<bool> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM events WHERE id = $1)")
                .bind(event_id.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    RegistrationError::Storage(format!("Failed to check event: {e}"))
                })?;

        Ok(exists)
    }

    #[tracing::instrument(skip(self, event), fields(event_id = %event.id))]
    async fn create_event(&self, event: &NewEvent) -> Result<Event> {
        let capacity = i32::try_from(event.capacity).map_err(|_| {
            RegistrationError::Storage(format!("Capacity out of range: {}", event.capacity))
        })?;

        let row: EventRow = sqlx::query_as(&format!(
            "INSERT INTO events (id, title, date_time, location, capacity)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(event.id.as_str())
        .bind(&event.title)
        .bind(event.date_time)
        .bind(&event.location)
        .bind(capacity)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return RegistrationError::DuplicateEvent {
                        event_id: event.id.clone(),
                    };
                }
            }
            RegistrationError::Storage(format!("Failed to create event: {e}"))
        })?;

        tracing::debug!("Event created");
        Event::try_from(row)
    }

    #[tracing::instrument(skip(self), fields(event_id = %event_id))]
    async fn find_event(&self, event_id: &EventId) -> Result<Option<Event>> {
        let row: Option<EventRow> =
            sqlx::query_as(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
                .bind(event_id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RegistrationError::Storage(format!("Failed to get event: {e}")))?;

        row.map(Event::try_from).transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn list_events_with_registrants(&self) -> Result<Vec<EventWithRegistrants>> {
        let rows: Vec<EventListingRow> = sqlx::query_as(
            "SELECT e.id, e.title, e.date_time, e.location, e.capacity, e.registrations,
                    COALESCE(
                        json_agg(json_build_object('name', u.name, 'email', u.email) ORDER BY u.id)
                            FILTER (WHERE u.id IS NOT NULL),
                        '[]'::json
                    ) AS registered_users
             FROM events e
             LEFT JOIN users u ON u.event_id = e.id
             GROUP BY e.id
             ORDER BY e.date_time, e.id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RegistrationError::Storage(format!("Failed to list events: {e}")))?;

        rows.into_iter()
            .map(|row| {
                Ok(EventWithRegistrants {
                    event: Event::try_from(row.event)?,
                    registered_users: row.registered_users.0,
                })
            })
            .collect()
    }

    #[tracing::instrument(skip(self, request, now), fields(event_id = %request.event_id))]
    async fn register(
        &self,
        request: &RegistrationRequest,
        now: DateTime<Utc>,
    ) -> Result<RegistrationReceipt> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            RegistrationError::Storage(format!("Failed to start transaction: {e}"))
        })?;

        // Step 1: Lock the event row so concurrent registrations serialize here
        let locked: Option<EventRow> = sqlx::query_as(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 FOR UPDATE"
        ))
        .bind(request.event_id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| RegistrationError::Storage(format!("Failed to lock event: {e}")))?;

        let Some(row) = locked else {
            rollback(tx).await;
            return Err(RegistrationError::EventNotFound {
                event_id: request.event_id.clone(),
            });
        };
        let event = Event::try_from(row)?;

        // Step 2: Schedule and capacity, evaluated against the locked row
        if let Err(rejection) = check_registration_allowed(&event, now) {
            rollback(tx).await;
            return Err(rejection);
        }

        // Step 3: Insert the registration; (event_id, email) is unique
        let inserted: std::result::Result<(String, String, String), sqlx::Error> =
            sqlx::query_as(
                "INSERT INTO users (event_id, name, email)
                 VALUES ($1, $2, $3)
                 RETURNING event_id, name, email",
            )
            .bind(request.event_id.as_str())
            .bind(&request.name)
            .bind(&request.email)
            .fetch_one(&mut *tx)
            .await;

        let (event_id, name, email) = match inserted {
            Ok(row) => row,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                rollback(tx).await;
                return Err(RegistrationError::AlreadyRegistered {
                    email: request.email.clone(),
                });
            }
            Err(e) => {
                rollback(tx).await;
                return Err(RegistrationError::Storage(format!(
                    "Failed to insert registration: {e}"
                )));
            }
        };

        // Step 4: Conditional increment, bounded by capacity
        let updated: Option<EventRow> = sqlx::query_as(&format!(
            "UPDATE events
             SET registrations = registrations + 1
             WHERE id = $1 AND registrations < capacity
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(request.event_id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            RegistrationError::Storage(format!("Failed to update registration count: {e}"))
        })?;

        let Some(updated) = updated else {
            rollback(tx).await;
            return Err(RegistrationError::EventFull {
                capacity: event.capacity,
                registrations: event.registrations,
            });
        };
        let updated = Event::try_from(updated)?;

        tx.commit()
            .await
            .map_err(|e| RegistrationError::Storage(format!("Failed to commit transaction: {e}")))?;

        tracing::debug!(
            registrations = updated.registrations,
            capacity = updated.capacity,
            "Registration stored"
        );

        Ok(RegistrationReceipt {
            registration: Registration {
                event_id: EventId::new(event_id),
                name,
                email,
            },
            remaining_capacity: updated.remaining_capacity(),
        })
    }

    #[tracing::instrument(skip(self, request), fields(event_id = %request.event_id))]
    async fn cancel(&self, request: &CancellationRequest) -> Result<Event> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            RegistrationError::Storage(format!("Failed to start transaction: {e}"))
        })?;

        let deleted = sqlx::query("DELETE FROM users WHERE event_id = $1 AND email = $2")
            .bind(request.event_id.as_str())
            .bind(&request.email)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                RegistrationError::Storage(format!("Failed to delete registration: {e}"))
            })?;

        if deleted.rows_affected() == 0 {
            rollback(tx).await;
            return Err(RegistrationError::RegistrationNotFound {
                event_id: request.event_id.clone(),
                email: request.email.clone(),
            });
        }

        // Guarded so a drifted counter bottoms out at zero instead of failing the CHECK
        let decremented: Option<EventRow> = sqlx::query_as(&format!(
            "UPDATE events
             SET registrations = registrations - 1
             WHERE id = $1 AND registrations > 0
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(request.event_id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            RegistrationError::Storage(format!("Failed to update registration count: {e}"))
        })?;

        let row = match decremented {
            Some(row) => row,
            None => {
                tracing::warn!("Registration counter already at zero during cancellation");
                sqlx::query_as(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
                    .bind(request.event_id.as_str())
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| {
                        RegistrationError::Storage(format!("Failed to get event: {e}"))
                    })?
            }
        };

        tx.commit()
            .await
            .map_err(|e| RegistrationError::Storage(format!("Failed to commit transaction: {e}")))?;

        tracing::debug!("Registration cancelled");
        Event::try_from(row)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| RegistrationError::Storage(format!("Database unreachable: {e}")))?;
        Ok(())
    }
}
