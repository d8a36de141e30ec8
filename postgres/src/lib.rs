//! `PostgreSQL` storage for the event registration service.
//!
//! This crate implements [`EventRepository`](event_registration_core::EventRepository)
//! on top of a `sqlx` connection pool. Statements are parameterized and run
//! through the runtime query API, so no database is needed at compile time.
//!
//! - Events and registrations live in the `events` and `users` tables
//! - Registration and cancellation run in a transaction with the event row locked
//! - Listing is a single grouping join
//!
//! # Example
//!
//! ```no_run
//! use event_registration_postgres::PostgresEventRepository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = sqlx::PgPool::connect("postgres://localhost/event_registration").await?;
//! let repository = PostgresEventRepository::new(pool);
//! repository.migrate().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod repository;

pub use repository::PostgresEventRepository;
