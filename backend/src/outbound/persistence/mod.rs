//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Provides the `RecordRepository` implementation backed by PostgreSQL via
//! `diesel-async` and a `bb8` connection pool.
//!
//! - **Thin adapters**: the repository translates between Diesel rows and
//!   domain records; linkage rules live in the domain and are only invoked
//!   here inside the create transaction.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Embedded migrations**: `run_pending_migrations` brings the schema up to
//!   date before the pool is used.
//! - **Strongly typed errors**: pool and Diesel failures map to
//!   `RecordRepositoryError`.

mod diesel_record_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_record_repository::DieselRecordRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
