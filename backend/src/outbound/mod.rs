//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed record repository using Diesel ORM
//! - **memory**: in-process record repository for database-less runs
//! - **webhooks**: reqwest clients for the camera and analyzer services
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod memory;
pub mod persistence;
pub mod webhooks;
