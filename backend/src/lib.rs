//! Imaging records library modules.
//!
//! The crate follows a hexagonal layout: `domain` holds the record model,
//! services and ports; `inbound` adapts HTTP onto the domain; `outbound`
//! implements the ports for PostgreSQL, memory and the webhooks.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod sample_data;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
