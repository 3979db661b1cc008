//! OpenAPI schema definitions for adapter-level payloads.
//!
//! The error envelope is rendered by [`super::error`] from a
//! [`crate::domain::DomainError`]; this wrapper documents its wire shape.

use utoipa::ToSchema;

use crate::domain::ErrorCode;

/// OpenAPI schema for the error envelope.
///
/// `message` is the failure category followed by `, Additional Info: ` and
/// the detail text.
#[derive(ToSchema)]
#[schema(as = ErrorEnvelope)]
#[serde(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Category and detail text.
    #[schema(example = "Bad Request, Additional Info: first_name: missing required field")]
    message: String,
    /// Stable machine-readable error code.
    code: ErrorCode,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(example = "6f1c9a3e-2d4b-4c7a-9e8f-0a1b2c3d4e5f")]
    trace_id: Option<String>,
    /// Per-field validation problems; never present on server errors.
    details: Option<serde_json::Value>,
}
