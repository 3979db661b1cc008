//! Domain-level error types.
//!
//! These errors are transport agnostic. The HTTP adapter maps each
//! [`ErrorCode`] to a status code and renders the caller-facing envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::TraceId;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// The requested record or collection does not exist.
    NotFound,
    /// The record store or an upstream service failed.
    InternalError,
}

impl ErrorCode {
    /// Caller-facing category label used in error envelopes.
    ///
    /// # Examples
    /// ```
    /// use imaging_records::domain::ErrorCode;
    ///
    /// assert_eq!(ErrorCode::NotFound.category(), "Object Not Found");
    /// ```
    #[must_use]
    pub const fn category(self) -> &'static str {
        match self {
            Self::InvalidRequest => "Bad Request",
            Self::NotFound => "Object Not Found",
            Self::InternalError => "Database/Server Error",
        }
    }
}

/// Error payload shared by every inbound adapter.
///
/// `message` holds the detail text only; adapters prefix it with the
/// category of [`DomainError::code`].
///
/// # Examples
/// ```
/// use imaging_records::domain::{DomainError, ErrorCode};
///
/// let err = DomainError::not_found("no patient with that id");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.message(), "no patient with that id");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DomainError {
    #[schema(example = "invalid_request")]
    code: ErrorCode,
    #[schema(example = "first_name is required")]
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl DomainError {
    /// Creates an error, capturing the trace identifier in scope if any.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        }
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Detail text without the category prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Correlation identifier of the request that failed.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Structured details such as the offending field.
    #[must_use]
    pub const fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Override the captured trace identifier.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.category(), self.message)
    }
}

impl std::error::Error for DomainError {}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    #[rstest]
    #[case(ErrorCode::InvalidRequest, "Bad Request")]
    #[case(ErrorCode::NotFound, "Object Not Found")]
    #[case(ErrorCode::InternalError, "Database/Server Error")]
    fn codes_map_to_categories(#[case] code: ErrorCode, #[case] expected: &str) {
        assert_eq!(code.category(), expected);
    }

    #[test]
    fn serialises_in_camel_case_without_empty_fields() {
        let err = DomainError::invalid_request("bad").with_trace_id("abc");
        let value = serde_json::to_value(&err).expect("serialise");
        assert_eq!(
            value,
            json!({ "code": "invalid_request", "message": "bad", "traceId": "abc" })
        );
    }

    #[test]
    fn details_are_serialised_when_present() {
        let err = DomainError::invalid_request("bad").with_details(json!({ "field": "uri" }));
        let value = serde_json::to_value(&err).expect("serialise");
        assert_eq!(value.get("details"), Some(&json!({ "field": "uri" })));
    }

    #[tokio::test]
    async fn captures_trace_id_in_scope() {
        let trace_id = TraceId::from_uuid(Uuid::nil());
        let err = TraceId::scope(trace_id, async { DomainError::not_found("gone") }).await;
        assert_eq!(err.trace_id(), Some(Uuid::nil().to_string().as_str()));
    }

    #[test]
    fn has_no_trace_id_out_of_scope() {
        assert!(DomainError::internal("boom").trace_id().is_none());
    }

    #[test]
    fn display_includes_category() {
        let err = DomainError::not_found("no such table");
        assert_eq!(err.to_string(), "Object Not Found: no such table");
    }
}
