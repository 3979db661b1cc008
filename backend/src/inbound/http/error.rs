//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into one JSON envelope:
//!
//! ```json
//! {
//!   "message": "Bad Request, Additional Info: first_name: missing required field",
//!   "code": "invalid_request",
//!   "traceId": "6f1c9a3e-2d4b-4c7a-9e8f-0a1b2c3d4e5f",
//!   "details": { "fields": [] }
//! }
//! ```
//!
//! Internal errors keep the handler's generic message and never carry
//! details; the underlying cause is logged where it happened.

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;

use crate::domain::records::LinkageError;
use crate::domain::{DomainError, ErrorCode, ImagingError, TRACE_ID_HEADER, TraceId};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, DomainError>;

const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorEnvelope<'a> {
    message: String,
    code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a Value>,
}

impl<'a> ErrorEnvelope<'a> {
    fn from_error(error: &'a DomainError) -> Self {
        let details = if matches!(error.code(), ErrorCode::InternalError) {
            None
        } else {
            error.details()
        };
        Self {
            message: format!(
                "{}, Additional Info: {}",
                error.code().category(),
                error.message()
            ),
            code: error.code(),
            trace_id: error
                .trace_id()
                .map(str::to_owned)
                .or_else(|| TraceId::current().map(|id| id.to_string())),
            details,
        }
    }
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let envelope = ErrorEnvelope::from_error(self);
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = envelope.trace_id.as_deref() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(envelope)
    }
}

impl From<actix_web::Error> for DomainError {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Self::internal("Internal server error")
    }
}

/// Maps a failed parent check to a `Bad Request` naming the field.
pub(crate) fn linkage_error(err: &LinkageError) -> DomainError {
    DomainError::invalid_request(err.to_string()).with_details(json!({
        "fields": [{
            "field": err.field(),
            "code": "invalid_link",
            "message": err.to_string(),
        }]
    }))
}

/// Maps an imaging workflow failure to its caller-facing error.
pub(crate) fn imaging_error(err: ImagingError) -> DomainError {
    match err {
        ImagingError::ImageNotFound { id } => {
            DomainError::not_found(format!("no image with id {id}"))
        }
        ImagingError::Linkage(linkage) => linkage_error(&linkage),
        ImagingError::Upstream { message } | ImagingError::Persistence { message } => {
            DomainError::internal(message)
        }
    }
}

/// Renders malformed JSON bodies as a `Bad Request` envelope.
///
/// Registered through `web::JsonConfig::error_handler`.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let detail = match &err {
        JsonPayloadError::ContentType => "request body must be application/json".to_owned(),
        JsonPayloadError::Deserialize(inner) => format!("invalid JSON payload: {inner}"),
        other => format!("unreadable JSON payload: {other}"),
    };
    DomainError::invalid_request(detail).into()
}

/// Renders malformed query strings as a `Bad Request` envelope.
///
/// Registered through `web::QueryConfig::error_handler`.
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    DomainError::invalid_request(format!("invalid query string: {err}")).into()
}

/// Fallback for routes that match nothing.
pub async fn route_not_found(req: HttpRequest) -> ApiResult<HttpResponse> {
    Err(DomainError::not_found(format!(
        "no route for {} {}",
        req.method(),
        req.path()
    )))
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    async fn body_json(response: HttpResponse) -> Value {
        let bytes = to_bytes(response.into_body()).await.expect("body bytes");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[rstest]
    #[case(ErrorCode::InvalidRequest, StatusCode::BAD_REQUEST)]
    #[case(ErrorCode::NotFound, StatusCode::NOT_FOUND)]
    #[case(ErrorCode::InternalError, StatusCode::INTERNAL_SERVER_ERROR)]
    fn codes_map_to_status(#[case] code: ErrorCode, #[case] status: StatusCode) {
        assert_eq!(DomainError::new(code, "x").status_code(), status);
    }

    #[actix_web::test]
    async fn bad_request_envelope_keeps_details() {
        let err = DomainError::invalid_request("first_name: missing required field")
            .with_trace_id("abc")
            .with_details(json!({ "fields": [{ "field": "first_name" }] }));

        let response = err.error_response();
        assert_eq!(
            response
                .headers()
                .get(TRACE_ID_HEADER)
                .and_then(|value| value.to_str().ok()),
            Some("abc")
        );
        let body = body_json(response).await;
        assert_eq!(
            body,
            json!({
                "message": "Bad Request, Additional Info: first_name: missing required field",
                "code": "invalid_request",
                "traceId": "abc",
                "details": { "fields": [{ "field": "first_name" }] }
            })
        );
    }

    #[actix_web::test]
    async fn internal_envelope_drops_details() {
        let err = DomainError::internal("Failed to capture image")
            .with_details(json!({ "sql": "insert into images" }));

        let body = body_json(err.error_response()).await;
        assert_eq!(
            body.get("message").and_then(Value::as_str),
            Some("Database/Server Error, Additional Info: Failed to capture image")
        );
        assert!(body.get("details").is_none());
    }

    #[actix_web::test]
    async fn trace_id_in_scope_is_used_when_error_lacks_one() {
        let err = DomainError::not_found("gone");
        let trace_id = TraceId::generate();
        let response = TraceId::scope(trace_id, async move { err.error_response() }).await;
        let body = body_json(response).await;
        assert_eq!(
            body.get("traceId").and_then(Value::as_str),
            Some(trace_id.to_string().as_str())
        );
    }

    #[rstest]
    #[case(
        ImagingError::Upstream { message: "Failed to capture image".to_owned() },
        ErrorCode::InternalError
    )]
    #[case(
        ImagingError::Persistence { message: "No id received for new image".to_owned() },
        ErrorCode::InternalError
    )]
    #[case(
        ImagingError::ImageNotFound { id: crate::domain::records::RecordId::from_uuid(uuid::Uuid::nil()) },
        ErrorCode::NotFound
    )]
    fn imaging_errors_map_to_codes(#[case] err: ImagingError, #[case] code: ErrorCode) {
        assert_eq!(imaging_error(err).code(), code);
    }

    #[test]
    fn linkage_errors_name_the_field() {
        let err = linkage_error(&LinkageError::Mismatch {
            field: "patient_id",
            expected: crate::domain::records::RecordId::from_uuid(uuid::Uuid::from_u128(1)),
            actual: crate::domain::records::RecordId::from_uuid(uuid::Uuid::from_u128(2)),
        });
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.details().and_then(|d| d.pointer("/fields/0/field")),
            Some(&json!("patient_id"))
        );
    }

    #[test]
    fn actix_errors_become_generic_internal_errors() {
        let err = DomainError::from(actix_web::error::ErrorBadGateway("upstream secret"));
        assert_eq!(err.code(), ErrorCode::InternalError);
        assert_eq!(err.message(), "Internal server error");
    }
}
