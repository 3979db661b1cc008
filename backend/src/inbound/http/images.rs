//! Image HTTP handlers.
//!
//! ```text
//! GET /images
//! GET /images/{id}
//! POST /images {"patient_id":"<uuid>","set_id":"<uuid>"}
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::CaptureImageRequest;
use crate::domain::records::{EntityKind, Image, RecordColumn, RecordView};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::imaging_error;
use crate::inbound::http::records::{view_by_id, view_latest};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldErrors, FieldName};

const PATIENT_ID: FieldName = FieldName::new("patient_id");
const SET_ID: FieldName = FieldName::new("set_id");

/// Request body for `POST /images`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CaptureImageBody {
    /// Patient being imaged.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub patient_id: Option<String>,
    /// Image set receiving the capture.
    #[schema(example = "9b2d7c1e-0f4a-4e5b-8c6d-1a2b3c4d5e6f")]
    pub set_id: Option<String>,
}

fn parse_capture(payload: CaptureImageBody) -> ApiResult<CaptureImageRequest> {
    let mut errors = FieldErrors::new();
    let patient_id = errors.require_id(PATIENT_ID, payload.patient_id);
    let set_id = errors.require_id(SET_ID, payload.set_id);
    match (patient_id, set_id) {
        (Some(patient_id), Some(set_id)) => Ok(CaptureImageRequest { patient_id, set_id }),
        _ => Err(errors.into_error()),
    }
}

/// Fetch the most recently captured image with its set and patient.
#[utoipa::path(
    get,
    path = "/images",
    responses(
        (status = 200, description = "Latest image by capture time", body = RecordView),
        (status = 404, description = "No images stored", body = ErrorSchema),
        (status = 500, description = "Parent records could not be loaded", body = ErrorSchema)
    ),
    tags = ["images"],
    operation_id = "getLatestImage"
)]
#[get("/images")]
pub async fn latest_image(state: web::Data<HttpState>) -> ApiResult<web::Json<RecordView>> {
    view_latest(
        &state,
        EntityKind::Image.table_name(),
        Some(RecordColumn::ImageTimestamp.name()),
    )
    .await
    .map(web::Json)
}

/// Fetch one image with its set and patient.
#[utoipa::path(
    get,
    path = "/images/{id}",
    params(("id" = String, Path, description = "Image UUID")),
    responses(
        (status = 200, description = "The image with its parents", body = RecordView),
        (status = 404, description = "Malformed or unknown id", body = ErrorSchema),
        (status = 500, description = "Duplicate ids or unreadable parents", body = ErrorSchema)
    ),
    tags = ["images"],
    operation_id = "getImage"
)]
#[get("/images/{id}")]
pub async fn get_image(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<RecordView>> {
    let raw_id = path.into_inner();
    view_by_id(&state, EntityKind::Image.table_name(), &raw_id)
        .await
        .map(web::Json)
}

/// Trigger the camera for an image set and store the capture.
#[utoipa::path(
    post,
    path = "/images",
    request_body = CaptureImageBody,
    responses(
        (status = 200, description = "The stored image", body = Image),
        (status = 400, description = "Invalid request or inconsistent references", body = ErrorSchema),
        (status = 500, description = "Capture or storage failed", body = ErrorSchema)
    ),
    tags = ["images"],
    operation_id = "captureImage"
)]
#[post("/images")]
pub async fn capture_image(
    state: web::Data<HttpState>,
    payload: web::Json<CaptureImageBody>,
) -> ApiResult<web::Json<Image>> {
    let request = parse_capture(payload.into_inner())?;
    state
        .imaging
        .capture_image(request)
        .await
        .map(web::Json)
        .map_err(imaging_error)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::ports::{
        CaptureResponse, CaptureServiceError, FixtureAnalysisService, FixtureCaptureService,
        MockCaptureService,
    };
    use crate::inbound::http::test_utils::{at, id, init_app, state_with, ward, ward_state};
    use crate::outbound::memory::InMemoryRecordRepository;

    async fn post_with(capture: MockCaptureService, body: Value) -> (StatusCode, Value, usize) {
        let repository = InMemoryRecordRepository::with_records(ward());
        let state = state_with(
            Arc::new(repository.clone()),
            Arc::new(capture),
            Arc::new(FixtureAnalysisService),
        );
        let app = init_app(state).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/images")
                .set_json(body)
                .to_request(),
        )
        .await;
        let status = res.status();
        let body = test::read_body_json(res).await;
        (status, body, repository.len())
    }

    fn ward_capture() -> Value {
        json!({ "patient_id": id(1).to_string(), "set_id": id(10).to_string() })
    }

    #[rstest]
    #[actix_web::test]
    async fn latest_image_is_expanded() {
        let (state, _) = ward_state();
        let app = init_app(state).await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/images").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body.get("id"), Some(&json!(id(21).to_string())));
        assert_eq!(body.pointer("/image_set/id"), Some(&json!(id(10).to_string())));
        assert_eq!(body.pointer("/image_set/patient/first_name"), Some(&json!("Ada")));
    }

    #[rstest]
    #[actix_web::test]
    async fn latest_image_of_empty_store_is_not_found() {
        let state = state_with(
            Arc::new(InMemoryRecordRepository::new()),
            Arc::new(FixtureCaptureService),
            Arc::new(FixtureAnalysisService),
        );
        let app = init_app(state).await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/images").to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[actix_web::test]
    async fn image_by_id_is_expanded() {
        let (state, _) = ward_state();
        let app = init_app(state).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/images/{}", id(20)))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body.get("uri"), Some(&json!("captures/20.png")));
        assert_eq!(body.pointer("/image_set/patient/id"), Some(&json!(id(1).to_string())));
    }

    #[rstest]
    #[actix_web::test]
    async fn capture_stores_image_with_clock_timestamp() {
        let mut capture = MockCaptureService::new();
        capture
            .expect_capture()
            .withf(|request| request.set_id == id(10) && request.patient_id == id(1))
            .times(1)
            .return_once(|_| {
                Ok(CaptureResponse {
                    uri: "captures/new.png".to_owned(),
                    image_timestamp: None,
                })
            });

        let (status, body, stored) = post_with(capture, ward_capture()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("uri"), Some(&json!("captures/new.png")));
        assert_eq!(
            body.get("image_timestamp"),
            Some(&serde_json::to_value(at(12)).expect("timestamp json"))
        );
        assert_eq!(stored, ward().len() + 1);
    }

    #[rstest]
    #[actix_web::test]
    async fn missing_field_is_bad_request_naming_it() {
        let mut capture = MockCaptureService::new();
        capture.expect_capture().times(0);

        let (status, body, stored) =
            post_with(capture, json!({ "patient_id": id(1).to_string() })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body.get("message").and_then(Value::as_str),
            Some("Bad Request, Additional Info: set_id: missing required field")
        );
        assert_eq!(stored, ward().len());
    }

    #[rstest]
    #[actix_web::test]
    async fn set_of_another_patient_is_bad_request() {
        let mut capture = MockCaptureService::new();
        capture.expect_capture().times(0);

        let (status, body, stored) = post_with(
            capture,
            json!({ "patient_id": id(1).to_string(), "set_id": id(11).to_string() }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.pointer("/details/fields/0/field"), Some(&json!("patient_id")));
        assert_eq!(stored, ward().len());
    }

    #[rstest]
    #[actix_web::test]
    async fn camera_failure_is_server_error_without_details() {
        let mut capture = MockCaptureService::new();
        capture
            .expect_capture()
            .times(1)
            .return_once(|_| Err(CaptureServiceError::timeout("no answer in 10s")));

        let (status, body, stored) = post_with(capture, ward_capture()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body.get("message").and_then(Value::as_str),
            Some("Database/Server Error, Additional Info: Failed to capture image")
        );
        assert!(body.get("details").is_none());
        assert_eq!(stored, ward().len());
    }

    #[rstest]
    #[actix_web::test]
    async fn duplicate_uri_is_server_error_and_stores_nothing() {
        let mut capture = MockCaptureService::new();
        capture.expect_capture().times(1).return_once(|_| {
            Ok(CaptureResponse {
                uri: "captures/20.png".to_owned(),
                image_timestamp: None,
            })
        });

        let (status, body, stored) = post_with(capture, ward_capture()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body.get("message").and_then(Value::as_str),
            Some("Database/Server Error, Additional Info: No id received for new image")
        );
        assert_eq!(stored, ward().len());
    }
}
