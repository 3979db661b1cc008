//! Assessment HTTP handlers.
//!
//! ```text
//! POST /assessments {"image_id":"<uuid>"}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::AssessImageRequest;
use crate::domain::records::Assessment;
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::imaging_error;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldErrors, FieldName};

const IMAGE_ID: FieldName = FieldName::new("image_id");

/// Request body for `POST /assessments`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct AssessImageBody {
    /// Image to assess.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub image_id: Option<String>,
}

fn parse_assess(payload: AssessImageBody) -> ApiResult<AssessImageRequest> {
    let mut errors = FieldErrors::new();
    errors
        .require_id(IMAGE_ID, payload.image_id)
        .map(|image_id| AssessImageRequest { image_id })
        .ok_or_else(|| errors.into_error())
}

/// Send a stored image to the analyzer and store its verdict.
#[utoipa::path(
    post,
    path = "/assessments",
    request_body = AssessImageBody,
    responses(
        (status = 200, description = "The stored assessment", body = Assessment),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Unknown image", body = ErrorSchema),
        (status = 500, description = "Analysis or storage failed", body = ErrorSchema)
    ),
    tags = ["assessments"],
    operation_id = "assessImage"
)]
#[post("/assessments")]
pub async fn assess_image(
    state: web::Data<HttpState>,
    payload: web::Json<AssessImageBody>,
) -> ApiResult<web::Json<Assessment>> {
    let request = parse_assess(payload.into_inner())?;
    state
        .imaging
        .assess_image(request)
        .await
        .map(web::Json)
        .map_err(imaging_error)
}
