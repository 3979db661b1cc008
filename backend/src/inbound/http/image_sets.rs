//! Image set HTTP handlers.
//!
//! ```text
//! POST /image_sets {"patient_id":"<uuid>"}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::records::{NewImageSet, NewRecord, Record};
use crate::domain::{DomainError, LinkCheckError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::linkage_error;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldErrors, FieldName};

const PATIENT_ID: FieldName = FieldName::new("patient_id");

/// Request body for `POST /image_sets`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateImageSetRequest {
    /// Owning patient.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub patient_id: Option<String>,
}

fn parse_create_image_set(payload: CreateImageSetRequest) -> ApiResult<NewImageSet> {
    let mut errors = FieldErrors::new();
    errors
        .require_id(PATIENT_ID, payload.patient_id)
        .map(|patient_id| NewImageSet { patient_id })
        .ok_or_else(|| errors.into_error())
}

/// Open an image set for a patient.
#[utoipa::path(
    post,
    path = "/image_sets",
    request_body = CreateImageSetRequest,
    responses(
        (status = 200, description = "The stored image set", body = Record),
        (status = 400, description = "Invalid request or unknown patient", body = ErrorSchema),
        (status = 500, description = "The image set could not be stored", body = ErrorSchema)
    ),
    tags = ["image_sets"],
    operation_id = "createImageSet"
)]
#[post("/image_sets")]
pub async fn create_image_set(
    state: web::Data<HttpState>,
    payload: web::Json<CreateImageSetRequest>,
) -> ApiResult<web::Json<Record>> {
    let draft = NewRecord::ImageSet(parse_create_image_set(payload.into_inner())?);
    state
        .store
        .check_links(&draft)
        .await
        .map_err(|err| match err {
            LinkCheckError::Linkage(linkage) => linkage_error(&linkage),
            LinkCheckError::Store(store) => {
                error!(error = %store, "failed to load parent patient");
                DomainError::internal("Failed to verify record links")
            }
        })?;
    state
        .store
        .create(draft)
        .await
        .map(web::Json)
        .ok_or_else(|| DomainError::internal("Failed to create image set"))
}
