//! Sample data HTTP handlers.
//!
//! ```text
//! GET /generate
//! GET /generate/{collection}
//! ```
//!
//! Each call regenerates the configured seed, so repeated calls return the
//! same dataset until the registry changes.

use std::sync::Arc;

use actix_web::{HttpResponse, get, web};
use sample_data::{SampleCollection, SampleDataset};
use tracing::error;

use crate::domain::DomainError;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

const GENERATION_FAILED: &str = "Sample data could not be generated";

async fn generate(state: &HttpState) -> ApiResult<SampleDataset> {
    let generator = Arc::clone(&state.samples);
    web::block(move || generator.generate())
        .await
        .map_err(|err| {
            error!(error = %err, "sample generation task was cancelled");
            DomainError::internal(GENERATION_FAILED)
        })?
        .map_err(|err| {
            error!(error = %err, "sample generation failed");
            DomainError::internal(GENERATION_FAILED)
        })
}

/// Generate a linked sample dataset for all four collections.
#[utoipa::path(
    get,
    path = "/generate",
    responses(
        (status = 200, description = "Patients, image sets, images and assessments"),
        (status = 500, description = "Generation failed", body = ErrorSchema)
    ),
    tags = ["samples"],
    operation_id = "generateSamples"
)]
#[get("/generate")]
pub async fn generate_all(state: web::Data<HttpState>) -> ApiResult<web::Json<SampleDataset>> {
    generate(&state).await.map(web::Json)
}

/// Generate a linked sample dataset and return one collection.
#[utoipa::path(
    get,
    path = "/generate/{collection}",
    params((
        "collection" = String,
        Path,
        description = "One of patients, sets, image_sets, images or assessments"
    )),
    responses(
        (status = 200, description = "The requested collection"),
        (status = 404, description = "Unknown collection", body = ErrorSchema),
        (status = 500, description = "Generation failed", body = ErrorSchema)
    ),
    tags = ["samples"],
    operation_id = "generateSampleCollection"
)]
#[get("/generate/{collection}")]
pub async fn generate_collection(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let name = path.into_inner();
    let collection = SampleCollection::from_name(&name)
        .ok_or_else(|| DomainError::not_found(format!("no sample collection named {name}")))?;
    let dataset = generate(&state).await?;
    Ok(HttpResponse::Ok().json(dataset.select(collection)))
}
