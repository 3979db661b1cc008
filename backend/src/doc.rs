//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer
//! - **Schemas**: the record entities, their nested views, request bodies and
//!   the [`ErrorSchema`] envelope
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use utoipa::OpenApi;

use crate::domain::ErrorCode;
use crate::domain::records::{
    Assessment, AssessmentView, EntityKind, Image, ImageSet, ImageSetView, ImageView, Patient,
    PatientView, Record, RecordId, RecordView,
};
use crate::inbound::http::assessments::AssessImageBody;
use crate::inbound::http::image_sets::CreateImageSetRequest;
use crate::inbound::http::images::CaptureImageBody;
use crate::inbound::http::patients::CreatePatientRequest;
use crate::inbound::http::records::LatestQuery;
use crate::inbound::http::schemas::ErrorSchema;

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Imaging records API",
        description = "Patients, image sets, captured images and their assessments.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::http::patients::list_patients,
        crate::inbound::http::patients::create_patient,
        crate::inbound::http::image_sets::create_image_set,
        crate::inbound::http::images::latest_image,
        crate::inbound::http::images::get_image,
        crate::inbound::http::images::capture_image,
        crate::inbound::http::assessments::assess_image,
        crate::inbound::http::records::list_records,
        crate::inbound::http::records::latest_record,
        crate::inbound::http::records::get_record,
        crate::inbound::http::samples::generate_all,
        crate::inbound::http::samples::generate_collection,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCode,
        RecordId,
        EntityKind,
        Patient,
        ImageSet,
        Image,
        Assessment,
        Record,
        PatientView,
        ImageSetView,
        ImageView,
        AssessmentView,
        RecordView,
        CreatePatientRequest,
        CreateImageSetRequest,
        CaptureImageBody,
        AssessImageBody,
        LatestQuery,
    )),
    tags(
        (name = "health", description = "Endpoints for health checks"),
        (name = "patients", description = "Patient records"),
        (name = "image_sets", description = "Image sets grouping a patient's captures"),
        (name = "images", description = "Camera captures"),
        (name = "assessments", description = "Analyzer verdicts on images"),
        (name = "records", description = "Generic access to any table by name"),
        (name = "samples", description = "Generated sample datasets")
    )
)]
pub struct ApiDoc;
