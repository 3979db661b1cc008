//! Patient HTTP handlers.
//!
//! ```text
//! GET /patients
//! POST /patients {"first_name":"Ada","last_name":"Lovelace"}
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::records::{EntityKind, NewPatient, NewRecord, Record};
use crate::domain::DomainError;
use crate::inbound::http::ApiResult;
use crate::inbound::http::records::list_table;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldErrors, FieldName};

const FIRST_NAME: FieldName = FieldName::new("first_name");
const LAST_NAME: FieldName = FieldName::new("last_name");

/// Request body for `POST /patients`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreatePatientRequest {
    /// Given name.
    #[schema(example = "Ada")]
    pub first_name: Option<String>,
    /// Family name.
    #[schema(example = "Lovelace")]
    pub last_name: Option<String>,
}

fn parse_create_patient(payload: CreatePatientRequest) -> ApiResult<NewPatient> {
    let mut errors = FieldErrors::new();
    let first_name = errors.require_text(FIRST_NAME, payload.first_name);
    let last_name = errors.require_text(LAST_NAME, payload.last_name);
    match (first_name, last_name) {
        (Some(first_name), Some(last_name)) => Ok(NewPatient {
            first_name,
            last_name,
        }),
        _ => Err(errors.into_error()),
    }
}

/// List every patient.
#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "All patients", body = [Record]),
        (status = 404, description = "No patients, or patients could not be read", body = ErrorSchema)
    ),
    tags = ["patients"],
    operation_id = "listPatients"
)]
#[get("/patients")]
pub async fn list_patients(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Record>>> {
    list_table(&state, EntityKind::Patient.table_name())
        .await
        .map(web::Json)
}

/// Register a patient.
#[utoipa::path(
    post,
    path = "/patients",
    request_body = CreatePatientRequest,
    responses(
        (status = 200, description = "The stored patient", body = Record),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "The patient could not be stored", body = ErrorSchema)
    ),
    tags = ["patients"],
    operation_id = "createPatient"
)]
#[post("/patients")]
pub async fn create_patient(
    state: web::Data<HttpState>,
    payload: web::Json<CreatePatientRequest>,
) -> ApiResult<web::Json<Record>> {
    let draft = parse_create_patient(payload.into_inner())?;
    state
        .store
        .create(NewRecord::Patient(draft))
        .await
        .map(web::Json)
        .ok_or_else(|| DomainError::internal("Failed to create patient"))
}
