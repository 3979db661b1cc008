//! Wire shapes for the camera and analyzer webhooks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::{AnalysisRequest, AnalysisResponse, CaptureRequest, CaptureResponse};

#[derive(Debug, Serialize)]
pub(super) struct CaptureRequestDto {
    pub(super) patient_id: Uuid,
    pub(super) set_id: Uuid,
}

impl From<CaptureRequest> for CaptureRequestDto {
    fn from(request: CaptureRequest) -> Self {
        Self {
            patient_id: *request.patient_id.as_uuid(),
            set_id: *request.set_id.as_uuid(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CaptureResponseDto {
    pub(super) uri: String,
    #[serde(default)]
    pub(super) image_timestamp: Option<DateTime<Utc>>,
}

impl From<CaptureResponseDto> for CaptureResponse {
    fn from(dto: CaptureResponseDto) -> Self {
        Self {
            uri: dto.uri,
            image_timestamp: dto.image_timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct AnalysisRequestDto<'a> {
    pub(super) image_id: Uuid,
    pub(super) uri: &'a str,
}

impl<'a> From<&'a AnalysisRequest> for AnalysisRequestDto<'a> {
    fn from(request: &'a AnalysisRequest) -> Self {
        Self {
            image_id: *request.image_id.as_uuid(),
            uri: &request.uri,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AnalysisResponseDto {
    pub(super) assessment: bool,
    #[serde(default)]
    pub(super) assessment_timestamp: Option<DateTime<Utc>>,
}

impl From<AnalysisResponseDto> for AnalysisResponse {
    fn from(dto: AnalysisResponseDto) -> Self {
        Self {
            assessment: dto.assessment,
            assessment_timestamp: dto.assessment_timestamp,
        }
    }
}
