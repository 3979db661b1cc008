//! Driven port for the camera interface.
//!
//! The camera captures an image for a patient's image set and reports where
//! the image was stored.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::records::RecordId;

use super::define_port_error;

/// Capture request sent to the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRequest {
    /// Patient being imaged.
    pub patient_id: RecordId,
    /// Image set receiving the capture.
    pub set_id: RecordId,
}

/// Camera reply describing the stored image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureResponse {
    /// Storage location of the captured image.
    pub uri: String,
    /// Capture time reported by the camera, if any.
    pub image_timestamp: Option<DateTime<Utc>>,
}

define_port_error! {
    /// Errors surfaced while calling the camera.
    pub enum CaptureServiceError {
        /// Network transport failed before receiving a response.
        Transport { message: String } => "camera transport failed: {message}",
        /// The call exceeded its timeout.
        Timeout { message: String } => "camera timeout: {message}",
        /// The camera answered with a non-success status.
        Status { status: u16, message: String } =>
            "camera returned status {status}: {message}",
        /// The reply could not be decoded.
        Decode { message: String } => "camera response decode failed: {message}",
    }
}

/// Port for triggering image capture.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaptureService: Send + Sync {
    /// Captures one image and returns where it was stored.
    async fn capture(&self, request: CaptureRequest)
    -> Result<CaptureResponse, CaptureServiceError>;
}

/// Camera stand-in for deployments without a camera interface.
///
/// Every capture yields a fresh `captures/<uuid>.png` location and no
/// timestamp.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureCaptureService;

#[async_trait]
impl CaptureService for FixtureCaptureService {
    async fn capture(
        &self,
        _request: CaptureRequest,
    ) -> Result<CaptureResponse, CaptureServiceError> {
        Ok(CaptureResponse {
            uri: format!("captures/{}.png", Uuid::new_v4().simple()),
            image_timestamp: None,
        })
    }
}
