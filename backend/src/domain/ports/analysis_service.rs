//! Driven port for the image analyzer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::records::RecordId;

use super::define_port_error;

/// Analysis request naming the image to assess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Image being assessed.
    pub image_id: RecordId,
    /// Storage location of the image.
    pub uri: String,
}

/// Analyzer verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisResponse {
    /// Outcome of the analysis.
    pub assessment: bool,
    /// Time the analyzer produced the verdict, if reported.
    pub assessment_timestamp: Option<DateTime<Utc>>,
}

define_port_error! {
    /// Errors surfaced while calling the analyzer.
    pub enum AnalysisServiceError {
        /// Network transport failed before receiving a response.
        Transport { message: String } => "analyzer transport failed: {message}",
        /// The call exceeded its timeout.
        Timeout { message: String } => "analyzer timeout: {message}",
        /// The analyzer answered with a non-success status.
        Status { status: u16, message: String } =>
            "analyzer returned status {status}: {message}",
        /// The reply could not be decoded.
        Decode { message: String } => "analyzer response decode failed: {message}",
    }
}

/// Port for requesting image analysis.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Assesses one image.
    async fn analyze(
        &self,
        request: AnalysisRequest,
    ) -> Result<AnalysisResponse, AnalysisServiceError>;
}

/// Analyzer stand-in for deployments without an analyzer.
///
/// Every image is reported as negative with no timestamp.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureAnalysisService;

#[async_trait]
impl AnalysisService for FixtureAnalysisService {
    async fn analyze(
        &self,
        _request: AnalysisRequest,
    ) -> Result<AnalysisResponse, AnalysisServiceError> {
        Ok(AnalysisResponse {
            assessment: false,
            assessment_timestamp: None,
        })
    }
}
