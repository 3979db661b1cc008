//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Each driven adapter (database, camera, analyzer) sits behind one of these
//! traits and reports failures through a typed error enum.

mod macros;
pub(crate) use macros::define_port_error;

mod analysis_service;
mod capture_service;
mod record_repository;

#[cfg(test)]
pub use analysis_service::MockAnalysisService;
pub use analysis_service::{
    AnalysisRequest, AnalysisResponse, AnalysisService, AnalysisServiceError,
    FixtureAnalysisService,
};
#[cfg(test)]
pub use capture_service::MockCaptureService;
pub use capture_service::{
    CaptureRequest, CaptureResponse, CaptureService, CaptureServiceError, FixtureCaptureService,
};
#[cfg(test)]
pub use record_repository::MockRecordRepository;
pub use record_repository::{RecordRepository, RecordRepositoryError, SeedBatch, SeedSummary};
