//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use imaging_records::domain::ports::{AnalysisService, CaptureService};
use imaging_records::outbound::persistence::DbPool;
use imaging_records::sample_data::SampleGenerator;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) capture: Option<Arc<dyn CaptureService>>,
    pub(crate) analysis: Option<Arc<dyn AnalysisService>>,
    pub(crate) samples: SampleGenerator,
}

impl ServerConfig {
    /// Construct a server configuration with no database or webhooks.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, samples: SampleGenerator) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            capture: None,
            analysis: None,
            samples,
        }
    }

    /// Attach a database connection pool.
    ///
    /// When provided, records are stored in PostgreSQL instead of memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach the camera adapter used by `POST /images`.
    #[must_use]
    pub fn with_capture_service(mut self, capture: Arc<dyn CaptureService>) -> Self {
        self.capture = Some(capture);
        self
    }

    /// Attach the analyzer adapter used by `POST /assessments`.
    #[must_use]
    pub fn with_analysis_service(mut self, analysis: Arc<dyn AnalysisService>) -> Self {
        self.analysis = Some(analysis);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
