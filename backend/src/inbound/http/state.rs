//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use std::sync::Arc;

use crate::domain::{ImagingService, RecordStore};
use crate::sample_data::SampleGenerator;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Generic record access.
    pub store: RecordStore,
    /// Capture and assessment workflows.
    pub imaging: ImagingService,
    /// On-demand sample data generation.
    pub samples: Arc<SampleGenerator>,
}

impl HttpState {
    /// Bundles the handler dependencies.
    pub fn new(store: RecordStore, imaging: ImagingService, samples: Arc<SampleGenerator>) -> Self {
        Self {
            store,
            imaging,
            samples,
        }
    }
}
