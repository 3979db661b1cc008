//! Domain primitives, services and ports.
//!
//! Purpose: define the imaging record model and the services that read,
//! link and create records, independent of HTTP and SQL.
//!
//! Public surface:
//! - `records`: entities, drafts, linkage rules and nested views.
//! - `RecordStore`: generic data access by logical table name.
//! - `ImagingService`: capture and assessment workflows.
//! - `SampleDataSeeder`: loads generated sample data into the store.
//! - `DomainError`, `ErrorCode` and `TraceId`: the transport-agnostic error
//!   payload and request correlation.

pub mod error;
pub mod imaging_service;
pub mod ports;
pub mod record_store;
pub mod records;
pub mod sample_seeding;
pub mod trace_id;

pub use self::error::{DomainError, ErrorCode};
pub use self::imaging_service::{
    AssessImageRequest, CaptureImageRequest, ImagingError, ImagingService,
};
pub use self::record_store::{DuplicateRecordError, LinkCheckError, RecordStore};
pub use self::sample_seeding::{
    SampleDataSeeder, SampleSeedOutcome, SampleSeedingError, batch_from_rows,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
