//! Deterministic sample imaging records for demonstration and seeding.
//!
//! The crate generates patients, image sets, images, and assessments the way
//! a schema-driven fake-data tool would: every entry in every collection is
//! produced independently and carries its own nested parent chain. A repair
//! pass then rewrites the nested identifiers so they agree with each entry's
//! flat foreign keys, and [`flatten`] unwraps the nested chains into rows
//! that can be inserted parent-first.
//!
//! The crate is independent of the backend's domain types.
//!
//! # Example
//!
//! ```
//! use sample_data::{
//!     GenerationOptions, SeedRegistry, TimestampFormat, find_link_conflicts, flatten,
//!     generate_dataset,
//! };
//!
//! let json = r#"{
//!     "version": 1,
//!     "seeds": [{
//!         "name": "ward-rounds",
//!         "seed": 7,
//!         "patientCount": 2,
//!         "imageSetCount": 2,
//!         "imageCount": 3,
//!         "assessmentCount": 3
//!     }]
//! }"#;
//!
//! let registry = SeedRegistry::from_json(json).expect("valid registry");
//! let seed_def = registry.find_seed("ward-rounds").expect("seed exists");
//! let format = TimestampFormat::default();
//! let options = GenerationOptions::new(format.clone(), 50);
//! let dataset = generate_dataset(seed_def, &options).expect("generation succeeds");
//!
//! assert!(find_link_conflicts(&dataset).is_empty());
//! let rows = flatten(&dataset, &format).expect("repaired data flattens");
//! assert!(rows.patients.len() >= 2);
//! ```

mod atomic_io;
mod error;
mod flatten;
mod generator;
mod linkage;
mod records;
mod registry;
mod timestamp;

pub use atomic_io::save_dataset;
pub use error::{FlattenError, GenerationError, RegistryError, SaveError};
pub use flatten::{AssessmentRow, ImageRow, ImageSetRow, PatientRow, SampleRows, flatten};
pub use generator::{GenerationOptions, generate_dataset};
pub use linkage::{LinkConflict, find_link_conflicts, repair_links};
pub use records::{
    SampleAssessment, SampleCollection, SampleDataset, SampleImage, SampleImageSet,
    SamplePatient, SampleSelection,
};
pub use registry::{SeedDefinition, SeedRegistry};
pub use timestamp::{DEFAULT_TIMESTAMP_FORMAT, TimestampFormat};
