//! Sample data wiring: settings, registry loading, on-demand generation
//! and startup seeding.

mod config;
mod generator;
mod registry;
mod startup;

pub use config::SampleDataSettings;
pub use generator::{SampleGenerationError, SampleGenerator};
pub use registry::{RegistryLoadError, load_registry};
pub use startup::{StartupSeedingError, seed_samples_on_startup};
