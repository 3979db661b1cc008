//! On-demand sample dataset generation for the `/generate` routes.

use std::path::PathBuf;

use camino::Utf8PathBuf;
use sample_data::{
    GenerationError, GenerationOptions, SampleDataset, SaveError, generate_dataset, save_dataset,
};
use thiserror::Error;
use tracing::info;

use super::config::SampleDataSettings;
use super::registry::{RegistryLoadError, load_registry};

/// Errors raised while producing a sample dataset.
#[derive(Debug, Error)]
pub enum SampleGenerationError {
    /// The registry could not be loaded.
    #[error(transparent)]
    Registry(#[from] RegistryLoadError),
    /// Generation failed or the seed is unknown.
    #[error("sample data generation failed: {0}")]
    Generation(#[from] GenerationError),
    /// The dataset could not be saved.
    #[error("sample data could not be saved: {0}")]
    Save(#[from] SaveError),
}

/// Generates repaired sample datasets from a configured seed.
///
/// The registry is read on every call so edits to it take effect without a
/// restart.
#[derive(Debug, Clone)]
pub struct SampleGenerator {
    schema_path: PathBuf,
    seed_name: String,
    options: GenerationOptions,
    save_path: Option<Utf8PathBuf>,
}

impl SampleGenerator {
    /// Creates a generator from explicit parts.
    #[must_use]
    pub const fn new(
        schema_path: PathBuf,
        seed_name: String,
        options: GenerationOptions,
        save_path: Option<Utf8PathBuf>,
    ) -> Self {
        Self {
            schema_path,
            seed_name,
            options,
            save_path,
        }
    }

    /// Creates a generator from settings.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] if the configured timestamp format is
    /// invalid.
    pub fn from_settings(settings: &SampleDataSettings) -> Result<Self, GenerationError> {
        Ok(Self::new(
            settings.schema_path(),
            settings.seed_name().to_owned(),
            settings.generation_options()?,
            settings.save_path(),
        ))
    }

    /// Generates one dataset, saving it when a save path is configured.
    ///
    /// # Errors
    ///
    /// Returns [`SampleGenerationError`] if the registry cannot be loaded, the
    /// seed is unknown, generation fails or the save fails.
    pub fn generate(&self) -> Result<SampleDataset, SampleGenerationError> {
        let registry = load_registry(&self.schema_path)?;
        let seed_def = registry
            .find_seed(&self.seed_name)
            .map_err(RegistryLoadError::from)?;
        let dataset = generate_dataset(seed_def, &self.options)?;

        if let Some(path) = &self.save_path {
            save_dataset(&dataset, path)?;
            info!(path = %path, seed = %self.seed_name, "sample data saved");
        }
        Ok(dataset)
    }
}
