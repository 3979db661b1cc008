//! Startup seeding orchestration.

use sample_data::GenerationError;
use thiserror::Error;
use tracing::info;

use crate::domain::{RecordStore, SampleDataSeeder, SampleSeedOutcome, SampleSeedingError};

use super::config::SampleDataSettings;
use super::registry::{RegistryLoadError, load_registry};

/// Errors returned while executing startup seeding.
#[derive(Debug, Error)]
pub enum StartupSeedingError {
    /// The registry could not be loaded.
    #[error(transparent)]
    Registry(#[from] RegistryLoadError),
    /// The configured timestamp format is invalid.
    #[error("sample data settings are invalid: {0}")]
    Settings(#[from] GenerationError),
    /// Seed generation or persistence failed.
    #[error("sample data seeding error: {0}")]
    Seeding(#[from] SampleSeedingError),
    /// Seed name must not be empty.
    #[error("seed name must not be empty")]
    EmptySeedName,
}

/// Seed the record store from the sample registry when enabled.
///
/// # Examples
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use imaging_records::domain::RecordStore;
/// use imaging_records::outbound::memory::InMemoryRecordRepository;
/// use imaging_records::sample_data::{SampleDataSettings, seed_samples_on_startup};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let store = RecordStore::new(Arc::new(InMemoryRecordRepository::new()));
/// let outcome = seed_samples_on_startup(&SampleDataSettings::default(), &store).await?;
/// assert!(outcome.is_none());
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`StartupSeedingError`] if the settings are invalid, the registry
/// cannot be loaded or seeding fails.
pub async fn seed_samples_on_startup(
    settings: &SampleDataSettings,
    store: &RecordStore,
) -> Result<Option<SampleSeedOutcome>, StartupSeedingError> {
    if !settings.seed_on_startup {
        info!(reason = "disabled", "sample data seeding skipped");
        return Ok(None);
    }

    let seed_name = settings.seed_name().trim();
    if seed_name.is_empty() {
        return Err(StartupSeedingError::EmptySeedName);
    }

    let options = settings.generation_options()?;
    let registry = load_registry(&settings.schema_path())?;
    let seeder = SampleDataSeeder::new(store.clone());
    let outcome = seeder
        .seed_from_registry(&registry, seed_name, &options)
        .await?;

    if outcome.summary.inserted == 0 {
        info!(
            seed = %outcome.seed_name,
            rows = outcome.rows,
            "sample data already present; nothing inserted"
        );
    } else {
        info!(
            seed = %outcome.seed_name,
            inserted = outcome.summary.inserted,
            skipped = outcome.summary.skipped,
            "sample data seeding applied"
        );
    }

    Ok(Some(outcome))
}
