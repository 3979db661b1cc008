//! Sample data seeding orchestration.
//!
//! Generates a repaired sample dataset for a named seed, flattens it into
//! rows, validates the rows as domain records and hands them to the record
//! store as one batch.

use sample_data::{
    AssessmentRow, FlattenError, GenerationError, GenerationOptions, ImageRow, ImageSetRow,
    PatientRow, RegistryError, SampleRows, SeedRegistry, flatten, generate_dataset,
};
use thiserror::Error;

use crate::domain::RecordStore;
use crate::domain::ports::{RecordRepositoryError, SeedBatch, SeedSummary};
use crate::domain::records::{
    Assessment, DraftError, Image, ImageSet, NewImage, NewPatient, Patient, RecordId,
};

/// Result of seeding one named sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSeedOutcome {
    /// Seed definition that was applied.
    pub seed_name: String,
    /// Number of rows handed to the store.
    pub rows: usize,
    /// What the store did with them.
    pub summary: SeedSummary,
}

/// Errors raised while preparing or applying sample data.
#[derive(Debug, Error)]
pub enum SampleSeedingError {
    /// Seed registry lookup failed.
    #[error("seed registry error: {0}")]
    Registry(#[from] RegistryError),
    /// Dataset generation failed.
    #[error("sample data generation failed: {0}")]
    Generation(#[from] GenerationError),
    /// The generated dataset could not be flattened.
    #[error("sample data flattening failed: {0}")]
    Flatten(#[from] FlattenError),
    /// A generated row failed record validation.
    #[error("generated row failed validation: {0}")]
    InvalidRow(#[from] DraftError),
    /// The store rejected the batch.
    #[error("sample data persistence error: {0}")]
    Persistence(#[from] RecordRepositoryError),
}

/// Seeds the record store from the sample-data registry.
#[derive(Clone)]
pub struct SampleDataSeeder {
    store: RecordStore,
}

impl SampleDataSeeder {
    /// Creates a seeder writing through `store`.
    #[must_use]
    pub const fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Generates and stores the sample named `seed_name`.
    ///
    /// Rows whose id already exists are skipped, so seeding the same sample
    /// twice leaves the store unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SampleSeedingError`] if lookup, generation, validation or
    /// persistence fails.
    pub async fn seed_from_registry(
        &self,
        registry: &SeedRegistry,
        seed_name: &str,
        options: &GenerationOptions,
    ) -> Result<SampleSeedOutcome, SampleSeedingError> {
        let seed_def = registry.find_seed(seed_name)?;
        let dataset = generate_dataset(seed_def, options)?;
        let rows = flatten(&dataset, options.format())?;
        let batch = batch_from_rows(rows)?;
        let row_count = batch.len();
        let summary = self.store.seed(batch).await?;

        Ok(SampleSeedOutcome {
            seed_name: seed_def.name().to_owned(),
            rows: row_count,
            summary,
        })
    }
}

/// Converts flat sample rows into validated domain records.
///
/// # Errors
///
/// Returns [`DraftError::BlankField`] if a generated name or uri is blank.
pub fn batch_from_rows(rows: SampleRows) -> Result<SeedBatch, DraftError> {
    let SampleRows {
        patients,
        image_sets,
        images,
        assessments,
    } = rows;

    Ok(SeedBatch {
        patients: patients
            .into_iter()
            .map(patient_from_row)
            .collect::<Result<_, _>>()?,
        image_sets: image_sets.into_iter().map(image_set_from_row).collect(),
        images: images
            .into_iter()
            .map(image_from_row)
            .collect::<Result<_, _>>()?,
        assessments: assessments.into_iter().map(assessment_from_row).collect(),
    })
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DraftError> {
    let draft = NewPatient {
        first_name: row.first_name,
        last_name: row.last_name,
    }
    .normalized()?;
    Ok(Patient {
        id: RecordId::from_uuid(row.id),
        first_name: draft.first_name,
        last_name: draft.last_name,
    })
}

fn image_set_from_row(row: ImageSetRow) -> ImageSet {
    ImageSet {
        id: RecordId::from_uuid(row.id),
        patient_id: RecordId::from_uuid(row.patient_id),
    }
}

fn image_from_row(row: ImageRow) -> Result<Image, DraftError> {
    let draft = NewImage {
        set_id: RecordId::from_uuid(row.set_id),
        patient_id: RecordId::from_uuid(row.patient_id),
        image_timestamp: row.image_timestamp,
        uri: row.uri,
    }
    .normalized()?;
    Ok(Image {
        id: RecordId::from_uuid(row.id),
        set_id: draft.set_id,
        patient_id: draft.patient_id,
        image_timestamp: draft.image_timestamp,
        uri: draft.uri,
    })
}

fn assessment_from_row(row: AssessmentRow) -> Assessment {
    Assessment {
        id: RecordId::from_uuid(row.id),
        image_id: RecordId::from_uuid(row.image_id),
        set_id: RecordId::from_uuid(row.set_id),
        patient_id: RecordId::from_uuid(row.patient_id),
        assessment_timestamp: row.assessment_timestamp,
        assessment: row.assessment,
    }
}
