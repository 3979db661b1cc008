//! Deterministic dataset generation from seed definitions.
//!
//! Each entry is generated on its own, including every nested parent, so the
//! raw output has nested identifiers that disagree with the flat foreign
//! keys. [`generate_dataset`] repairs those links before returning.

use chrono::{DateTime, TimeDelta, Utc};
use fake::Fake;
use fake::faker::name::raw::{FirstName, LastName};
use fake::locales::EN;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use crate::error::GenerationError;
use crate::linkage::repair_links;
use crate::records::{
    SampleAssessment, SampleDataset, SampleImage, SampleImageSet, SamplePatient,
};
use crate::registry::SeedDefinition;
use crate::timestamp::TimestampFormat;

/// Maximum number of attempts to generate a non-empty name.
const MAX_NAME_ATTEMPTS: usize = 100;

/// Earliest generated timestamp in seconds after the Unix epoch (2024-01-01).
const TIMESTAMP_BASE_SECS: i64 = 1_704_067_200;

/// Width of the window generated timestamps fall into.
const TIMESTAMP_SPAN_SECS: i64 = 365 * 24 * 60 * 60;

/// Knobs applied on top of a seed definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOptions {
    format: TimestampFormat,
    max_count: usize,
}

impl GenerationOptions {
    /// Creates options rendering timestamps with `format` and capping every
    /// collection at `max_count` entries.
    #[must_use]
    pub const fn new(format: TimestampFormat, max_count: usize) -> Self {
        Self { format, max_count }
    }

    /// Timestamp format used for generated entries.
    #[must_use]
    pub const fn format(&self) -> &TimestampFormat {
        &self.format
    }

    /// Upper bound on the size of each collection.
    #[must_use]
    pub const fn max_count(&self) -> usize {
        self.max_count
    }

    fn cap(&self, requested: usize) -> usize {
        requested.min(self.max_count)
    }
}

/// Generates a repaired dataset from a seed definition.
///
/// The same seed definition and options always produce the same dataset.
///
/// # Errors
///
/// Returns [`GenerationError::NameGenerationFailed`] if a non-empty name
/// cannot be produced.
///
/// # Example
///
/// ```
/// use sample_data::{GenerationOptions, SeedRegistry, TimestampFormat, generate_dataset};
///
/// let json = r#"{"version": 1, "seeds": [{"name": "t", "seed": 3,
///     "patientCount": 2, "imageSetCount": 1, "imageCount": 1, "assessmentCount": 1}]}"#;
/// let registry = SeedRegistry::from_json(json).expect("valid");
/// let seed = registry.find_seed("t").expect("found");
/// let options = GenerationOptions::new(TimestampFormat::default(), 10);
///
/// let first = generate_dataset(seed, &options).expect("generated");
/// let second = generate_dataset(seed, &options).expect("generated");
/// assert_eq!(first, second);
/// ```
pub fn generate_dataset(
    seed_def: &SeedDefinition,
    options: &GenerationOptions,
) -> Result<SampleDataset, GenerationError> {
    let mut dataset = generate_nested(seed_def, options)?;
    repair_links(&mut dataset);
    Ok(dataset)
}

/// Generates the raw nested dataset without repairing links.
pub(crate) fn generate_nested(
    seed_def: &SeedDefinition,
    options: &GenerationOptions,
) -> Result<SampleDataset, GenerationError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed_def.seed());
    let format = options.format();

    let patients = (0..options.cap(seed_def.patient_count()))
        .map(|_| generate_patient(&mut rng))
        .collect::<Result<Vec<_>, _>>()?;
    let image_sets = (0..options.cap(seed_def.image_set_count()))
        .map(|_| generate_image_set(&mut rng))
        .collect::<Result<Vec<_>, _>>()?;
    let images = (0..options.cap(seed_def.image_count()))
        .map(|_| generate_image(&mut rng, format))
        .collect::<Result<Vec<_>, _>>()?;
    let assessments = (0..options.cap(seed_def.assessment_count()))
        .map(|_| generate_assessment(&mut rng, format))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SampleDataset {
        patients,
        image_sets,
        images,
        assessments,
    })
}

fn generate_patient(rng: &mut ChaCha8Rng) -> Result<SamplePatient, GenerationError> {
    let id = random_id(rng);
    let first_name = generate_name(rng, |rng| FirstName(EN).fake_with_rng(rng))?;
    let last_name = generate_name(rng, |rng| LastName(EN).fake_with_rng(rng))?;
    Ok(SamplePatient {
        id,
        first_name,
        last_name,
    })
}

fn generate_image_set(rng: &mut ChaCha8Rng) -> Result<SampleImageSet, GenerationError> {
    let id = random_id(rng);
    let patient_id = random_id(rng);
    let patient = generate_patient(rng)?;
    Ok(SampleImageSet {
        id,
        patient_id,
        patient,
    })
}

fn generate_image(
    rng: &mut ChaCha8Rng,
    format: &TimestampFormat,
) -> Result<SampleImage, GenerationError> {
    let id = random_id(rng);
    let set_id = random_id(rng);
    let patient_id = random_id(rng);
    let image_timestamp = format.render(random_instant(rng));
    let uri = format!("captures/{}.png", random_id(rng).simple());
    let image_set = generate_image_set(rng)?;
    Ok(SampleImage {
        id,
        set_id,
        patient_id,
        image_timestamp,
        uri,
        image_set,
    })
}

fn generate_assessment(
    rng: &mut ChaCha8Rng,
    format: &TimestampFormat,
) -> Result<SampleAssessment, GenerationError> {
    let id = random_id(rng);
    let image_id = random_id(rng);
    let set_id = random_id(rng);
    let patient_id = random_id(rng);
    let assessment_timestamp = format.render(random_instant(rng));
    let assessment = rng.random_bool(0.5);
    let image = generate_image(rng, format)?;
    Ok(SampleAssessment {
        id,
        image_id,
        set_id,
        patient_id,
        assessment_timestamp,
        assessment,
        image,
    })
}

fn random_id(rng: &mut ChaCha8Rng) -> Uuid {
    Uuid::from_u128(rng.random())
}

fn random_instant(rng: &mut ChaCha8Rng) -> DateTime<Utc> {
    let offset = rng.random_range(0..TIMESTAMP_SPAN_SECS);
    DateTime::<Utc>::default() + TimeDelta::seconds(TIMESTAMP_BASE_SECS + offset)
}

/// Retries `fake_name` until it yields a non-blank name.
fn generate_name(
    rng: &mut ChaCha8Rng,
    fake_name: impl Fn(&mut ChaCha8Rng) -> String,
) -> Result<String, GenerationError> {
    for _ in 0..MAX_NAME_ATTEMPTS {
        let candidate = fake_name(rng);
        let trimmed = candidate.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_owned());
        }
    }

    Err(GenerationError::NameGenerationFailed {
        max_attempts: MAX_NAME_ATTEMPTS,
    })
}
