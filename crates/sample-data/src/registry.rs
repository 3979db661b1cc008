//! Seed registry types and JSON parsing.
//!
//! The registry holds named seed definitions. Each definition fixes the RNG
//! seed and the number of entries generated for every collection, so the
//! same name always yields the same dataset.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::RegistryError;

/// Current supported registry version.
const SUPPORTED_VERSION: u32 = 1;

/// A seed registry containing named seed definitions.
///
/// # Example
///
/// ```
/// use sample_data::SeedRegistry;
///
/// let json = r#"{
///     "version": 1,
///     "seeds": [{
///         "name": "test",
///         "seed": 42,
///         "patientCount": 1,
///         "imageSetCount": 1,
///         "imageCount": 1,
///         "assessmentCount": 1
///     }]
/// }"#;
///
/// let registry = SeedRegistry::from_json(json).expect("valid registry");
/// assert_eq!(registry.seeds().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedRegistry {
    version: u32,
    seeds: Vec<SeedDefinition>,
}

impl SeedRegistry {
    /// Parses a seed registry from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the JSON is malformed, the version is
    /// unsupported, no seeds are defined, or a seed name repeats.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let raw: RawSeedRegistry =
            serde_json::from_str(json).map_err(|e| RegistryError::ParseError {
                message: e.to_string(),
            })?;

        Self::from_raw(raw)
    }

    /// Loads a seed registry from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, RegistryError> {
        let contents = fs::read_to_string(path).map_err(|e| RegistryError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::from_json(&contents)
    }

    fn from_raw(raw: RawSeedRegistry) -> Result<Self, RegistryError> {
        if raw.version != SUPPORTED_VERSION {
            return Err(RegistryError::UnsupportedVersion {
                expected: SUPPORTED_VERSION,
                actual: raw.version,
            });
        }

        if raw.seeds.is_empty() {
            return Err(RegistryError::EmptySeeds);
        }

        let mut names = HashSet::with_capacity(raw.seeds.len());
        for seed in &raw.seeds {
            if !names.insert(seed.name.as_str()) {
                return Err(RegistryError::DuplicateSeedName {
                    name: seed.name.clone(),
                });
            }
        }

        let seeds = raw
            .seeds
            .into_iter()
            .map(|s| SeedDefinition {
                name: s.name,
                seed: s.seed,
                patient_count: s.patient_count,
                image_set_count: s.image_set_count,
                image_count: s.image_count,
                assessment_count: s.assessment_count,
            })
            .collect();

        Ok(Self {
            version: raw.version,
            seeds,
        })
    }

    /// Returns the registry version.
    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Returns all seed definitions.
    #[must_use]
    pub fn seeds(&self) -> &[SeedDefinition] {
        &self.seeds
    }

    /// Finds a seed definition by name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SeedNotFound`] if no seed with the given name
    /// exists.
    pub fn find_seed(&self, name: &str) -> Result<&SeedDefinition, RegistryError> {
        self.seeds
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| RegistryError::SeedNotFound {
                name: name.to_owned(),
            })
    }
}

/// A named seed definition for deterministic dataset generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedDefinition {
    name: String,
    seed: u64,
    patient_count: usize,
    image_set_count: usize,
    image_count: usize,
    assessment_count: usize,
}

impl SeedDefinition {
    /// Returns the seed name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the RNG seed value.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the number of standalone patients to generate.
    #[must_use]
    pub const fn patient_count(&self) -> usize {
        self.patient_count
    }

    /// Returns the number of image sets to generate.
    #[must_use]
    pub const fn image_set_count(&self) -> usize {
        self.image_set_count
    }

    /// Returns the number of images to generate.
    #[must_use]
    pub const fn image_count(&self) -> usize {
        self.image_count
    }

    /// Returns the number of assessments to generate.
    #[must_use]
    pub const fn assessment_count(&self) -> usize {
        self.assessment_count
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSeedRegistry {
    version: u32,
    seeds: Vec<RawSeedDefinition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSeedDefinition {
    name: String,
    seed: u64,
    patient_count: usize,
    image_set_count: usize,
    image_count: usize,
    assessment_count: usize,
}
