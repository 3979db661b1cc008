//! Error types for the sample-data crate.
//!
//! Registry parsing, dataset generation, flattening, and saving each get
//! their own `thiserror` enum so callers can react to the stage that failed.

use std::path::PathBuf;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur when parsing or querying a seed registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The registry file could not be read.
    #[error("failed to read registry file at '{path}': {message}")]
    IoError {
        /// Path to the registry file.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The registry JSON is malformed or missing required fields.
    #[error("invalid registry JSON: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
    },

    /// The registry version is not supported.
    #[error("unsupported registry version: expected {expected}, found {actual}")]
    UnsupportedVersion {
        /// Expected version number.
        expected: u32,
        /// Actual version found in the registry.
        actual: u32,
    },

    /// The registry contains no seed definitions.
    #[error("registry contains no seed definitions")]
    EmptySeeds,

    /// Two seed definitions share a name.
    #[error("seed name '{name}' is defined more than once")]
    DuplicateSeedName {
        /// The repeated seed name.
        name: String,
    },

    /// The requested seed name was not found in the registry.
    #[error("seed '{name}' not found in registry")]
    SeedNotFound {
        /// The seed name that was not found.
        name: String,
    },
}

/// Errors that can occur while generating a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Failed to generate a non-empty name after maximum retries.
    #[error("failed to generate a valid name after {max_attempts} attempts")]
    NameGenerationFailed {
        /// Number of attempts made before giving up.
        max_attempts: usize,
    },

    /// The timestamp format string is unsupported or does not round-trip.
    #[error("invalid timestamp format '{format}'")]
    InvalidTimestampFormat {
        /// The rejected format string.
        format: String,
    },
}

/// Errors raised when unwrapping nested samples into flat rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlattenError {
    /// Nested parent identifiers disagree with the flat foreign keys.
    #[error("dataset has {conflicts} unrepaired link conflicts")]
    UnrepairedLinks {
        /// Number of conflicting fields found.
        conflicts: usize,
    },

    /// A timestamp did not match the configured format.
    #[error("timestamp '{value}' does not match format '{format}'")]
    InvalidTimestamp {
        /// The raw timestamp value.
        value: String,
        /// The format it was parsed with.
        format: String,
    },
}

/// Errors raised while saving a generated dataset to disk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    /// The dataset could not be serialised.
    #[error("failed to serialise dataset: {message}")]
    Serialize {
        /// Description of the serialisation failure.
        message: String,
    },

    /// The target file could not be written.
    #[error("failed to write dataset to '{path}': {message}")]
    Write {
        /// Path that was being written.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },
}
