//! Seed registry loading through `cap-std`.

use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use sample_data::{RegistryError, SeedRegistry};
use thiserror::Error;

/// Errors returned while loading the seed registry.
#[derive(Debug, Error)]
pub enum RegistryLoadError {
    /// Registry file could not be read.
    #[error("failed to read registry at {path}: {source}")]
    Read {
        /// Path to the registry file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Registry parsing failed.
    #[error("registry parse error: {0}")]
    Parse(#[from] RegistryError),
}

fn read_error(path: &Path, source: std::io::Error) -> RegistryLoadError {
    RegistryLoadError::Read {
        path: path.to_path_buf(),
        source,
    }
}

/// Reads and parses the registry at `path`.
///
/// # Errors
///
/// Returns [`RegistryLoadError`] if the file cannot be opened, is not UTF-8
/// or does not hold a valid registry.
pub fn load_registry(path: &Path) -> Result<SeedRegistry, RegistryLoadError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        read_error(
            path,
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "registry path must be a file",
            ),
        )
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())
        .map_err(|source| read_error(path, source))?;
    let contents = dir
        .read_to_string(Path::new(file_name))
        .map_err(|source| read_error(path, source))?;
    Ok(SeedRegistry::from_json(&contents)?)
}
