//! Atomic dataset persistence.
//!
//! Datasets are written to a hidden temporary file in the target directory
//! and renamed into place, so readers never observe a partial file.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};

use crate::error::SaveError;
use crate::records::SampleDataset;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Saves a dataset as pretty-printed JSON, replacing any existing file.
///
/// # Errors
///
/// Returns [`SaveError::Serialize`] if the dataset cannot be encoded or
/// [`SaveError::Write`] if the file cannot be written.
pub fn save_dataset(dataset: &SampleDataset, path: &Utf8Path) -> Result<(), SaveError> {
    let contents = serde_json::to_string_pretty(dataset).map_err(|err| SaveError::Serialize {
        message: err.to_string(),
    })?;

    let Some(file_name) = path.file_name() else {
        return Err(write_error(path, "dataset path must name a file"));
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = Dir::open_ambient_dir(parent, ambient_authority())
        .map_err(|err| write_error(path, err))?;

    write_atomic(&dir, file_name, path, &contents)
}

fn write_atomic(
    dir: &Dir,
    file_name: &str,
    path: &Utf8Path,
    contents: &str,
) -> Result<(), SaveError> {
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let tmp_name = format!(
        ".{}.tmp.{}.{}.{}",
        file_name,
        std::process::id(),
        suffix,
        counter
    );

    write_to_temp_file(dir, &tmp_name, path, contents)?;
    if let Err(err) = rename_into_place(dir, &tmp_name, file_name) {
        drop(dir.remove_file(&tmp_name));
        return Err(write_error(path, err));
    }
    sync_directory(dir);

    Ok(())
}

fn write_to_temp_file(
    dir: &Dir,
    tmp_name: &str,
    target_path: &Utf8Path,
    contents: &str,
) -> Result<(), SaveError> {
    let tmp_path = target_path.with_file_name(tmp_name);
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir
        .open_with(tmp_name, &options)
        .map_err(|err| write_error(&tmp_path, err))?;

    let written = file
        .write_all(contents.as_bytes())
        .and_then(|()| file.sync_all());
    if let Err(err) = written {
        drop(file);
        drop(dir.remove_file(tmp_name));
        return Err(write_error(&tmp_path, err));
    }

    Ok(())
}

#[cfg(windows)]
fn rename_into_place(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    // Windows rename fails if the target exists.
    match dir.remove_file(target_name) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(tmp_name, dir, target_name)
}

#[cfg(not(windows))]
fn rename_into_place(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    dir.rename(tmp_name, dir, target_name)
}

fn sync_directory(dir: &Dir) {
    // Best effort; the rename has already happened.
    drop(dir.open(".").and_then(|handle| handle.sync_all()));
}

fn write_error(path: &Utf8Path, err: impl ToString) -> SaveError {
    SaveError::Write {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
