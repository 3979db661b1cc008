//! Sample data configuration loaded via OrthoConfig.

use std::path::PathBuf;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use sample_data::{DEFAULT_TIMESTAMP_FORMAT, GenerationError, GenerationOptions, TimestampFormat};
use serde::Deserialize;

const DEFAULT_SEED_NAME: &str = "ward-rounds";
const DEFAULT_MAX_COUNT: usize = 50;
const DEFAULT_SAVE_PATH: &str = "generated_data.json";

fn default_schema_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("sample-data")
        .join("seeds.json")
}

/// Configuration for sample generation, the `/generate` routes and startup
/// seeding.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SAMPLE_DATA")]
pub struct SampleDataSettings {
    /// Seed registry JSON file.
    pub schema_path: Option<PathBuf>,
    /// Seed definition to generate from.
    pub seed_name: Option<String>,
    /// Upper bound on entries per collection.
    pub max_count: Option<usize>,
    /// `chrono` pattern used to render and parse sample timestamps.
    pub timestamp_format: Option<String>,
    /// Write every generated dataset to [`Self::save_path`].
    #[ortho_config(default = false)]
    pub save_to_json: bool,
    /// Destination for saved datasets.
    pub save_path: Option<String>,
    /// Seed the record store from the registry when the server starts.
    #[ortho_config(default = false)]
    pub seed_on_startup: bool,
}

impl SampleDataSettings {
    /// Return the configured seed name, falling back to the default.
    #[must_use]
    pub fn seed_name(&self) -> &str {
        self.seed_name.as_deref().unwrap_or(DEFAULT_SEED_NAME)
    }

    /// Return the configured registry path, falling back to the bundled
    /// fixture.
    #[must_use]
    pub fn schema_path(&self) -> PathBuf {
        self.schema_path.clone().unwrap_or_else(default_schema_path)
    }

    /// Return the per-collection cap.
    #[must_use]
    pub fn max_count(&self) -> usize {
        self.max_count.unwrap_or(DEFAULT_MAX_COUNT)
    }

    /// Enable saving when the application runs in debug mode.
    ///
    /// Debug deployments keep a copy of every generated dataset even if
    /// `save_to_json` is unset.
    #[must_use]
    pub const fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.save_to_json |= debug_mode;
        self
    }

    /// Return where generated datasets are saved when saving is enabled.
    #[must_use]
    pub fn save_path(&self) -> Option<Utf8PathBuf> {
        self.save_to_json.then(|| {
            Utf8PathBuf::from(self.save_path.as_deref().unwrap_or(DEFAULT_SAVE_PATH))
        })
    }

    /// Build generation options from the configured format and cap.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] if the timestamp pattern is invalid.
    pub fn generation_options(&self) -> Result<GenerationOptions, GenerationError> {
        let pattern = self
            .timestamp_format
            .as_deref()
            .unwrap_or(DEFAULT_TIMESTAMP_FORMAT);
        Ok(GenerationOptions::new(
            TimestampFormat::new(pattern)?,
            self.max_count(),
        ))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for sample data configuration parsing.

    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use super::*;

    const VARS: [&str; 7] = [
        "SAMPLE_DATA_SCHEMA_PATH",
        "SAMPLE_DATA_SEED_NAME",
        "SAMPLE_DATA_MAX_COUNT",
        "SAMPLE_DATA_TIMESTAMP_FORMAT",
        "SAMPLE_DATA_SAVE_TO_JSON",
        "SAMPLE_DATA_SAVE_PATH",
        "SAMPLE_DATA_SEED_ON_STARTUP",
    ];

    fn load_from_empty_args() -> SampleDataSettings {
        SampleDataSettings::load_from_iter([OsString::from("imaging-records")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.seed_name(), DEFAULT_SEED_NAME);
        assert_eq!(settings.schema_path(), default_schema_path());
        assert_eq!(settings.max_count(), DEFAULT_MAX_COUNT);
        assert!(settings.save_path().is_none());
        assert!(!settings.seed_on_startup);
        let options = settings.generation_options().expect("default format");
        assert_eq!(options.format().pattern(), DEFAULT_TIMESTAMP_FORMAT);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("SAMPLE_DATA_SCHEMA_PATH", Some("/tmp/seeds.json".to_owned())),
            ("SAMPLE_DATA_SEED_NAME", Some("single-patient".to_owned())),
            ("SAMPLE_DATA_MAX_COUNT", Some("5".to_owned())),
            ("SAMPLE_DATA_TIMESTAMP_FORMAT", Some("%Y-%m-%d %H:%M:%S%:z".to_owned())),
            ("SAMPLE_DATA_SAVE_TO_JSON", Some("true".to_owned())),
            ("SAMPLE_DATA_SAVE_PATH", Some("out/samples.json".to_owned())),
            ("SAMPLE_DATA_SEED_ON_STARTUP", Some("true".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.schema_path(), PathBuf::from("/tmp/seeds.json"));
        assert_eq!(settings.seed_name(), "single-patient");
        assert_eq!(settings.max_count(), 5);
        assert_eq!(
            settings.save_path(),
            Some(Utf8PathBuf::from("out/samples.json"))
        );
        assert!(settings.seed_on_startup);
    }

    #[rstest]
    fn save_path_defaults_when_saving_enabled() {
        let settings = SampleDataSettings {
            save_to_json: true,
            ..SampleDataSettings::default()
        };
        assert_eq!(
            settings.save_path(),
            Some(Utf8PathBuf::from(DEFAULT_SAVE_PATH))
        );
    }

    #[rstest]
    #[case::debug_only(false, true, true)]
    #[case::flag_only(true, false, true)]
    #[case::neither(false, false, false)]
    fn debug_mode_enables_saving(
        #[case] save_to_json: bool,
        #[case] debug_mode: bool,
        #[case] saves: bool,
    ) {
        let settings = SampleDataSettings {
            save_to_json,
            ..SampleDataSettings::default()
        }
        .with_debug_mode(debug_mode);
        assert_eq!(settings.save_path().is_some(), saves);
    }
}
