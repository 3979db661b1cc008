//! Validated `strftime` patterns for sample timestamps.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use crate::error::{FlattenError, GenerationError};

/// Default pattern used to render and parse sample timestamps.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S+00:00";

/// A `strftime` pattern known to contain only supported specifiers.
///
/// Rendering never fails once a pattern has been accepted.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use sample_data::TimestampFormat;
///
/// let format = TimestampFormat::default();
/// let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).single().expect("valid");
/// let rendered = format.render(at);
///
/// assert_eq!(rendered, "2024-03-01T09:30:00+00:00");
/// assert_eq!(format.parse(&rendered).expect("round trip"), at);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampFormat {
    pattern: String,
}

impl TimestampFormat {
    /// Validates a `strftime` pattern.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidTimestampFormat`] when the pattern is
    /// blank, contains a specifier chrono cannot format, or renders instants
    /// that cannot be parsed back to the same second.
    pub fn new(pattern: impl Into<String>) -> Result<Self, GenerationError> {
        let pattern = pattern.into();
        let unformattable = pattern.trim().is_empty()
            || StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error));
        if unformattable {
            return Err(GenerationError::InvalidTimestampFormat { format: pattern });
        }
        let format = Self { pattern };
        if !format.round_trips() {
            return Err(GenerationError::InvalidTimestampFormat {
                format: format.pattern,
            });
        }
        Ok(format)
    }

    fn round_trips(&self) -> bool {
        // Every field differs so dropped or swapped specifiers show up.
        let Some(at) = Utc.with_ymd_and_hms(2001, 2, 3, 4, 5, 6).single() else {
            return false;
        };
        self.parse(&self.render(at)).is_ok_and(|parsed| parsed == at)
    }

    /// The underlying pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Renders a UTC instant with this pattern.
    #[must_use]
    pub fn render(&self, at: DateTime<Utc>) -> String {
        at.format(&self.pattern).to_string()
    }

    /// Parses a rendered timestamp back into a UTC instant.
    ///
    /// Patterns that carry a real offset specifier are honoured; patterns
    /// without one are read as UTC wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns [`FlattenError::InvalidTimestamp`] when `raw` does not match.
    pub fn parse(&self, raw: &str) -> Result<DateTime<Utc>, FlattenError> {
        DateTime::parse_from_str(raw, &self.pattern)
            .map(|parsed| parsed.with_timezone(&Utc))
            .or_else(|_| NaiveDateTime::parse_from_str(raw, &self.pattern).map(|n| n.and_utc()))
            .map_err(|_| FlattenError::InvalidTimestamp {
                value: raw.to_owned(),
                format: self.pattern.clone(),
            })
    }
}

impl Default for TimestampFormat {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_TIMESTAMP_FORMAT.to_owned(),
        }
    }
}
