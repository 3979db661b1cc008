//! Record identifiers and their allocation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Upper bound on id draws when allocating a fresh record id.
pub const MAX_ID_ATTEMPTS: usize = 8;

/// Identifier shared by every persisted record.
///
/// # Examples
/// ```
/// use imaging_records::domain::records::RecordId;
/// use uuid::Uuid;
///
/// let id = RecordId::from_uuid(Uuid::nil());
/// assert_eq!(id.to_string(), "00000000-0000-0000-0000-000000000000");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Draws a random version 4 identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The wrapped UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for RecordId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<RecordId> for Uuid {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Source of candidate ids for new records.
///
/// Adapters draw from it until a candidate is unused, so tests can force
/// collisions with a scripted source.
pub trait IdSource: Send + Sync {
    /// Returns the next candidate id.
    fn next_id(&self) -> RecordId;
}

/// [`IdSource`] backed by the operating system's random number generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdSource;

impl IdSource for RandomIdSource {
    fn next_id(&self) -> RecordId {
        RecordId::random()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_ids_are_version_four() {
        let id = RecordId::random();
        assert_eq!(id.as_uuid().get_version_num(), 4);
    }

    #[test]
    fn random_source_yields_distinct_ids() {
        let source = RandomIdSource;
        assert_ne!(source.next_id(), source.next_id());
    }

    #[test]
    fn serialises_as_plain_uuid_string() {
        let id = RecordId::from_uuid(Uuid::from_u128(7));
        let value = serde_json::to_value(id).expect("serialise");
        assert_eq!(value, serde_json::json!(Uuid::from_u128(7).to_string()));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("patient-7".parse::<RecordId>().is_err());
    }
}
