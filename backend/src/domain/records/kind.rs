//! Typed registry of entity kinds and their orderable columns.
//!
//! Logical table names arrive as free text in URLs. They resolve here to an
//! [`EntityKind`] or to nothing; no other lookup path exists.

use serde::Serialize;
use utoipa::ToSchema;

/// The four persisted entity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A registered patient.
    Patient,
    /// A group of images belonging to one patient.
    ImageSet,
    /// A captured image.
    Image,
    /// An analysis outcome for one image.
    Assessment,
}

impl EntityKind {
    /// Every kind, parents before children.
    pub const ALL: [Self; 4] = [Self::Patient, Self::ImageSet, Self::Image, Self::Assessment];

    /// Resolves a logical table name.
    ///
    /// # Examples
    /// ```
    /// use imaging_records::domain::records::EntityKind;
    ///
    /// assert_eq!(EntityKind::from_table_name("images"), Some(EntityKind::Image));
    /// assert_eq!(EntityKind::from_table_name("users"), None);
    /// ```
    #[must_use]
    pub fn from_table_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.table_name() == name)
    }

    /// Logical table name of the kind.
    #[must_use]
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::Patient => "patients",
            Self::ImageSet => "image_sets",
            Self::Image => "images",
            Self::Assessment => "assessments",
        }
    }

    /// Columns owned by the kind, in declaration order.
    #[must_use]
    pub const fn columns(self) -> &'static [RecordColumn] {
        match self {
            Self::Patient => &[
                RecordColumn::Id,
                RecordColumn::FirstName,
                RecordColumn::LastName,
            ],
            Self::ImageSet => &[RecordColumn::Id, RecordColumn::PatientId],
            Self::Image => &[
                RecordColumn::Id,
                RecordColumn::SetId,
                RecordColumn::PatientId,
                RecordColumn::ImageTimestamp,
                RecordColumn::Uri,
            ],
            Self::Assessment => &[
                RecordColumn::Id,
                RecordColumn::ImageId,
                RecordColumn::SetId,
                RecordColumn::PatientId,
                RecordColumn::AssessmentTimestamp,
                RecordColumn::Assessment,
            ],
        }
    }

    /// Resolves a column name against this kind's columns.
    ///
    /// # Examples
    /// ```
    /// use imaging_records::domain::records::{EntityKind, RecordColumn};
    ///
    /// assert_eq!(
    ///     EntityKind::Image.resolve_column("image_timestamp"),
    ///     Some(RecordColumn::ImageTimestamp)
    /// );
    /// assert_eq!(EntityKind::Patient.resolve_column("uri"), None);
    /// ```
    #[must_use]
    pub fn resolve_column(self, name: &str) -> Option<RecordColumn> {
        self.columns()
            .iter()
            .copied()
            .find(|column| column.name() == name)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table_name())
    }
}

/// A named column usable for ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordColumn {
    /// Record identifier.
    Id,
    /// Patient given name.
    FirstName,
    /// Patient family name.
    LastName,
    /// Owning patient.
    PatientId,
    /// Owning image set.
    SetId,
    /// Assessed image.
    ImageId,
    /// Image capture time.
    ImageTimestamp,
    /// Image storage location.
    Uri,
    /// Assessment time.
    AssessmentTimestamp,
    /// Assessment verdict.
    Assessment,
}

impl RecordColumn {
    /// Column used when a caller names none.
    pub const DEFAULT_ORDER: Self = Self::Id;

    /// Column name as exposed in payloads and query strings.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::PatientId => "patient_id",
            Self::SetId => "set_id",
            Self::ImageId => "image_id",
            Self::ImageTimestamp => "image_timestamp",
            Self::Uri => "uri",
            Self::AssessmentTimestamp => "assessment_timestamp",
            Self::Assessment => "assessment",
        }
    }
}
