//! Persisted entities.
//!
//! Parents are referenced by id only. Images and assessments repeat their
//! ancestors' ids; [`super::verify_linkage`] keeps those copies honest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{EntityKind, RecordColumn, RecordId};

/// A registered patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Patient {
    /// Patient identifier.
    pub id: RecordId,
    /// Given name.
    #[schema(example = "Ada")]
    pub first_name: String,
    /// Family name.
    #[schema(example = "Lovelace")]
    pub last_name: String,
}

/// A group of images taken for one patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImageSet {
    /// Image set identifier.
    pub id: RecordId,
    /// Owning patient.
    pub patient_id: RecordId,
}

/// A captured image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Image {
    /// Image identifier.
    pub id: RecordId,
    /// Owning image set.
    pub set_id: RecordId,
    /// Owning patient, repeated from the image set.
    pub patient_id: RecordId,
    /// Capture time.
    pub image_timestamp: DateTime<Utc>,
    /// Storage location returned by the camera.
    #[schema(example = "captures/4f1d.png")]
    pub uri: String,
}

/// The analyzer's verdict on one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Assessment {
    /// Assessment identifier.
    pub id: RecordId,
    /// Assessed image.
    pub image_id: RecordId,
    /// Image set of the assessed image.
    pub set_id: RecordId,
    /// Patient of the assessed image.
    pub patient_id: RecordId,
    /// Time the verdict was produced.
    pub assessment_timestamp: DateTime<Utc>,
    /// Analysis outcome.
    pub assessment: bool,
}

/// Any persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum Record {
    /// A patient row.
    Patient(Patient),
    /// An image set row.
    ImageSet(ImageSet),
    /// An image row.
    Image(Image),
    /// An assessment row.
    Assessment(Assessment),
}

impl Record {
    /// Identifier of the record.
    #[must_use]
    pub const fn id(&self) -> RecordId {
        match self {
            Self::Patient(patient) => patient.id,
            Self::ImageSet(set) => set.id,
            Self::Image(image) => image.id,
            Self::Assessment(assessment) => assessment.id,
        }
    }

    /// Kind of the record.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Patient(_) => EntityKind::Patient,
            Self::ImageSet(_) => EntityKind::ImageSet,
            Self::Image(_) => EntityKind::Image,
            Self::Assessment(_) => EntityKind::Assessment,
        }
    }
}

/// A borrowed column value, ordered the way the database orders it.
///
/// Values of different variants never compare as equal; callers compare
/// values drawn from the same column only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ColumnValue<'a> {
    /// An identifier column.
    Id(RecordId),
    /// A text column.
    Text(&'a str),
    /// A timestamp column.
    Time(DateTime<Utc>),
    /// A boolean column.
    Flag(bool),
}

impl Record {
    /// Value of `column`, or `None` if the record's kind lacks it.
    #[must_use]
    pub fn column_value(&self, column: RecordColumn) -> Option<ColumnValue<'_>> {
        if column == RecordColumn::Id {
            return Some(ColumnValue::Id(self.id()));
        }
        match (self, column) {
            (Self::Patient(patient), RecordColumn::FirstName) => {
                Some(ColumnValue::Text(&patient.first_name))
            }
            (Self::Patient(patient), RecordColumn::LastName) => {
                Some(ColumnValue::Text(&patient.last_name))
            }
            (Self::ImageSet(set), RecordColumn::PatientId) => Some(ColumnValue::Id(set.patient_id)),
            (Self::Image(image), RecordColumn::SetId) => Some(ColumnValue::Id(image.set_id)),
            (Self::Image(image), RecordColumn::PatientId) => Some(ColumnValue::Id(image.patient_id)),
            (Self::Image(image), RecordColumn::ImageTimestamp) => {
                Some(ColumnValue::Time(image.image_timestamp))
            }
            (Self::Image(image), RecordColumn::Uri) => Some(ColumnValue::Text(&image.uri)),
            (Self::Assessment(assessment), RecordColumn::ImageId) => {
                Some(ColumnValue::Id(assessment.image_id))
            }
            (Self::Assessment(assessment), RecordColumn::SetId) => {
                Some(ColumnValue::Id(assessment.set_id))
            }
            (Self::Assessment(assessment), RecordColumn::PatientId) => {
                Some(ColumnValue::Id(assessment.patient_id))
            }
            (Self::Assessment(assessment), RecordColumn::AssessmentTimestamp) => {
                Some(ColumnValue::Time(assessment.assessment_timestamp))
            }
            (Self::Assessment(assessment), RecordColumn::Assessment) => {
                Some(ColumnValue::Flag(assessment.assessment))
            }
            _ => None,
        }
    }
}

impl From<Patient> for Record {
    fn from(value: Patient) -> Self {
        Self::Patient(value)
    }
}

impl From<ImageSet> for Record {
    fn from(value: ImageSet) -> Self {
        Self::ImageSet(value)
    }
}

impl From<Image> for Record {
    fn from(value: Image) -> Self {
        Self::Image(value)
    }
}

impl From<Assessment> for Record {
    fn from(value: Assessment) -> Self {
        Self::Assessment(value)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;

    fn id(n: u128) -> RecordId {
        RecordId::from_uuid(Uuid::from_u128(n))
    }

    #[test]
    fn records_report_id_and_kind() {
        let record = Record::from(ImageSet {
            id: id(2),
            patient_id: id(1),
        });
        assert_eq!(record.id(), id(2));
        assert_eq!(record.kind(), EntityKind::ImageSet);
    }

    #[test]
    fn records_serialise_without_a_tag() {
        let record = Record::from(Patient {
            id: id(1),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
        });
        let value = serde_json::to_value(&record).expect("serialise");
        assert_eq!(
            value,
            serde_json::json!({
                "id": Uuid::from_u128(1).to_string(),
                "first_name": "Ada",
                "last_name": "Lovelace",
            })
        );
    }

    #[test]
    fn column_values_follow_kind_columns() {
        let record = Record::from(ImageSet {
            id: id(2),
            patient_id: id(1),
        });
        for column in EntityKind::ImageSet.columns() {
            assert!(record.column_value(*column).is_some(), "{column:?}");
        }
        assert_eq!(record.column_value(RecordColumn::Uri), None);
    }

    #[test]
    fn timestamps_serialise_as_rfc3339() {
        let record = Record::from(Image {
            id: id(3),
            set_id: id(2),
            patient_id: id(1),
            image_timestamp: Utc
                .with_ymd_and_hms(2024, 5, 1, 8, 30, 0)
                .single()
                .expect("valid instant"),
            uri: "captures/3.png".to_owned(),
        });
        let value = serde_json::to_value(&record).expect("serialise");
        assert_eq!(
            value.get("image_timestamp"),
            Some(&serde_json::json!("2024-05-01T08:30:00Z"))
        );
    }
}
