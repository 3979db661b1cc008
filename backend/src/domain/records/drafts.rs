//! Insert drafts: records that do not have an id yet.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{Assessment, EntityKind, Image, ImageSet, Patient, Record, RecordId};

/// Reasons a draft cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    /// The generic field map does not decode into the kind's draft.
    #[error("invalid {kind} payload: {message}")]
    Decode {
        /// Kind the map was decoded for.
        kind: EntityKind,
        /// Decoder message.
        message: String,
    },
    /// A required text field is empty after trimming.
    #[error("{field} must not be blank")]
    BlankField {
        /// Name of the blank field.
        field: &'static str,
    },
}

/// A patient awaiting insertion.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewPatient {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

impl NewPatient {
    /// Trims both names and rejects blank ones.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::BlankField`] naming the first blank name.
    pub fn normalized(self) -> Result<Self, DraftError> {
        Ok(Self {
            first_name: non_blank("first_name", &self.first_name)?,
            last_name: non_blank("last_name", &self.last_name)?,
        })
    }
}

/// An image set awaiting insertion.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewImageSet {
    /// Owning patient.
    pub patient_id: RecordId,
}

/// An image awaiting insertion.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewImage {
    /// Owning image set.
    pub set_id: RecordId,
    /// Owning patient.
    pub patient_id: RecordId,
    /// Capture time.
    pub image_timestamp: DateTime<Utc>,
    /// Storage location.
    pub uri: String,
}

impl NewImage {
    /// Trims the uri and rejects a blank one.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::BlankField`] for a blank uri.
    pub fn normalized(self) -> Result<Self, DraftError> {
        Ok(Self {
            uri: non_blank("uri", &self.uri)?,
            ..self
        })
    }
}

/// An assessment awaiting insertion.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewAssessment {
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

/// Any record awaiting insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewRecord {
    /// A patient draft.
    Patient(NewPatient),
    /// An image set draft.
    ImageSet(NewImageSet),
    /// An image draft.
    Image(NewImage),
    /// An assessment draft.
    Assessment(NewAssessment),
}

impl NewRecord {
    /// Decodes a generic field map into the draft for `kind`.
    ///
    /// Text fields are trimmed and must stay non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::Decode`] when fields are missing, unknown or of
    /// the wrong type, and [`DraftError::BlankField`] for blank text.
    ///
    /// # Examples
    /// ```
    /// use imaging_records::domain::records::{EntityKind, NewRecord};
    ///
    /// let data = serde_json::json!({ "first_name": " Ada ", "last_name": "Lovelace" });
    /// let map = data.as_object().cloned().expect("object");
    /// let draft = NewRecord::from_map(EntityKind::Patient, map).expect("valid");
    /// assert_eq!(draft.kind(), EntityKind::Patient);
    /// ```
    pub fn from_map(kind: EntityKind, data: Map<String, Value>) -> Result<Self, DraftError> {
        let value = Value::Object(data);
        let decode = |err: serde_json::Error| DraftError::Decode {
            kind,
            message: err.to_string(),
        };
        let draft = match kind {
            EntityKind::Patient => Self::Patient(serde_json::from_value(value).map_err(decode)?),
            EntityKind::ImageSet => Self::ImageSet(serde_json::from_value(value).map_err(decode)?),
            EntityKind::Image => Self::Image(serde_json::from_value(value).map_err(decode)?),
            EntityKind::Assessment => {
                Self::Assessment(serde_json::from_value(value).map_err(decode)?)
            }
        };
        draft.normalized()
    }

    /// Trims text fields and rejects blank ones.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::BlankField`] naming the first blank field.
    pub fn normalized(self) -> Result<Self, DraftError> {
        match self {
            Self::Patient(patient) => patient.normalized().map(Self::Patient),
            Self::Image(image) => image.normalized().map(Self::Image),
            other @ (Self::ImageSet(_) | Self::Assessment(_)) => Ok(other),
        }
    }

    /// Kind of record the draft becomes.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Patient(_) => EntityKind::Patient,
            Self::ImageSet(_) => EntityKind::ImageSet,
            Self::Image(_) => EntityKind::Image,
            Self::Assessment(_) => EntityKind::Assessment,
        }
    }

    /// Turns the draft into a record carrying `id`.
    #[must_use]
    pub fn with_id(self, id: RecordId) -> Record {
        match self {
            Self::Patient(NewPatient {
                first_name,
                last_name,
            }) => Record::Patient(Patient {
                id,
                first_name,
                last_name,
            }),
            Self::ImageSet(NewImageSet { patient_id }) => {
                Record::ImageSet(ImageSet { id, patient_id })
            }
            Self::Image(NewImage {
                set_id,
                patient_id,
                image_timestamp,
                uri,
            }) => Record::Image(Image {
                id,
                set_id,
                patient_id,
                image_timestamp,
                uri,
            }),
            Self::Assessment(NewAssessment {
                image_id,
                set_id,
                patient_id,
                assessment_timestamp,
                assessment,
            }) => Record::Assessment(Assessment {
                id,
                image_id,
                set_id,
                patient_id,
                assessment_timestamp,
                assessment,
            }),
        }
    }
}

fn non_blank(field: &'static str, value: &str) -> Result<String, DraftError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DraftError::BlankField { field });
    }
    Ok(trimmed.to_owned())
}

impl From<NewPatient> for NewRecord {
    fn from(value: NewPatient) -> Self {
        Self::Patient(value)
    }
}

impl From<NewImageSet> for NewRecord {
    fn from(value: NewImageSet) -> Self {
        Self::ImageSet(value)
    }
}

impl From<NewImage> for NewRecord {
    fn from(value: NewImage) -> Self {
        Self::Image(value)
    }
}

impl From<NewAssessment> for NewRecord {
    fn from(value: NewAssessment) -> Self {
        Self::Assessment(value)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn decodes_and_trims_patient() {
        let draft = NewRecord::from_map(
            EntityKind::Patient,
            map(json!({ "first_name": "  Ada", "last_name": "Lovelace " })),
        )
        .expect("valid draft");
        assert_eq!(
            draft,
            NewRecord::Patient(NewPatient {
                first_name: "Ada".to_owned(),
                last_name: "Lovelace".to_owned(),
            })
        );
    }

    #[rstest]
    #[case(json!({ "first_name": "Ada" }))]
    #[case(json!({ "first_name": "Ada", "last_name": 4 }))]
    #[case(json!({ "first_name": "Ada", "last_name": "L", "age": 36 }))]
    fn rejects_malformed_patient_maps(#[case] data: Value) {
        let err = NewRecord::from_map(EntityKind::Patient, map(data)).expect_err("invalid");
        assert!(matches!(
            err,
            DraftError::Decode {
                kind: EntityKind::Patient,
                ..
            }
        ));
    }

    #[rstest]
    #[case(EntityKind::Patient, json!({ "first_name": " ", "last_name": "L" }), "first_name")]
    #[case(
        EntityKind::Image,
        json!({
            "set_id": Uuid::from_u128(2),
            "patient_id": Uuid::from_u128(1),
            "image_timestamp": "2024-01-01T00:00:00Z",
            "uri": ""
        }),
        "uri"
    )]
    fn rejects_blank_text(
        #[case] kind: EntityKind,
        #[case] data: Value,
        #[case] field: &'static str,
    ) {
        let err = NewRecord::from_map(kind, map(data)).expect_err("blank");
        assert_eq!(err, DraftError::BlankField { field });
    }

    #[test]
    fn decodes_assessment_with_offset_timestamp() {
        let draft = NewRecord::from_map(
            EntityKind::Assessment,
            map(json!({
                "image_id": Uuid::from_u128(3),
                "set_id": Uuid::from_u128(2),
                "patient_id": Uuid::from_u128(1),
                "assessment_timestamp": "2024-01-01T02:00:00+02:00",
                "assessment": true
            })),
        )
        .expect("valid draft");
        let NewRecord::Assessment(assessment) = draft else {
            panic!("expected assessment draft");
        };
        assert_eq!(
            assessment.assessment_timestamp.to_rfc3339(),
            "2024-01-01T00:00:00+00:00"
        );
    }

    #[test]
    fn with_id_keeps_fields() {
        let id = RecordId::from_uuid(Uuid::from_u128(9));
        let record = NewRecord::from(NewImageSet {
            patient_id: RecordId::from_uuid(Uuid::from_u128(1)),
        })
        .with_id(id);
        assert_eq!(
            record,
            Record::ImageSet(ImageSet {
                id,
                patient_id: RecordId::from_uuid(Uuid::from_u128(1)),
            })
        );
    }
}
