//! Nested sample record types.
//!
//! Every child record carries a full copy of its parent chain, mirroring the
//! nested JSON documents a schema-driven faker produces. Field names match
//! the database column names so the JSON can be served as-is.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A generated patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplePatient {
    /// Patient identifier.
    pub id: Uuid,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

/// A generated image set with its nested patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleImageSet {
    /// Image set identifier.
    pub id: Uuid,
    /// Owning patient identifier.
    pub patient_id: Uuid,
    /// Nested owning patient.
    pub patient: SamplePatient,
}

/// A generated image with its nested image set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleImage {
    /// Image identifier.
    pub id: Uuid,
    /// Owning image set identifier.
    pub set_id: Uuid,
    /// Owning patient identifier.
    pub patient_id: Uuid,
    /// Capture time rendered with the configured timestamp format.
    pub image_timestamp: String,
    /// Storage location of the captured image.
    pub uri: String,
    /// Nested owning image set.
    pub image_set: SampleImageSet,
}

/// A generated assessment with its nested image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleAssessment {
    /// Assessment identifier.
    pub id: Uuid,
    /// Assessed image identifier.
    pub image_id: Uuid,
    /// Owning image set identifier.
    pub set_id: Uuid,
    /// Owning patient identifier.
    pub patient_id: Uuid,
    /// Assessment time rendered with the configured timestamp format.
    pub assessment_timestamp: String,
    /// Analysis verdict.
    pub assessment: bool,
    /// Nested assessed image.
    pub image: SampleImage,
}

/// All four generated collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleDataset {
    /// Standalone patients.
    pub patients: Vec<SamplePatient>,
    /// Image sets.
    pub image_sets: Vec<SampleImageSet>,
    /// Images.
    pub images: Vec<SampleImage>,
    /// Assessments.
    pub assessments: Vec<SampleAssessment>,
}

impl SampleDataset {
    /// Borrows a single collection for serialisation.
    #[must_use]
    pub fn select(&self, collection: SampleCollection) -> SampleSelection<'_> {
        match collection {
            SampleCollection::Patients => SampleSelection::Patients(&self.patients),
            SampleCollection::ImageSets => SampleSelection::ImageSets(&self.image_sets),
            SampleCollection::Images => SampleSelection::Images(&self.images),
            SampleCollection::Assessments => SampleSelection::Assessments(&self.assessments),
        }
    }
}

/// Names one collection of a [`SampleDataset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleCollection {
    /// Standalone patients.
    Patients,
    /// Image sets.
    ImageSets,
    /// Images.
    Images,
    /// Assessments.
    Assessments,
}

impl SampleCollection {
    /// Resolves a collection from its route name.
    ///
    /// `sets` is accepted as an alias for `image_sets`.
    ///
    /// ```
    /// use sample_data::SampleCollection;
    ///
    /// assert_eq!(SampleCollection::from_name("sets"), Some(SampleCollection::ImageSets));
    /// assert_eq!(SampleCollection::from_name("users"), None);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "patients" => Some(Self::Patients),
            "sets" | "image_sets" => Some(Self::ImageSets),
            "images" => Some(Self::Images),
            "assessments" => Some(Self::Assessments),
            _ => None,
        }
    }
}

/// A borrowed view of one collection that serialises as a JSON array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SampleSelection<'a> {
    /// Standalone patients.
    Patients(&'a [SamplePatient]),
    /// Image sets.
    ImageSets(&'a [SampleImageSet]),
    /// Images.
    Images(&'a [SampleImage]),
    /// Assessments.
    Assessments(&'a [SampleAssessment]),
}

impl SampleSelection<'_> {
    /// Number of entries in the selected collection.
    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Self::Patients(items) => items.len(),
            Self::ImageSets(items) => items.len(),
            Self::Images(items) => items.len(),
            Self::Assessments(items) => items.len(),
        }
    }

    /// Whether the selected collection is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn patient(id: u128) -> SamplePatient {
        SamplePatient {
            id: Uuid::from_u128(id),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
        }
    }

    #[rstest]
    #[case("patients", Some(SampleCollection::Patients))]
    #[case("sets", Some(SampleCollection::ImageSets))]
    #[case("image_sets", Some(SampleCollection::ImageSets))]
    #[case("images", Some(SampleCollection::Images))]
    #[case("assessments", Some(SampleCollection::Assessments))]
    #[case("Patients", None)]
    #[case("", None)]
    fn resolves_collection_names(#[case] name: &str, #[case] expected: Option<SampleCollection>) {
        assert_eq!(SampleCollection::from_name(name), expected);
    }

    #[test]
    fn selection_serialises_as_plain_array() {
        let dataset = SampleDataset {
            patients: vec![patient(1)],
            ..SampleDataset::default()
        };

        let value =
            serde_json::to_value(dataset.select(SampleCollection::Patients)).expect("serialise");

        assert_eq!(
            value,
            json!([{
                "id": "00000000-0000-0000-0000-000000000001",
                "first_name": "Ada",
                "last_name": "Lovelace"
            }])
        );
    }

    #[test]
    fn image_set_nests_patient_under_snake_case_key() {
        let set = SampleImageSet {
            id: Uuid::from_u128(2),
            patient_id: Uuid::from_u128(1),
            patient: patient(1),
        };

        let value = serde_json::to_value(&set).expect("serialise");

        assert_eq!(value["patient_id"], json!("00000000-0000-0000-0000-000000000001"));
        assert_eq!(value["patient"]["first_name"], json!("Ada"));
    }

    #[test]
    fn selection_reports_length() {
        let dataset = SampleDataset::default();
        let selection = dataset.select(SampleCollection::Images);
        assert!(selection.is_empty());
        assert_eq!(selection.len(), 0);
    }
}
