//! Nested read views.
//!
//! A view is a record with its parent chain embedded, so a client can read
//! an assessment together with the image, image set and patient it belongs
//! to. Views are assembled by [`crate::domain::RecordStore::expand`].

use serde::Serialize;
use utoipa::ToSchema;

use super::{Assessment, EntityKind, Image, ImageSet, Patient};

/// A patient as returned by read routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PatientView {
    /// The patient row.
    #[serde(flatten)]
    pub patient: Patient,
}

/// An image set with its patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ImageSetView {
    /// The image set row.
    #[serde(flatten)]
    pub image_set: ImageSet,
    /// Owning patient.
    pub patient: Patient,
}

/// An image with its image set and patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ImageView {
    /// The image row.
    #[serde(flatten)]
    pub image: Image,
    /// Owning image set, itself expanded.
    pub image_set: ImageSetView,
}

/// An assessment with the full chain above it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AssessmentView {
    /// The assessment row.
    #[serde(flatten)]
    pub assessment: Assessment,
    /// Assessed image, itself expanded.
    pub image: ImageView,
}

/// Any expanded record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum RecordView {
    /// An expanded patient.
    Patient(PatientView),
    /// An expanded image set.
    ImageSet(ImageSetView),
    /// An expanded image.
    Image(ImageView),
    /// An expanded assessment.
    Assessment(AssessmentView),
}

impl RecordView {
    /// Kind of the record at the root of the view.
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
