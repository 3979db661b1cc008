//! Unwraps nested samples into flat, de-duplicated rows.
//!
//! Every nested parent becomes a row of its own table. Rows are keyed by
//! identifier and the first occurrence wins, so a repaired dataset yields a
//! set of rows whose foreign keys all resolve within the same batch.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::FlattenError;
use crate::linkage::find_link_conflicts;
use crate::records::{
    SampleAssessment, SampleDataset, SampleImage, SampleImageSet, SamplePatient,
};
use crate::timestamp::TimestampFormat;

/// A flat patient row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientRow {
    /// Patient identifier.
    pub id: Uuid,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

/// A flat image set row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSetRow {
    /// Image set identifier.
    pub id: Uuid,
    /// Owning patient.
    pub patient_id: Uuid,
}

/// A flat image row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRow {
    /// Image identifier.
    pub id: Uuid,
    /// Owning image set.
    pub set_id: Uuid,
    /// Owning patient.
    pub patient_id: Uuid,
    /// Capture time.
    pub image_timestamp: DateTime<Utc>,
    /// Storage location.
    pub uri: String,
}

/// A flat assessment row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentRow {
    /// Assessment identifier.
    pub id: Uuid,
    /// Assessed image.
    pub image_id: Uuid,
    /// Owning image set.
    pub set_id: Uuid,
    /// Owning patient.
    pub patient_id: Uuid,
    /// Assessment time.
    pub assessment_timestamp: DateTime<Utc>,
    /// Analysis verdict.
    pub assessment: bool,
}

/// Flat rows grouped by table, ready for parent-first insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleRows {
    /// Patient rows.
    pub patients: Vec<PatientRow>,
    /// Image set rows.
    pub image_sets: Vec<ImageSetRow>,
    /// Image rows.
    pub images: Vec<ImageRow>,
    /// Assessment rows.
    pub assessments: Vec<AssessmentRow>,
}

impl SampleRows {
    /// Total number of rows across all tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patients.len() + self.image_sets.len() + self.images.len() + self.assessments.len()
    }

    /// Whether every table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Flattens a repaired dataset into rows.
///
/// # Errors
///
/// Returns [`FlattenError::UnrepairedLinks`] when nested identifiers still
/// disagree with flat keys, or [`FlattenError::InvalidTimestamp`] when a
/// timestamp does not match `format`.
pub fn flatten(
    dataset: &SampleDataset,
    format: &TimestampFormat,
) -> Result<SampleRows, FlattenError> {
    let conflicts = find_link_conflicts(dataset);
    if !conflicts.is_empty() {
        return Err(FlattenError::UnrepairedLinks {
            conflicts: conflicts.len(),
        });
    }

    let mut builder = RowBuilder::new(format);
    for patient in &dataset.patients {
        builder.patient(patient);
    }
    for set in &dataset.image_sets {
        builder.image_set(set);
    }
    for image in &dataset.images {
        builder.image(image)?;
    }
    for assessment in &dataset.assessments {
        builder.assessment(assessment)?;
    }
    Ok(builder.rows)
}

struct RowBuilder<'a> {
    format: &'a TimestampFormat,
    seen: HashSet<Uuid>,
    rows: SampleRows,
}

impl<'a> RowBuilder<'a> {
    fn new(format: &'a TimestampFormat) -> Self {
        Self {
            format,
            seen: HashSet::new(),
            rows: SampleRows::default(),
        }
    }

    fn patient(&mut self, patient: &SamplePatient) {
        if self.seen.insert(patient.id) {
            self.rows.patients.push(PatientRow {
                id: patient.id,
                first_name: patient.first_name.clone(),
                last_name: patient.last_name.clone(),
            });
        }
    }

    fn image_set(&mut self, set: &SampleImageSet) {
        self.patient(&set.patient);
        if self.seen.insert(set.id) {
            self.rows.image_sets.push(ImageSetRow {
                id: set.id,
                patient_id: set.patient_id,
            });
        }
    }

    fn image(&mut self, image: &SampleImage) -> Result<(), FlattenError> {
        self.image_set(&image.image_set);
        if self.seen.insert(image.id) {
            self.rows.images.push(ImageRow {
                id: image.id,
                set_id: image.set_id,
                patient_id: image.patient_id,
                image_timestamp: self.format.parse(&image.image_timestamp)?,
                uri: image.uri.clone(),
            });
        }
        Ok(())
    }

    fn assessment(&mut self, assessment: &SampleAssessment) -> Result<(), FlattenError> {
        self.image(&assessment.image)?;
        if self.seen.insert(assessment.id) {
            self.rows.assessments.push(AssessmentRow {
                id: assessment.id,
                image_id: assessment.image_id,
                set_id: assessment.set_id,
                patient_id: assessment.patient_id,
                assessment_timestamp: self.format.parse(&assessment.assessment_timestamp)?,
                assessment: assessment.assessment,
            });
        }
        Ok(())
    }
}
