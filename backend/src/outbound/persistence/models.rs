//! Diesel row structs for the imaging tables.
//!
//! Rows mirror the domain entities field for field; the conversions below
//! only swap raw UUIDs for [`RecordId`]s.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::records::{Assessment, Image, ImageSet, Patient, RecordId};

use super::schema::{assessments, image_sets, images, patients};

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = patients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PatientRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = image_sets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ImageSetRow {
    pub id: Uuid,
    pub patient_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = images)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ImageRow {
    pub id: Uuid,
    pub set_id: Uuid,
    pub patient_id: Uuid,
    pub image_timestamp: DateTime<Utc>,
    pub uri: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = assessments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AssessmentRow {
    pub id: Uuid,
    pub image_id: Uuid,
    pub set_id: Uuid,
    pub patient_id: Uuid,
    pub assessment_timestamp: DateTime<Utc>,
    pub assessment: bool,
}

impl From<PatientRow> for Patient {
    fn from(row: PatientRow) -> Self {
        Self {
            id: RecordId::from_uuid(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
        }
    }
}

impl From<&Patient> for PatientRow {
    fn from(patient: &Patient) -> Self {
        Self {
            id: *patient.id.as_uuid(),
            first_name: patient.first_name.clone(),
            last_name: patient.last_name.clone(),
        }
    }
}

impl From<ImageSetRow> for ImageSet {
    fn from(row: ImageSetRow) -> Self {
        Self {
            id: RecordId::from_uuid(row.id),
            patient_id: RecordId::from_uuid(row.patient_id),
        }
    }
}

impl From<&ImageSet> for ImageSetRow {
    fn from(set: &ImageSet) -> Self {
        Self {
            id: *set.id.as_uuid(),
            patient_id: *set.patient_id.as_uuid(),
        }
    }
}

impl From<ImageRow> for Image {
    fn from(row: ImageRow) -> Self {
        Self {
            id: RecordId::from_uuid(row.id),
            set_id: RecordId::from_uuid(row.set_id),
            patient_id: RecordId::from_uuid(row.patient_id),
            image_timestamp: row.image_timestamp,
            uri: row.uri,
        }
    }
}

impl From<&Image> for ImageRow {
    fn from(image: &Image) -> Self {
        Self {
            id: *image.id.as_uuid(),
            set_id: *image.set_id.as_uuid(),
            patient_id: *image.patient_id.as_uuid(),
            image_timestamp: image.image_timestamp,
            uri: image.uri.clone(),
        }
    }
}

impl From<AssessmentRow> for Assessment {
    fn from(row: AssessmentRow) -> Self {
        Self {
            id: RecordId::from_uuid(row.id),
            image_id: RecordId::from_uuid(row.image_id),
            set_id: RecordId::from_uuid(row.set_id),
            patient_id: RecordId::from_uuid(row.patient_id),
            assessment_timestamp: row.assessment_timestamp,
            assessment: row.assessment,
        }
    }
}

impl From<&Assessment> for AssessmentRow {
    fn from(assessment: &Assessment) -> Self {
        Self {
            id: *assessment.id.as_uuid(),
            image_id: *assessment.image_id.as_uuid(),
            set_id: *assessment.set_id.as_uuid(),
            patient_id: *assessment.patient_id.as_uuid(),
            assessment_timestamp: assessment.assessment_timestamp,
            assessment: assessment.assessment,
        }
    }
}
