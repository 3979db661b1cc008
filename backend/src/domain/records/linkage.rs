//! Foreign-key linkage rules for drafts.
//!
//! A draft names its parents by id. Every named parent must exist, and the
//! ancestor ids an image or assessment repeats must match what its parents
//! record.

use super::{EntityKind, Image, ImageSet, NewRecord, Patient, Record, RecordId};

/// A parent record a draft refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentRef {
    /// Kind of the parent.
    pub kind: EntityKind,
    /// Identifier of the parent.
    pub id: RecordId,
}

impl ParentRef {
    const fn new(kind: EntityKind, id: RecordId) -> Self {
        Self { kind, id }
    }
}

/// Ways a draft can disagree with its parents.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkageError {
    /// A referenced parent does not exist.
    #[error("{field} {id} does not reference an existing {kind} record")]
    MissingParent {
        /// Draft field holding the reference.
        field: &'static str,
        /// Kind the reference points at.
        kind: EntityKind,
        /// The dangling identifier.
        id: RecordId,
    },
    /// A repeated ancestor id differs from the parent's own value.
    #[error("{field} {actual} does not match {expected} recorded on the referenced parent")]
    Mismatch {
        /// Draft field holding the repeated id.
        field: &'static str,
        /// Value recorded on the parent.
        expected: RecordId,
        /// Value carried by the draft.
        actual: RecordId,
    },
}

impl LinkageError {
    /// Draft field the error is about.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::MissingParent { field, .. } | Self::Mismatch { field, .. } => field,
        }
    }
}

impl NewRecord {
    /// Parents the draft refers to, nearest first.
    #[must_use]
    pub fn parent_refs(&self) -> Vec<ParentRef> {
        match self {
            Self::Patient(_) => Vec::new(),
            Self::ImageSet(set) => vec![ParentRef::new(EntityKind::Patient, set.patient_id)],
            Self::Image(image) => vec![
                ParentRef::new(EntityKind::ImageSet, image.set_id),
                ParentRef::new(EntityKind::Patient, image.patient_id),
            ],
            Self::Assessment(assessment) => vec![
                ParentRef::new(EntityKind::Image, assessment.image_id),
                ParentRef::new(EntityKind::ImageSet, assessment.set_id),
                ParentRef::new(EntityKind::Patient, assessment.patient_id),
            ],
        }
    }
}

/// Checks a draft against the parent records loaded for it.
///
/// `parents` may hold unrelated records; only those named by
/// [`NewRecord::parent_refs`] are consulted.
///
/// # Errors
///
/// Returns [`LinkageError::MissingParent`] for the first reference with no
/// matching record and [`LinkageError::Mismatch`] for the first repeated
/// ancestor id that disagrees.
pub fn verify_linkage(draft: &NewRecord, parents: &[Record]) -> Result<(), LinkageError> {
    let lookup = ParentLookup { parents };
    match draft {
        NewRecord::Patient(_) => Ok(()),
        NewRecord::ImageSet(set) => lookup.patient("patient_id", set.patient_id).map(|_| ()),
        NewRecord::Image(image) => {
            let set = lookup.image_set("set_id", image.set_id)?;
            lookup.patient("patient_id", image.patient_id)?;
            agree("patient_id", set.patient_id, image.patient_id)
        }
        NewRecord::Assessment(assessment) => {
            let image = lookup.image("image_id", assessment.image_id)?;
            let set = lookup.image_set("set_id", assessment.set_id)?;
            lookup.patient("patient_id", assessment.patient_id)?;
            agree("set_id", image.set_id, assessment.set_id)?;
            agree("patient_id", image.patient_id, assessment.patient_id)?;
            agree("patient_id", set.patient_id, assessment.patient_id)
        }
    }
}

fn agree(field: &'static str, expected: RecordId, actual: RecordId) -> Result<(), LinkageError> {
    if expected == actual {
        Ok(())
    } else {
        Err(LinkageError::Mismatch {
            field,
            expected,
            actual,
        })
    }
}

struct ParentLookup<'a> {
    parents: &'a [Record],
}

impl<'a> ParentLookup<'a> {
    fn patient(&self, field: &'static str, id: RecordId) -> Result<&'a Patient, LinkageError> {
        self.parents
            .iter()
            .find_map(|record| match record {
                Record::Patient(patient) if patient.id == id => Some(patient),
                _ => None,
            })
            .ok_or(LinkageError::MissingParent {
                field,
                kind: EntityKind::Patient,
                id,
            })
    }

    fn image_set(&self, field: &'static str, id: RecordId) -> Result<&'a ImageSet, LinkageError> {
        self.parents
            .iter()
            .find_map(|record| match record {
                Record::ImageSet(set) if set.id == id => Some(set),
                _ => None,
            })
            .ok_or(LinkageError::MissingParent {
                field,
                kind: EntityKind::ImageSet,
                id,
            })
    }

    fn image(&self, field: &'static str, id: RecordId) -> Result<&'a Image, LinkageError> {
        self.parents
            .iter()
            .find_map(|record| match record {
                Record::Image(image) if image.id == id => Some(image),
                _ => None,
            })
            .ok_or(LinkageError::MissingParent {
                field,
                kind: EntityKind::Image,
                id,
            })
    }
}
