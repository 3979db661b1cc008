//! Repair and audit of nested parent identifiers.
//!
//! A nested parent must carry the identifiers its child names in its flat
//! foreign-key fields. Repair copies the child's keys down into every
//! nested level; the audit reports any level that still disagrees.

use uuid::Uuid;

use crate::records::{SampleCollection, SampleDataset, SampleImage};

/// A nested identifier that disagrees with the flat key it should mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConflict {
    /// Collection holding the offending entry.
    pub collection: SampleCollection,
    /// Position of the entry within its collection.
    pub index: usize,
    /// Dotted path of the nested field that disagrees.
    pub field: &'static str,
}

/// Rewrites nested parent identifiers to match each entry's flat keys.
///
/// Applying the repair twice leaves the dataset unchanged.
pub fn repair_links(dataset: &mut SampleDataset) {
    for set in &mut dataset.image_sets {
        set.patient.id = set.patient_id;
    }

    for image in &mut dataset.images {
        repair_image(image);
    }

    for assessment in &mut dataset.assessments {
        assessment.image.id = assessment.image_id;
        assessment.image.set_id = assessment.set_id;
        assessment.image.patient_id = assessment.patient_id;
        repair_image(&mut assessment.image);
    }
}

fn repair_image(image: &mut SampleImage) {
    image.image_set.id = image.set_id;
    image.image_set.patient_id = image.patient_id;
    image.image_set.patient.id = image.patient_id;
}

/// Lists every nested identifier that disagrees with its flat key.
#[must_use]
pub fn find_link_conflicts(dataset: &SampleDataset) -> Vec<LinkConflict> {
    let mut conflicts = Vec::new();

    for (index, set) in dataset.image_sets.iter().enumerate() {
        let mut check = conflict_sink(&mut conflicts, SampleCollection::ImageSets, index);
        check(set.patient.id, set.patient_id, "patient.id");
    }

    for (index, image) in dataset.images.iter().enumerate() {
        let mut check = conflict_sink(&mut conflicts, SampleCollection::Images, index);
        check(image.image_set.id, image.set_id, "image_set.id");
        check(image.image_set.patient_id, image.patient_id, "image_set.patient_id");
        check(image.image_set.patient.id, image.patient_id, "image_set.patient.id");
    }

    for (index, assessment) in dataset.assessments.iter().enumerate() {
        let image = &assessment.image;
        let mut check = conflict_sink(&mut conflicts, SampleCollection::Assessments, index);
        check(image.id, assessment.image_id, "image.id");
        check(image.set_id, assessment.set_id, "image.set_id");
        check(image.patient_id, assessment.patient_id, "image.patient_id");
        check(image.image_set.id, assessment.set_id, "image.image_set.id");
        check(
            image.image_set.patient_id,
            assessment.patient_id,
            "image.image_set.patient_id",
        );
        check(
            image.image_set.patient.id,
            assessment.patient_id,
            "image.image_set.patient.id",
        );
    }

    conflicts
}

fn conflict_sink(
    conflicts: &mut Vec<LinkConflict>,
    collection: SampleCollection,
    index: usize,
) -> impl FnMut(Uuid, Uuid, &'static str) + '_ {
    move |nested, expected, field| {
        if nested != expected {
            conflicts.push(LinkConflict {
                collection,
                index,
                field,
            });
        }
    }
}
