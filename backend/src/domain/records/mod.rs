//! Entity model for imaging records.
//!
//! Four entities form a chain: a [`Patient`] owns [`ImageSet`]s, an image
//! set owns [`Image`]s, and each image may carry [`Assessment`]s. Images
//! and assessments repeat their ancestors' ids so a single row answers
//! "whose is this" without a join; [`verify_linkage`] guards those copies.

mod drafts;
mod entities;
mod id;
mod kind;
mod linkage;
mod views;

pub use drafts::{DraftError, NewAssessment, NewImage, NewImageSet, NewPatient, NewRecord};
pub use entities::{Assessment, ColumnValue, Image, ImageSet, Patient, Record};
pub use id::{IdSource, MAX_ID_ATTEMPTS, RandomIdSource, RecordId};
pub use kind::{EntityKind, RecordColumn};
pub use linkage::{LinkageError, ParentRef, verify_linkage};
pub use views::{AssessmentView, ImageSetView, ImageView, PatientView, RecordView};
