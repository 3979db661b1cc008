//! Port for record persistence adapters.
//!
//! Adapters own transactions: [`RecordRepository::create`] allocates an id,
//! checks linkage, inserts and reads the row back as one unit, and
//! [`RecordRepository::seed`] writes a whole batch or nothing.

use async_trait::async_trait;

use crate::domain::records::{
    Assessment, EntityKind, Image, ImageSet, NewRecord, Patient, Record, RecordColumn, RecordId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by record repository adapters.
    pub enum RecordRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "record repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "record repository query failed: {message}",
        /// A draft's references disagree with the stored parents.
        Linkage { message: String } => "record linkage check failed: {message}",
        /// More than one row shares an id.
        DuplicateId { table: String, id: String } =>
            "table {table} holds more than one row with id {id}",
    }
}

/// Pre-identified rows written by [`RecordRepository::seed`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedBatch {
    /// Patient rows.
    pub patients: Vec<Patient>,
    /// Image set rows.
    pub image_sets: Vec<ImageSet>,
    /// Image rows.
    pub images: Vec<Image>,
    /// Assessment rows.
    pub assessments: Vec<Assessment>,
}

impl SeedBatch {
    /// Total number of rows in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patients.len() + self.image_sets.len() + self.images.len() + self.assessments.len()
    }

    /// Whether the batch holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Row counts reported by [`RecordRepository::seed`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Rows written.
    pub inserted: usize,
    /// Rows left alone because their id or uri already existed.
    pub skipped: usize,
}

/// Persistence operations over the four record tables.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Every row of `kind`'s table.
    async fn list(&self, kind: EntityKind) -> Result<Vec<Record>, RecordRepositoryError>;

    /// The row keyed by `id`, if any.
    ///
    /// Adapters report [`RecordRepositoryError::DuplicateId`] when more than
    /// one row matches.
    async fn find_by_id(
        &self,
        kind: EntityKind,
        id: RecordId,
    ) -> Result<Option<Record>, RecordRepositoryError>;

    /// The row with the greatest `order_by` value, if any.
    async fn find_top(
        &self,
        kind: EntityKind,
        order_by: RecordColumn,
    ) -> Result<Option<Record>, RecordRepositoryError>;

    /// Inserts `draft` under a fresh id and returns the stored row.
    async fn create(&self, draft: NewRecord) -> Result<Record, RecordRepositoryError>;

    /// Writes a batch parents first, skipping rows that already exist.
    async fn seed(&self, batch: SeedBatch) -> Result<SeedSummary, RecordRepositoryError>;
}
