//! In-process record repository.
//!
//! Backs the service when no database URL is configured and gives handler
//! tests a real store without PostgreSQL. It enforces the same rules as the
//! relational schema: unique ids per table, unique image uris, existing
//! parents and agreeing denormalized keys.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{RecordRepository, RecordRepositoryError, SeedBatch, SeedSummary};
use crate::domain::records::{
    EntityKind, IdSource, MAX_ID_ATTEMPTS, NewRecord, RandomIdSource, Record, RecordColumn,
    RecordId, verify_linkage,
};

/// Vector-backed implementation of [`RecordRepository`].
#[derive(Clone)]
pub struct InMemoryRecordRepository {
    records: Arc<Mutex<Vec<Record>>>,
    ids: Arc<dyn IdSource>,
}

impl Default for InMemoryRecordRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRecordRepository {
    /// Creates an empty repository drawing random ids.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id_source(Arc::new(RandomIdSource))
    }

    /// Creates an empty repository drawing ids from `ids`.
    #[must_use]
    pub fn with_id_source(ids: Arc<dyn IdSource>) -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            ids,
        }
    }

    /// Creates a repository holding `records` as-is.
    ///
    /// No constraint is checked, which lets tests stage states the
    /// relational schema would refuse, such as duplicate ids.
    #[must_use]
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            ids: Arc::new(RandomIdSource),
        }
    }

    /// Number of stored records across every table.
    ///
    /// A poisoned lock reads as empty.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().map_or(0, |records| records.len())
    }

    /// Whether no record is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Record>>, RecordRepositoryError> {
        self.records
            .lock()
            .map_err(|_| RecordRepositoryError::connection("record store lock poisoned"))
    }
}

fn contains(records: &[Record], kind: EntityKind, id: RecordId) -> bool {
    records
        .iter()
        .any(|record| record.kind() == kind && record.id() == id)
}

fn uri_taken(records: &[Record], uri: &str) -> bool {
    records
        .iter()
        .any(|record| matches!(record, Record::Image(image) if image.uri == uri))
}

/// Mirrors the foreign keys of the relational schema.
fn parents_present(records: &[Record], record: &Record) -> bool {
    match record {
        Record::Patient(_) => true,
        Record::ImageSet(set) => contains(records, EntityKind::Patient, set.patient_id),
        Record::Image(image) => {
            contains(records, EntityKind::ImageSet, image.set_id)
                && contains(records, EntityKind::Patient, image.patient_id)
        }
        Record::Assessment(assessment) => {
            contains(records, EntityKind::Image, assessment.image_id)
                && contains(records, EntityKind::ImageSet, assessment.set_id)
                && contains(records, EntityKind::Patient, assessment.patient_id)
        }
    }
}

fn uri_conflict(uri: &str) -> RecordRepositoryError {
    RecordRepositoryError::query(format!("image uri {uri} is already stored"))
}

#[async_trait]
impl RecordRepository for InMemoryRecordRepository {
    async fn list(&self, kind: EntityKind) -> Result<Vec<Record>, RecordRepositoryError> {
        let records = self.lock()?;
        let mut rows: Vec<Record> = records
            .iter()
            .filter(|record| record.kind() == kind)
            .cloned()
            .collect();
        rows.sort_by_key(Record::id);
        Ok(rows)
    }

    async fn find_by_id(
        &self,
        kind: EntityKind,
        id: RecordId,
    ) -> Result<Option<Record>, RecordRepositoryError> {
        let records = self.lock()?;
        let mut matches = records
            .iter()
            .filter(|record| record.kind() == kind && record.id() == id);
        let found = matches.next().cloned();
        if matches.next().is_some() {
            return Err(RecordRepositoryError::duplicate_id(
                kind.table_name(),
                id.to_string(),
            ));
        }
        Ok(found)
    }

    async fn find_top(
        &self,
        kind: EntityKind,
        order_by: RecordColumn,
    ) -> Result<Option<Record>, RecordRepositoryError> {
        if !kind.columns().contains(&order_by) {
            return Err(RecordRepositoryError::query(format!(
                "table {kind} has no column {}",
                order_by.name()
            )));
        }
        let records = self.lock()?;
        Ok(records
            .iter()
            .filter(|record| record.kind() == kind)
            .max_by(|a, b| {
                (a.column_value(order_by), a.id()).cmp(&(b.column_value(order_by), b.id()))
            })
            .cloned())
    }

    async fn create(&self, draft: NewRecord) -> Result<Record, RecordRepositoryError> {
        let mut records = self.lock()?;
        let kind = draft.kind();

        let parents: Vec<Record> = draft
            .parent_refs()
            .into_iter()
            .filter_map(|parent| {
                records
                    .iter()
                    .find(|record| record.kind() == parent.kind && record.id() == parent.id)
                    .cloned()
            })
            .collect();
        verify_linkage(&draft, &parents)
            .map_err(|err| RecordRepositoryError::linkage(err.to_string()))?;

        if let NewRecord::Image(image) = &draft {
            if uri_taken(&records, &image.uri) {
                return Err(uri_conflict(&image.uri));
            }
        }

        let mut allocated = None;
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let candidate = self.ids.next_id();
            if !contains(&records, kind, candidate) {
                allocated = Some(candidate);
                break;
            }
            debug!(table = %kind, id = %candidate, attempt, "generated id already taken");
        }
        let id = allocated.ok_or_else(|| {
            RecordRepositoryError::query(format!(
                "no free id for {kind} after {MAX_ID_ATTEMPTS} attempts"
            ))
        })?;

        let record = draft.with_id(id);
        records.push(record.clone());
        Ok(record)
    }

    async fn seed(&self, batch: SeedBatch) -> Result<SeedSummary, RecordRepositoryError> {
        let total = batch.len();
        let SeedBatch {
            patients,
            image_sets,
            images,
            assessments,
        } = batch;
        let incoming = patients
            .into_iter()
            .map(Record::from)
            .chain(image_sets.into_iter().map(Record::from))
            .chain(images.into_iter().map(Record::from))
            .chain(assessments.into_iter().map(Record::from));

        let mut records = self.lock()?;
        let mut staged = records.clone();
        let mut inserted = 0;
        for record in incoming {
            if contains(&staged, record.kind(), record.id()) {
                continue;
            }
            if let Record::Image(image) = &record {
                if uri_taken(&staged, &image.uri) {
                    continue;
                }
            }
            if !parents_present(&staged, &record) {
                return Err(RecordRepositoryError::query(format!(
                    "{} row {} references a missing parent",
                    record.kind(),
                    record.id()
                )));
            }
            staged.push(record);
            inserted += 1;
        }
        *records = staged;

        Ok(SeedSummary {
            inserted,
            skipped: total.saturating_sub(inserted),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    use super::*;
    use crate::domain::records::{
        Image, ImageSet, NewImage, NewImageSet, NewPatient, Patient,
    };

    /// Yields ids 1, 1, 2, 3, ... so the second draw collides with the first.
    struct StutteringIds(AtomicU64);

    impl IdSource for StutteringIds {
        fn next_id(&self) -> RecordId {
            let n = self.0.fetch_add(1, Ordering::SeqCst);
            RecordId::from_uuid(Uuid::from_u128(u128::from(n.max(1))))
        }
    }

    fn id(n: u128) -> RecordId {
        RecordId::from_uuid(Uuid::from_u128(n))
    }

    fn patient(n: u128) -> Patient {
        Patient {
            id: id(n),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
        }
    }

    fn image(n: u128, uri: &str, hour: u32) -> Image {
        Image {
            id: id(n),
            set_id: id(10),
            patient_id: id(1),
            image_timestamp: Utc
                .with_ymd_and_hms(2024, 1, 1, hour, 0, 0)
                .single()
                .expect("valid timestamp"),
            uri: uri.to_owned(),
        }
    }

    #[fixture]
    fn populated() -> InMemoryRecordRepository {
        InMemoryRecordRepository::with_records(vec![
            patient(1).into(),
            ImageSet {
                id: id(10),
                patient_id: id(1),
            }
            .into(),
            image(20, "a.png", 9).into(),
            image(21, "b.png", 11).into(),
            image(22, "c.png", 10).into(),
        ])
    }

    #[rstest]
    #[tokio::test]
    async fn latest_image_by_timestamp(populated: InMemoryRecordRepository) {
        let top = populated
            .find_top(EntityKind::Image, RecordColumn::ImageTimestamp)
            .await
            .expect("query")
            .expect("present");
        assert_eq!(top.id(), id(21));
    }

    #[rstest]
    #[tokio::test]
    async fn top_rejects_foreign_column(populated: InMemoryRecordRepository) {
        let err = populated
            .find_top(EntityKind::Patient, RecordColumn::Uri)
            .await
            .expect_err("patients have no uri");
        assert!(matches!(err, RecordRepositoryError::Query { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_ids_are_reported() {
        let repo = InMemoryRecordRepository::with_records(vec![
            patient(1).into(),
            patient(1).into(),
        ]);
        let err = repo
            .find_by_id(EntityKind::Patient, id(1))
            .await
            .expect_err("duplicates");
        assert!(matches!(err, RecordRepositoryError::DuplicateId { .. }));
    }

    #[tokio::test]
    async fn create_retries_taken_ids() {
        let repo = InMemoryRecordRepository::with_id_source(Arc::new(StutteringIds(
            AtomicU64::new(0),
        )));
        let draft = || {
            NewRecord::from(NewPatient {
                first_name: "Grace".to_owned(),
                last_name: "Hopper".to_owned(),
            })
        };

        let first = repo.create(draft()).await.expect("first");
        let second = repo.create(draft()).await.expect("second");

        assert_eq!(first.id(), id(1));
        assert_eq!(second.id(), id(2));
    }

    #[rstest]
    #[tokio::test]
    async fn create_rejects_dangling_parent(populated: InMemoryRecordRepository) {
        let err = populated
            .create(
                NewImageSet {
                    patient_id: id(99),
                }
                .into(),
            )
            .await
            .expect_err("no such patient");
        assert!(matches!(err, RecordRepositoryError::Linkage { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn create_rejects_reused_uri(populated: InMemoryRecordRepository) {
        let draft = NewImage {
            set_id: id(10),
            patient_id: id(1),
            image_timestamp: Utc::now(),
            uri: "a.png".to_owned(),
        };
        let err = populated
            .create(draft.into())
            .await
            .expect_err("uri taken");

        assert!(matches!(err, RecordRepositoryError::Query { .. }));
        let images = populated.list(EntityKind::Image).await.expect("list");
        assert_eq!(images.len(), 3);
    }

    #[rstest]
    #[tokio::test]
    async fn seed_skips_existing_rows(populated: InMemoryRecordRepository) {
        let batch = SeedBatch {
            patients: vec![patient(1), patient(2)],
            ..SeedBatch::default()
        };
        let summary = populated.seed(batch).await.expect("seeded");
        assert_eq!(
            summary,
            SeedSummary {
                inserted: 1,
                skipped: 1,
            }
        );
    }

    #[tokio::test]
    async fn seed_with_orphan_writes_nothing() {
        let repo = InMemoryRecordRepository::new();
        let batch = SeedBatch {
            patients: vec![patient(1)],
            image_sets: vec![ImageSet {
                id: id(10),
                patient_id: id(2),
            }],
            ..SeedBatch::default()
        };

        repo.seed(batch).await.expect_err("orphan set");
        assert!(repo.list(EntityKind::Patient).await.expect("list").is_empty());
    }
}
