//! Data access service over the record repository port.
//!
//! Callers address tables by logical name. Unknown names, missing rows and
//! store failures all read as "absent"; failures are logged here so callers
//! only decide between a record and a 404. Two conditions are surfaced
//! explicitly: duplicate ids on a by-id lookup, and linkage failures found
//! by the pre-flight check.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::domain::ports::{RecordRepository, RecordRepositoryError, SeedBatch, SeedSummary};
use crate::domain::records::{
    AssessmentView, EntityKind, ImageSetView, ImageView, LinkageError, NewRecord, Patient,
    PatientView, Record, RecordColumn, RecordId, RecordView, verify_linkage,
};

/// More than one row answers a by-id lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("table {kind} holds duplicate rows for id {id}")]
pub struct DuplicateRecordError {
    /// Table holding the duplicates.
    pub kind: EntityKind,
    /// The duplicated identifier.
    pub id: RecordId,
}

/// Failure of the pre-flight linkage check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkCheckError {
    /// The draft's references are dangling or inconsistent.
    #[error(transparent)]
    Linkage(#[from] LinkageError),
    /// Parents could not be loaded.
    #[error(transparent)]
    Store(#[from] RecordRepositoryError),
}

#[derive(Debug, thiserror::Error)]
enum ExpandError {
    #[error("parent {kind} record {id} is missing")]
    MissingParent { kind: EntityKind, id: RecordId },
    #[error(transparent)]
    Store(#[from] RecordRepositoryError),
}

/// Generic record access by logical table name.
///
/// # Examples
/// ```
/// use imaging_records::domain::RecordStore;
/// use imaging_records::domain::records::EntityKind;
///
/// assert_eq!(
///     RecordStore::resolve_entity_type("assessments"),
///     Some(EntityKind::Assessment)
/// );
/// assert_eq!(RecordStore::resolve_entity_type("users"), None);
/// ```
#[derive(Clone)]
pub struct RecordStore {
    repository: Arc<dyn RecordRepository>,
}

impl RecordStore {
    /// Creates a store over `repository`.
    pub fn new(repository: Arc<dyn RecordRepository>) -> Self {
        Self { repository }
    }

    /// Resolves a logical table name to its entity kind.
    #[must_use]
    pub fn resolve_entity_type(table_name: &str) -> Option<EntityKind> {
        EntityKind::from_table_name(table_name)
    }

    /// Every record of the named table.
    ///
    /// An empty table yields an empty list; unknown tables and store
    /// failures yield `None`.
    pub async fn fetch_all(&self, table_name: &str) -> Option<Vec<Record>> {
        let kind = Self::resolve_entity_type(table_name)?;
        match self.repository.list(kind).await {
            Ok(records) => Some(records),
            Err(err) => {
                error!(table = table_name, error = %err, "failed to fetch records");
                None
            }
        }
    }

    /// The record of the named table keyed by `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateRecordError`] when the table holds more than one
    /// row for `id`. Every other failure reads as `Ok(None)`.
    pub async fn fetch_by_id(
        &self,
        id: RecordId,
        table_name: &str,
    ) -> Result<Option<Record>, DuplicateRecordError> {
        let Some(kind) = Self::resolve_entity_type(table_name) else {
            return Ok(None);
        };
        match self.repository.find_by_id(kind, id).await {
            Ok(record) => Ok(record),
            Err(RecordRepositoryError::DuplicateId { .. }) => {
                error!(table = table_name, %id, "duplicate record ids found");
                Err(DuplicateRecordError { kind, id })
            }
            Err(err) => {
                error!(table = table_name, %id, error = %err, "failed to fetch record");
                Ok(None)
            }
        }
    }

    /// The record of the named table with the greatest `order_by` value.
    ///
    /// `order_by` defaults to `id`. Columns the table does not own yield
    /// `None`.
    pub async fn fetch_top(&self, table_name: &str, order_by: Option<&str>) -> Option<Record> {
        let kind = Self::resolve_entity_type(table_name)?;
        let column = match order_by {
            None => RecordColumn::DEFAULT_ORDER,
            Some(name) => {
                let Some(column) = kind.resolve_column(name) else {
                    warn!(table = table_name, column = name, "unknown order column");
                    return None;
                };
                column
            }
        };
        match self.repository.find_top(kind, column).await {
            Ok(record) => record,
            Err(err) => {
                error!(
                    table = table_name,
                    column = column.name(),
                    error = %err,
                    "failed to fetch top record"
                );
                None
            }
        }
    }

    /// Persists `draft` under a fresh id and returns the stored record.
    ///
    /// Any failure, including a linkage or uniqueness violation caught by
    /// the store, is logged and yields `None`.
    pub async fn create(&self, draft: NewRecord) -> Option<Record> {
        let kind = draft.kind();
        match self.repository.create(draft).await {
            Ok(record) => {
                info!(table = kind.table_name(), id = %record.id(), "record created");
                Some(record)
            }
            Err(err) => {
                error!(table = kind.table_name(), error = %err, "failed to create record");
                None
            }
        }
    }

    /// Decodes a generic field map for the named table and creates it.
    pub async fn create_from_map(
        &self,
        data: Map<String, Value>,
        table_name: &str,
    ) -> Option<Record> {
        let kind = Self::resolve_entity_type(table_name)?;
        match NewRecord::from_map(kind, data) {
            Ok(draft) => self.create(draft).await,
            Err(err) => {
                warn!(table = table_name, error = %err, "rejected record payload");
                None
            }
        }
    }

    /// Confirms the draft's parents exist and agree with each other.
    ///
    /// # Errors
    ///
    /// Returns [`LinkCheckError::Linkage`] for dangling or inconsistent
    /// references and [`LinkCheckError::Store`] if parents cannot be read.
    pub async fn check_links(&self, draft: &NewRecord) -> Result<(), LinkCheckError> {
        let mut parents = Vec::new();
        for parent in draft.parent_refs() {
            if let Some(record) = self.repository.find_by_id(parent.kind, parent.id).await? {
                parents.push(record);
            }
        }
        verify_linkage(draft, &parents)?;
        Ok(())
    }

    /// Embeds the parent chain of `record`.
    ///
    /// Yields `None`, after logging, when a parent is missing or cannot be
    /// read.
    pub async fn expand(&self, record: Record) -> Option<RecordView> {
        let kind = record.kind();
        let id = record.id();
        match self.expand_record(record).await {
            Ok(view) => Some(view),
            Err(err) => {
                error!(table = kind.table_name(), %id, error = %err, "failed to expand record");
                None
            }
        }
    }

    /// Writes pre-identified rows, parents first, in one transaction.
    ///
    /// # Errors
    ///
    /// Propagates the repository error; nothing is written on failure.
    pub async fn seed(&self, batch: SeedBatch) -> Result<SeedSummary, RecordRepositoryError> {
        let rows = batch.len();
        let summary = self.repository.seed(batch).await?;
        info!(
            rows,
            inserted = summary.inserted,
            skipped = summary.skipped,
            "sample rows written"
        );
        Ok(summary)
    }

    async fn expand_record(&self, record: Record) -> Result<RecordView, ExpandError> {
        Ok(match record {
            Record::Patient(patient) => RecordView::Patient(PatientView { patient }),
            Record::ImageSet(image_set) => {
                let patient = self.load_patient(image_set.patient_id).await?;
                RecordView::ImageSet(ImageSetView { image_set, patient })
            }
            Record::Image(image) => {
                let image_set = self.load_image_set_view(image.set_id).await?;
                RecordView::Image(ImageView { image, image_set })
            }
            Record::Assessment(assessment) => {
                let image = self.load_image_view(assessment.image_id).await?;
                RecordView::Assessment(AssessmentView { assessment, image })
            }
        })
    }

    async fn load(&self, kind: EntityKind, id: RecordId) -> Result<Record, ExpandError> {
        self.repository
            .find_by_id(kind, id)
            .await?
            .ok_or(ExpandError::MissingParent { kind, id })
    }

    async fn load_patient(&self, id: RecordId) -> Result<Patient, ExpandError> {
        match self.load(EntityKind::Patient, id).await? {
            Record::Patient(patient) => Ok(patient),
            _ => Err(ExpandError::MissingParent {
                kind: EntityKind::Patient,
                id,
            }),
        }
    }

    async fn load_image_set_view(&self, id: RecordId) -> Result<ImageSetView, ExpandError> {
        let Record::ImageSet(image_set) = self.load(EntityKind::ImageSet, id).await? else {
            return Err(ExpandError::MissingParent {
                kind: EntityKind::ImageSet,
                id,
            });
        };
        let patient = self.load_patient(image_set.patient_id).await?;
        Ok(ImageSetView { image_set, patient })
    }

    async fn load_image_view(&self, id: RecordId) -> Result<ImageView, ExpandError> {
        let Record::Image(image) = self.load(EntityKind::Image, id).await? else {
            return Err(ExpandError::MissingParent {
                kind: EntityKind::Image,
                id,
            });
        };
        let image_set = self.load_image_set_view(image.set_id).await?;
        Ok(ImageView { image, image_set })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use rstest::rstest;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::domain::ports::MockRecordRepository;
    use crate::domain::records::{Assessment, Image, ImageSet, NewImage, NewPatient};

    fn id(n: u128) -> RecordId {
        RecordId::from_uuid(Uuid::from_u128(n))
    }

    fn patient(n: u128) -> Record {
        Record::Patient(Patient {
            id: id(n),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
        })
    }

    fn image_set(n: u128, patient_id: u128) -> Record {
        Record::ImageSet(ImageSet {
            id: id(n),
            patient_id: id(patient_id),
        })
    }

    fn image(n: u128, set_id: u128, patient_id: u128) -> Record {
        Record::Image(Image {
            id: id(n),
            set_id: id(set_id),
            patient_id: id(patient_id),
            image_timestamp: DateTime::<Utc>::default(),
            uri: format!("captures/{n}.png"),
        })
    }

    /// Repository answering `find_by_id` from a fixed set of records.
    fn repository_with(records: Vec<Record>) -> MockRecordRepository {
        let mut repo = MockRecordRepository::new();
        repo.expect_find_by_id().returning(move |kind, wanted| {
            Ok(records
                .iter()
                .find(|record| record.kind() == kind && record.id() == wanted)
                .cloned())
        });
        repo
    }

    fn store(repo: MockRecordRepository) -> RecordStore {
        RecordStore::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn unknown_tables_never_reach_the_repository() {
        let store = store(MockRecordRepository::new());

        assert!(store.fetch_all("users").await.is_none());
        assert_eq!(store.fetch_by_id(id(1), "users").await, Ok(None));
        assert!(store.fetch_top("users", None).await.is_none());
        assert!(
            store
                .create_from_map(Map::new(), "users")
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn fetch_all_returns_rows_and_hides_failures() {
        let mut repo = MockRecordRepository::new();
        repo.expect_list()
            .withf(|kind| *kind == EntityKind::Patient)
            .times(1)
            .return_once(|_| Ok(vec![patient(1)]));
        repo.expect_list()
            .withf(|kind| *kind == EntityKind::Image)
            .times(1)
            .return_once(|_| Err(RecordRepositoryError::connection("refused")));
        let store = store(repo);

        assert_eq!(store.fetch_all("patients").await, Some(vec![patient(1)]));
        assert_eq!(store.fetch_all("images").await, None);
    }

    #[tokio::test]
    async fn fetch_by_id_surfaces_duplicates() {
        let mut repo = MockRecordRepository::new();
        repo.expect_find_by_id()
            .times(1)
            .return_once(|_, _| Err(RecordRepositoryError::duplicate_id("images", "7")));
        let store = store(repo);

        let err = store
            .fetch_by_id(id(7), "images")
            .await
            .expect_err("duplicate");
        assert_eq!(
            err,
            DuplicateRecordError {
                kind: EntityKind::Image,
                id: id(7),
            }
        );
    }

    #[tokio::test]
    async fn fetch_by_id_reads_store_failures_as_absent() {
        let mut repo = MockRecordRepository::new();
        repo.expect_find_by_id()
            .times(1)
            .return_once(|_, _| Err(RecordRepositoryError::query("timeout")));
        let store = store(repo);

        assert_eq!(store.fetch_by_id(id(7), "images").await, Ok(None));
    }

    #[rstest]
    #[case(None, RecordColumn::Id)]
    #[case(Some("image_timestamp"), RecordColumn::ImageTimestamp)]
    #[tokio::test]
    async fn fetch_top_resolves_order_column(
        #[case] order_by: Option<&'static str>,
        #[case] expected: RecordColumn,
    ) {
        let mut repo = MockRecordRepository::new();
        repo.expect_find_top()
            .withf(move |kind, column| *kind == EntityKind::Image && *column == expected)
            .times(1)
            .return_once(|_, _| Ok(Some(image(3, 2, 1))));
        let store = store(repo);

        assert_eq!(
            store.fetch_top("images", order_by).await,
            Some(image(3, 2, 1))
        );
    }

    #[tokio::test]
    async fn fetch_top_rejects_foreign_columns() {
        let store = store(MockRecordRepository::new());
        assert!(store.fetch_top("patients", Some("uri")).await.is_none());
    }

    #[tokio::test]
    async fn create_returns_stored_record() {
        let mut repo = MockRecordRepository::new();
        repo.expect_create()
            .withf(|draft| draft.kind() == EntityKind::Patient)
            .times(1)
            .return_once(|draft| Ok(draft.with_id(id(1))));
        let store = store(repo);

        let created = store
            .create(NewRecord::Patient(NewPatient {
                first_name: "Ada".to_owned(),
                last_name: "Lovelace".to_owned(),
            }))
            .await;
        assert_eq!(created, Some(patient(1)));
    }

    #[tokio::test]
    async fn create_reads_failures_as_absent() {
        let mut repo = MockRecordRepository::new();
        repo.expect_create()
            .times(1)
            .return_once(|_| Err(RecordRepositoryError::query("duplicate key value")));
        let store = store(repo);

        let created = store
            .create(NewRecord::Image(NewImage {
                set_id: id(2),
                patient_id: id(1),
                image_timestamp: DateTime::<Utc>::default(),
                uri: "captures/dup.png".to_owned(),
            }))
            .await;
        assert!(created.is_none());
    }

    #[tokio::test]
    async fn create_from_map_decodes_before_creating() {
        let mut repo = MockRecordRepository::new();
        repo.expect_create()
            .withf(|draft| {
                matches!(draft, NewRecord::ImageSet(set) if set.patient_id == id(1))
            })
            .times(1)
            .return_once(|draft| Ok(draft.with_id(id(2))));
        let store = store(repo);

        let data = json!({ "patient_id": Uuid::from_u128(1) });
        let created = store
            .create_from_map(data.as_object().cloned().expect("object"), "image_sets")
            .await;
        assert_eq!(created, Some(image_set(2, 1)));
    }

    #[tokio::test]
    async fn create_from_map_rejects_invalid_payloads() {
        let store = store(MockRecordRepository::new());
        let data = json!({ "first_name": "Ada" });
        let created = store
            .create_from_map(data.as_object().cloned().expect("object"), "patients")
            .await;
        assert!(created.is_none());
    }

    #[tokio::test]
    async fn check_links_reports_foreign_set() {
        let store = store(repository_with(vec![
            patient(1),
            patient(2),
            image_set(10, 2),
        ]));
        let draft = NewRecord::Image(NewImage {
            set_id: id(10),
            patient_id: id(1),
            image_timestamp: DateTime::<Utc>::default(),
            uri: "captures/x.png".to_owned(),
        });

        let err = store.check_links(&draft).await.expect_err("mismatch");
        assert!(matches!(
            err,
            LinkCheckError::Linkage(LinkageError::Mismatch { .. })
        ));
    }

    #[tokio::test]
    async fn check_links_propagates_store_failures() {
        let mut repo = MockRecordRepository::new();
        repo.expect_find_by_id()
            .return_once(|_, _| Err(RecordRepositoryError::connection("refused")));
        let store = store(repo);

        let draft = NewRecord::ImageSet(crate::domain::records::NewImageSet {
            patient_id: id(1),
        });
        let err = store.check_links(&draft).await.expect_err("store failure");
        assert!(matches!(err, LinkCheckError::Store(_)));
    }

    #[tokio::test]
    async fn expand_builds_assessment_chain() {
        let store = store(repository_with(vec![
            patient(1),
            image_set(10, 1),
            image(20, 10, 1),
        ]));
        let assessment = Record::Assessment(Assessment {
            id: id(30),
            image_id: id(20),
            set_id: id(10),
            patient_id: id(1),
            assessment_timestamp: DateTime::<Utc>::default(),
            assessment: true,
        });

        let view = store.expand(assessment).await.expect("expanded");
        let value = serde_json::to_value(&view).expect("serialise");
        assert_eq!(
            value.pointer("/image/image_set/patient/id"),
            Some(&json!(Uuid::from_u128(1).to_string()))
        );
        assert_eq!(value.pointer("/image/uri"), Some(&json!("captures/20.png")));
    }

    #[tokio::test]
    async fn expand_fails_when_a_parent_is_missing() {
        let store = store(repository_with(vec![image_set(10, 1)]));
        assert!(store.expand(image(20, 10, 1)).await.is_none());
    }
}
