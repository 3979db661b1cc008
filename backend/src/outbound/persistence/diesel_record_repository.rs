//! PostgreSQL-backed record repository.
//!
//! Implements the `RecordRepository` port over the four imaging tables.
//! Creation runs id allocation, the linkage check, the insert and the
//! read-back inside one transaction; seeding writes a whole batch parents
//! first inside another.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{RecordRepository, RecordRepositoryError, SeedBatch, SeedSummary};
use crate::domain::records::{
    EntityKind, IdSource, LinkageError, MAX_ID_ATTEMPTS, NewRecord, RandomIdSource, Record,
    RecordColumn, RecordId, verify_linkage,
};

use super::models::{AssessmentRow, ImageRow, ImageSetRow, PatientRow};
use super::pool::{DbPool, PoolError};
use super::schema::{assessments, image_sets, images, patients};

/// Diesel-backed implementation of [`RecordRepository`].
#[derive(Clone)]
pub struct DieselRecordRepository {
    pool: DbPool,
    ids: Arc<dyn IdSource>,
}

impl DieselRecordRepository {
    /// Creates a repository drawing random v4 ids.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use imaging_records::outbound::persistence::{DbPool, DieselRecordRepository, PoolConfig};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = DbPool::new(PoolConfig::new("postgres://localhost/imaging")).await?;
    /// let repository = DieselRecordRepository::new(pool);
    /// # let _ = repository;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(pool: DbPool) -> Self {
        Self::with_id_source(pool, Arc::new(RandomIdSource))
    }

    /// Creates a repository drawing ids from `ids`.
    pub fn with_id_source(pool: DbPool, ids: Arc<dyn IdSource>) -> Self {
        Self { pool, ids }
    }
}

/// Failures inside the create transaction.
#[derive(Debug)]
enum CreateError {
    Diesel(diesel::result::Error),
    Linkage(LinkageError),
    IdsExhausted { table: &'static str },
    Vanished { table: &'static str, id: RecordId },
}

impl From<diesel::result::Error> for CreateError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

impl From<CreateError> for RecordRepositoryError {
    fn from(error: CreateError) -> Self {
        match error {
            CreateError::Diesel(err) => map_diesel_error(err),
            CreateError::Linkage(err) => Self::linkage(err.to_string()),
            CreateError::IdsExhausted { table } => Self::query(format!(
                "no free id for {table} after {MAX_ID_ATTEMPTS} attempts"
            )),
            CreateError::Vanished { table, id } => {
                Self::query(format!("inserted {table} row {id} could not be read back"))
            }
        }
    }
}

/// Map pool errors to domain persistence errors.
fn map_pool_error(error: PoolError) -> RecordRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            RecordRepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to domain persistence errors.
fn map_diesel_error(error: diesel::result::Error) -> RecordRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    let error_message = error.to_string();
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                error = %error_message,
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            error = %error_message,
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => RecordRepositoryError::query("record not found"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            RecordRepositoryError::connection(info.message().to_owned())
        }
        DieselError::DatabaseError(_, info) => {
            RecordRepositoryError::query(info.message().to_owned())
        }
        _ => RecordRepositoryError::query(error_message),
    }
}

fn unknown_column(kind: EntityKind, column: RecordColumn) -> RecordRepositoryError {
    RecordRepositoryError::query(format!("table {kind} has no column {}", column.name()))
}

async fn load_all(
    conn: &mut AsyncPgConnection,
    kind: EntityKind,
) -> Result<Vec<Record>, diesel::result::Error> {
    let records = match kind {
        EntityKind::Patient => patients::table
            .select(PatientRow::as_select())
            .order(patients::id)
            .load::<PatientRow>(conn)
            .await?
            .into_iter()
            .map(|row| Record::Patient(row.into()))
            .collect(),
        EntityKind::ImageSet => image_sets::table
            .select(ImageSetRow::as_select())
            .order(image_sets::id)
            .load::<ImageSetRow>(conn)
            .await?
            .into_iter()
            .map(|row| Record::ImageSet(row.into()))
            .collect(),
        EntityKind::Image => images::table
            .select(ImageRow::as_select())
            .order(images::id)
            .load::<ImageRow>(conn)
            .await?
            .into_iter()
            .map(|row| Record::Image(row.into()))
            .collect(),
        EntityKind::Assessment => assessments::table
            .select(AssessmentRow::as_select())
            .order(assessments::id)
            .load::<AssessmentRow>(conn)
            .await?
            .into_iter()
            .map(|row| Record::Assessment(row.into()))
            .collect(),
    };
    Ok(records)
}

/// Loads at most two rows keyed by `id` so callers can detect duplicates.
async fn load_by_id(
    conn: &mut AsyncPgConnection,
    kind: EntityKind,
    id: RecordId,
) -> Result<Vec<Record>, diesel::result::Error> {
    let uuid = *id.as_uuid();
    let records = match kind {
        EntityKind::Patient => patients::table
            .filter(patients::id.eq(uuid))
            .select(PatientRow::as_select())
            .limit(2)
            .load::<PatientRow>(conn)
            .await?
            .into_iter()
            .map(|row| Record::Patient(row.into()))
            .collect(),
        EntityKind::ImageSet => image_sets::table
            .filter(image_sets::id.eq(uuid))
            .select(ImageSetRow::as_select())
            .limit(2)
            .load::<ImageSetRow>(conn)
            .await?
            .into_iter()
            .map(|row| Record::ImageSet(row.into()))
            .collect(),
        EntityKind::Image => images::table
            .filter(images::id.eq(uuid))
            .select(ImageRow::as_select())
            .limit(2)
            .load::<ImageRow>(conn)
            .await?
            .into_iter()
            .map(|row| Record::Image(row.into()))
            .collect(),
        EntityKind::Assessment => assessments::table
            .filter(assessments::id.eq(uuid))
            .select(AssessmentRow::as_select())
            .limit(2)
            .load::<AssessmentRow>(conn)
            .await?
            .into_iter()
            .map(|row| Record::Assessment(row.into()))
            .collect(),
    };
    Ok(records)
}

async fn id_taken(
    conn: &mut AsyncPgConnection,
    kind: EntityKind,
    id: RecordId,
) -> Result<bool, diesel::result::Error> {
    use diesel::dsl::exists;

    let uuid = *id.as_uuid();
    match kind {
        EntityKind::Patient => {
            diesel::select(exists(patients::table.filter(patients::id.eq(uuid))))
                .get_result(conn)
                .await
        }
        EntityKind::ImageSet => {
            diesel::select(exists(image_sets::table.filter(image_sets::id.eq(uuid))))
                .get_result(conn)
                .await
        }
        EntityKind::Image => {
            diesel::select(exists(images::table.filter(images::id.eq(uuid))))
                .get_result(conn)
                .await
        }
        EntityKind::Assessment => {
            diesel::select(exists(assessments::table.filter(assessments::id.eq(uuid))))
                .get_result(conn)
                .await
        }
    }
}

async fn allocate_id(
    conn: &mut AsyncPgConnection,
    kind: EntityKind,
    ids: &dyn IdSource,
) -> Result<RecordId, CreateError> {
    for attempt in 1..=MAX_ID_ATTEMPTS {
        let candidate = ids.next_id();
        if !id_taken(conn, kind, candidate).await? {
            return Ok(candidate);
        }
        debug!(table = %kind, id = %candidate, attempt, "generated id already taken");
    }
    Err(CreateError::IdsExhausted {
        table: kind.table_name(),
    })
}

async fn insert_record(
    conn: &mut AsyncPgConnection,
    record: &Record,
) -> Result<usize, diesel::result::Error> {
    match record {
        Record::Patient(patient) => {
            diesel::insert_into(patients::table)
                .values(PatientRow::from(patient))
                .execute(conn)
                .await
        }
        Record::ImageSet(set) => {
            diesel::insert_into(image_sets::table)
                .values(ImageSetRow::from(set))
                .execute(conn)
                .await
        }
        Record::Image(image) => {
            diesel::insert_into(images::table)
                .values(ImageRow::from(image))
                .execute(conn)
                .await
        }
        Record::Assessment(assessment) => {
            diesel::insert_into(assessments::table)
                .values(AssessmentRow::from(assessment))
                .execute(conn)
                .await
        }
    }
}

async fn create_in_transaction(
    conn: &mut AsyncPgConnection,
    ids: &dyn IdSource,
    draft: NewRecord,
) -> Result<Record, CreateError> {
    let kind = draft.kind();
    let mut parents = Vec::new();
    for parent in draft.parent_refs() {
        parents.extend(load_by_id(conn, parent.kind, parent.id).await?);
    }
    verify_linkage(&draft, &parents).map_err(CreateError::Linkage)?;

    let id = allocate_id(conn, kind, ids).await?;
    let record = draft.with_id(id);
    insert_record(conn, &record).await?;

    load_by_id(conn, kind, id)
        .await?
        .into_iter()
        .next()
        .ok_or(CreateError::Vanished {
            table: kind.table_name(),
            id,
        })
}

async fn seed_in_transaction(
    conn: &mut AsyncPgConnection,
    batch: &SeedBatch,
) -> Result<usize, diesel::result::Error> {
    let mut inserted = 0;

    if !batch.patients.is_empty() {
        let rows: Vec<PatientRow> = batch.patients.iter().map(PatientRow::from).collect();
        inserted += diesel::insert_into(patients::table)
            .values(&rows)
            .on_conflict_do_nothing()
            .execute(conn)
            .await?;
    }

    if !batch.image_sets.is_empty() {
        let rows: Vec<ImageSetRow> = batch.image_sets.iter().map(ImageSetRow::from).collect();
        inserted += diesel::insert_into(image_sets::table)
            .values(&rows)
            .on_conflict_do_nothing()
            .execute(conn)
            .await?;
    }

    if !batch.images.is_empty() {
        let rows: Vec<ImageRow> = batch.images.iter().map(ImageRow::from).collect();
        inserted += diesel::insert_into(images::table)
            .values(&rows)
            .on_conflict_do_nothing()
            .execute(conn)
            .await?;
    }

    if !batch.assessments.is_empty() {
        let rows: Vec<AssessmentRow> =
            batch.assessments.iter().map(AssessmentRow::from).collect();
        inserted += diesel::insert_into(assessments::table)
            .values(&rows)
            .on_conflict_do_nothing()
            .execute(conn)
            .await?;
    }

    Ok(inserted)
}

#[async_trait]
impl RecordRepository for DieselRecordRepository {
    async fn list(&self, kind: EntityKind) -> Result<Vec<Record>, RecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_all(&mut conn, kind).await.map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        kind: EntityKind,
        id: RecordId,
    ) -> Result<Option<Record>, RecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut rows = load_by_id(&mut conn, kind, id)
            .await
            .map_err(map_diesel_error)?;

        if rows.len() > 1 {
            return Err(RecordRepositoryError::duplicate_id(
                kind.table_name(),
                id.to_string(),
            ));
        }
        Ok(rows.pop())
    }

    async fn find_top(
        &self,
        kind: EntityKind,
        order_by: RecordColumn,
    ) -> Result<Option<Record>, RecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let found = match kind {
            EntityKind::Patient => {
                let query = patients::table
                    .select(PatientRow::as_select())
                    .into_boxed();
                let query = match order_by {
                    RecordColumn::Id => query.order(patients::id.desc()),
                    RecordColumn::FirstName => query.order(patients::first_name.desc()),
                    RecordColumn::LastName => query.order(patients::last_name.desc()),
                    other => return Err(unknown_column(kind, other)),
                };
                query
                    .then_order_by(patients::id.desc())
                    .first::<PatientRow>(&mut conn)
                    .await
                    .optional()
                    .map(|row| row.map(|r| Record::Patient(r.into())))
            }
            EntityKind::ImageSet => {
                let query = image_sets::table
                    .select(ImageSetRow::as_select())
                    .into_boxed();
                let query = match order_by {
                    RecordColumn::Id => query.order(image_sets::id.desc()),
                    RecordColumn::PatientId => query.order(image_sets::patient_id.desc()),
                    other => return Err(unknown_column(kind, other)),
                };
                query
                    .then_order_by(image_sets::id.desc())
                    .first::<ImageSetRow>(&mut conn)
                    .await
                    .optional()
                    .map(|row| row.map(|r| Record::ImageSet(r.into())))
            }
            EntityKind::Image => {
                let query = images::table.select(ImageRow::as_select()).into_boxed();
                let query = match order_by {
                    RecordColumn::Id => query.order(images::id.desc()),
                    RecordColumn::SetId => query.order(images::set_id.desc()),
                    RecordColumn::PatientId => query.order(images::patient_id.desc()),
                    RecordColumn::ImageTimestamp => query.order(images::image_timestamp.desc()),
                    RecordColumn::Uri => query.order(images::uri.desc()),
                    other => return Err(unknown_column(kind, other)),
                };
                query
                    .then_order_by(images::id.desc())
                    .first::<ImageRow>(&mut conn)
                    .await
                    .optional()
                    .map(|row| row.map(|r| Record::Image(r.into())))
            }
            EntityKind::Assessment => {
                let query = assessments::table
                    .select(AssessmentRow::as_select())
                    .into_boxed();
                let query = match order_by {
                    RecordColumn::Id => query.order(assessments::id.desc()),
                    RecordColumn::ImageId => query.order(assessments::image_id.desc()),
                    RecordColumn::SetId => query.order(assessments::set_id.desc()),
                    RecordColumn::PatientId => query.order(assessments::patient_id.desc()),
                    RecordColumn::AssessmentTimestamp => {
                        query.order(assessments::assessment_timestamp.desc())
                    }
                    RecordColumn::Assessment => query.order(assessments::assessment.desc()),
                    other => return Err(unknown_column(kind, other)),
                };
                query
                    .then_order_by(assessments::id.desc())
                    .first::<AssessmentRow>(&mut conn)
                    .await
                    .optional()
                    .map(|row| row.map(|r| Record::Assessment(r.into())))
            }
        };

        found.map_err(map_diesel_error)
    }

    async fn create(&self, draft: NewRecord) -> Result<Record, RecordRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ids = Arc::clone(&self.ids);

        let record = conn
            .transaction(|conn| {
                async move { create_in_transaction(conn, ids.as_ref(), draft).await }.scope_boxed()
            })
            .await?;

        Ok(record)
    }

    async fn seed(&self, batch: SeedBatch) -> Result<SeedSummary, RecordRepositoryError> {
        let total = batch.len();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let inserted = conn
            .transaction(|conn| async move { seed_in_transaction(conn, &batch).await }.scope_boxed())
            .await
            .map_err(map_diesel_error)?;

        Ok(SeedSummary {
            inserted,
            skipped: total.saturating_sub(inserted),
        })
    }
}
