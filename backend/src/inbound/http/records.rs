//! Generic record routes addressed by logical table name.
//!
//! ```text
//! GET /{table_name}
//! GET /{table_name}/latest?order_by=column
//! GET /{table_name}/{id}
//! ```
//!
//! Unknown tables, unknown columns, malformed ids and missing rows all
//! answer `404`. Duplicate rows for one id answer `500`.

use actix_web::{get, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::domain::records::{EntityKind, Record, RecordId, RecordView};
use crate::domain::{DomainError, RecordStore};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Query parameters of the latest-record route.
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LatestQuery {
    /// Column to order by; defaults to `id`.
    pub order_by: Option<String>,
}

fn resolve_table(table_name: &str) -> ApiResult<EntityKind> {
    RecordStore::resolve_entity_type(table_name)
        .ok_or_else(|| DomainError::not_found(format!("no table named {table_name}")))
}

/// Loads every record of a table.
///
/// An empty result set is reported as not found.
pub(crate) async fn list_table(state: &HttpState, table_name: &str) -> ApiResult<Vec<Record>> {
    resolve_table(table_name)?;
    let records = state
        .store
        .fetch_all(table_name)
        .await
        .ok_or_else(|| DomainError::not_found(format!("could not read {table_name}")))?;
    if records.is_empty() {
        return Err(DomainError::not_found(format!("no {table_name} records found")));
    }
    Ok(records)
}

/// Loads one record by id and embeds its parent chain.
pub(crate) async fn view_by_id(
    state: &HttpState,
    table_name: &str,
    raw_id: &str,
) -> ApiResult<RecordView> {
    let kind = resolve_table(table_name)?;
    let id: RecordId = raw_id
        .parse()
        .map_err(|_| DomainError::not_found(format!("{raw_id} is not a valid record id")))?;
    let record = state
        .store
        .fetch_by_id(id, kind.table_name())
        .await
        .map_err(|_| DomainError::internal("Duplicate uuids found"))?
        .ok_or_else(|| DomainError::not_found(format!("no {kind} record with id {id}")))?;
    expand(state, record).await
}

/// Loads the greatest record by `order_by` and embeds its parent chain.
pub(crate) async fn view_latest(
    state: &HttpState,
    table_name: &str,
    order_by: Option<&str>,
) -> ApiResult<RecordView> {
    let kind = resolve_table(table_name)?;
    if let Some(column) = order_by {
        kind.resolve_column(column).ok_or_else(|| {
            DomainError::not_found(format!("{kind} has no column named {column}"))
        })?;
    }
    let record = state
        .store
        .fetch_top(kind.table_name(), order_by)
        .await
        .ok_or_else(|| DomainError::not_found(format!("no {kind} records found")))?;
    expand(state, record).await
}

async fn expand(state: &HttpState, record: Record) -> ApiResult<RecordView> {
    state
        .store
        .expand(record)
        .await
        .ok_or_else(|| DomainError::internal("Failed to load parent records"))
}

/// List every record of a table.
#[utoipa::path(
    get,
    path = "/{table_name}",
    params(("table_name" = String, Path, description = "Logical table name")),
    responses(
        (status = 200, description = "All records of the table", body = [Record]),
        (status = 404, description = "Unknown table, unreadable store or empty table", body = ErrorSchema)
    ),
    tags = ["records"],
    operation_id = "listRecords"
)]
#[get("/{table_name}")]
pub async fn list_records(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Record>>> {
    let table_name = path.into_inner();
    list_table(&state, &table_name).await.map(web::Json)
}

/// Fetch the record with the greatest value of a column.
#[utoipa::path(
    get,
    path = "/{table_name}/latest",
    params(
        ("table_name" = String, Path, description = "Logical table name"),
        LatestQuery
    ),
    responses(
        (status = 200, description = "Latest record with its parents", body = RecordView),
        (status = 404, description = "Unknown table or column, or empty table", body = ErrorSchema),
        (status = 500, description = "Parent records could not be loaded", body = ErrorSchema)
    ),
    tags = ["records"],
    operation_id = "getLatestRecord"
)]
#[get("/{table_name}/latest")]
pub async fn latest_record(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<LatestQuery>,
) -> ApiResult<web::Json<RecordView>> {
    let table_name = path.into_inner();
    view_latest(&state, &table_name, query.order_by.as_deref())
        .await
        .map(web::Json)
}

/// Fetch one record by id with its parents embedded.
#[utoipa::path(
    get,
    path = "/{table_name}/{id}",
    params(
        ("table_name" = String, Path, description = "Logical table name"),
        ("id" = String, Path, description = "Record UUID")
    ),
    responses(
        (status = 200, description = "The record with its parents", body = RecordView),
        (status = 404, description = "Unknown table, malformed id or missing record", body = ErrorSchema),
        (status = 500, description = "Duplicate ids or unreadable parents", body = ErrorSchema)
    ),
    tags = ["records"],
    operation_id = "getRecord"
)]
#[get("/{table_name}/{id}")]
pub async fn get_record(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<RecordView>> {
    let (table_name, raw_id) = path.into_inner();
    view_by_id(&state, &table_name, &raw_id).await.map(web::Json)
}
