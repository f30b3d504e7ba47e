//! # HTTP Route Handlers
//!
//! ## Pruning Request
//!
//! `POST /partitions` carries a predicate as a list of per-column domains. Domain
//! values are written as partition value text (`"2018-08-30"`, `"42"`,
//! `"12.50"`) and decoded with the column's type, exactly as values read from a
//! partition name would be:
//!
//! ```json
//! {
//!   "schema": "default",
//!   "table": "stock_ticks_cow",
//!   "domains": [
//!     { "column": "dt", "domain": { "kind": "range", "low": "2018-08-30", "lowInclusive": true } },
//!     { "column": "symbol", "domain": { "kind": "values", "values": ["GOOG"] } }
//!   ]
//! }
//! ```
//!
//! Several domains for one column are intersected. `"none": true` requests the
//! "no rows" predicate. Domains on data columns whose type is not primitive
//! (`array<string>` and the like) are dropped, since data columns never prune.
//!
//! ## Error Handling
//!
//! - 404 Not Found: the table is not registered
//! - 400 Bad Request: the predicate references unknown columns, types or undecodable values
//! - 500 Internal Server Error: registered partition names disagree with the table, or
//!   the metastore failed

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::ops::Bound;
use std::sync::Arc;
use tracing::{debug, warn};

use hudi_core::column::{HudiColumnHandle, SchemaTableName, Table};
use hudi_core::domain::{Domain, Range, SortedRangeSet, TupleDomain};
use hudi_core::metastore::{ConnectorSession, Metastore, MetastoreContext};
use hudi_core::types::Type;
use hudi_core::value::ScalarValue;
use hudi_core::HudiError;
use hudi_pruning::decode::decoder_for;
use hudi_pruning::PartitionTimeZone;

use crate::state::{AppState, TableRegistration};

type ApiError = (StatusCode, String);

fn error_response(err: HudiError) -> ApiError {
    let status = match &err {
        HudiError::TableNotFound(_) => StatusCode::NOT_FOUND,
        HudiError::TypeMismatch { .. } | HudiError::UnknownType(_) | HudiError::InvalidDomain(_) => {
            StatusCode::BAD_REQUEST
        }
        HudiError::InvalidPartitionName { .. }
        | HudiError::InvalidPartitionValue { .. }
        | HudiError::Metastore(_)
        | HudiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        warn!(error = %err, "request failed");
    }
    (status, err.to_string())
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct TablesResponse {
    pub tables: Vec<SchemaTableName>,
}

/// GET /tables
pub async fn list_tables(State(state): State<Arc<AppState>>) -> Result<Json<TablesResponse>, ApiError> {
    let tables = state.metastore.table_names().map_err(error_response)?;
    Ok(Json(TablesResponse { tables }))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTableResponse {
    pub table: SchemaTableName,
    pub partitions: usize,
}

/// POST /tables
///
/// Registers (or replaces) a table. Partition names that do not parse against
/// the table's partition columns are rejected with 400.
pub async fn register_table(
    State(state): State<Arc<AppState>>,
    Json(registration): Json<TableRegistration>,
) -> Result<(StatusCode, Json<RegisterTableResponse>), ApiError> {
    let table = registration.table.name.clone();
    let partitions = state.register(registration).map_err(|e| match e {
        HudiError::InvalidPartitionName { .. } | HudiError::InvalidPartitionValue { .. } => {
            (StatusCode::BAD_REQUEST, e.to_string())
        }
        other => error_response(other),
    })?;
    Ok((StatusCode::CREATED, Json(RegisterTableResponse { table, partitions })))
}

// ---------------------------------------------------------------------------
// Pruning
// ---------------------------------------------------------------------------

/// Wire form of a [`Domain`]. Values are partition value text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum DomainSpec {
    All,
    None,
    OnlyNull,
    NotNull,
    Values {
        values: Vec<String>,
        #[serde(default)]
        null_allowed: bool,
    },
    Range {
        #[serde(default)]
        low: Option<String>,
        #[serde(default)]
        low_inclusive: bool,
        #[serde(default)]
        high: Option<String>,
        #[serde(default)]
        high_inclusive: bool,
        #[serde(default)]
        null_allowed: bool,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDomainSpec {
    pub column: String,
    pub domain: DomainSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionsRequest {
    pub schema: String,
    pub table: String,
    #[serde(default)]
    pub none: bool,
    #[serde(default)]
    pub domains: Vec<ColumnDomainSpec>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub query_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PartitionsResponse {
    pub partitions: Vec<String>,
}

fn decode_literal(text: &str, column: &str, ty: &Type, time_zone: &PartitionTimeZone) -> Result<ScalarValue, HudiError> {
    decoder_for(ty)
        .decode(text, ty, time_zone)
        .ok_or_else(|| HudiError::InvalidDomain(format!("cannot read '{}' as {} for column {}", text, ty, column)))
}

fn bound(
    text: Option<&str>,
    inclusive: bool,
    column: &str,
    ty: &Type,
    time_zone: &PartitionTimeZone,
) -> Result<Bound<ScalarValue>, HudiError> {
    Ok(match text {
        None => Bound::Unbounded,
        Some(t) if inclusive => Bound::Included(decode_literal(t, column, ty, time_zone)?),
        Some(t) => Bound::Excluded(decode_literal(t, column, ty, time_zone)?),
    })
}

/// Build the [`Domain`] described by `spec` for a column of type `ty`.
pub fn to_domain(spec: &DomainSpec, column: &str, ty: Type, time_zone: &PartitionTimeZone) -> Result<Domain, HudiError> {
    Ok(match spec {
        DomainSpec::All => Domain::all(ty),
        DomainSpec::None => Domain::none(ty),
        DomainSpec::OnlyNull => Domain::only_null(ty),
        DomainSpec::NotNull => Domain::not_null(ty),
        DomainSpec::Values { values, null_allowed } => {
            let values = values
                .iter()
                .map(|v| decode_literal(v, column, &ty, time_zone))
                .collect::<Result<Vec<_>, _>>()?;
            Domain::create(SortedRangeSet::of_values(ty, values)?, *null_allowed)
        }
        DomainSpec::Range {
            low,
            low_inclusive,
            high,
            high_inclusive,
            null_allowed,
        } => {
            let range = Range::new(
                bound(low.as_deref(), *low_inclusive, column, &ty, time_zone)?,
                bound(high.as_deref(), *high_inclusive, column, &ty, time_zone)?,
            );
            Domain::create(SortedRangeSet::of_ranges(ty, [range])?, *null_allowed)
        }
    })
}

/// Resolve the request's column domains against `table` into a predicate.
fn build_constraint(
    state: &AppState,
    table: &Table,
    specs: &[ColumnDomainSpec],
) -> Result<TupleDomain<HudiColumnHandle>, HudiError> {
    let time_zone = &state.manager.config().time_zone;
    let mut constraint = TupleDomain::all();
    for spec in specs {
        let handle = table.column_handle(&spec.column).ok_or_else(|| {
            HudiError::InvalidDomain(format!("table {} has no column '{}'", table.name, spec.column))
        })?;
        let ty = match handle.get_type(state.manager.type_manager()) {
            Ok(ty) => ty,
            // Data columns never prune, so one without a primitive type is dropped.
            Err(e) if !handle.is_partition_key() => {
                debug!(column = %handle.name, error = %e, "ignoring domain on unsupported data column");
                continue;
            }
            Err(e) => return Err(e),
        };
        let domain = to_domain(&spec.domain, &handle.name, ty, time_zone)?;
        constraint = constraint.intersect(&TupleDomain::with_column_domains([(handle, domain)]))?;
    }
    Ok(constraint)
}

/// POST /partitions
pub async fn partitions(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PartitionsRequest>,
) -> Result<Json<PartitionsResponse>, ApiError> {
    let session = ConnectorSession {
        user: req.user.clone().unwrap_or_else(|| "hudi-server".to_string()),
        query_id: req.query_id.clone().unwrap_or_default(),
        source: Some("http".to_string()),
    };
    let table_name = SchemaTableName::new(&req.schema, &req.table);
    let metastore: &dyn Metastore = state.metastore.as_ref();

    if req.none {
        let partitions = state
            .manager
            .get_effective_partitions(&session, metastore, &table_name, &TupleDomain::none())
            .map_err(error_response)?;
        return Ok(Json(PartitionsResponse { partitions }));
    }

    let ctx = MetastoreContext::from(&session);
    let table = metastore
        .get_table(&ctx, &table_name.schema, &table_name.table)
        .map_err(error_response)?
        .ok_or_else(|| error_response(HudiError::TableNotFound(table_name.clone())))?;
    let constraint = build_constraint(&state, &table, &req.domains).map_err(error_response)?;
    let partitions = state
        .manager
        .get_effective_partitions_for_table(&ctx, metastore, &table, &constraint)
        .map_err(error_response)?;
    Ok(Json(PartitionsResponse { partitions }))
}
