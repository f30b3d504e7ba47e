//! # Metastore Interface
//!
//! The pruner talks to the Hive metastore through the [`Metastore`] trait. Two
//! operations are needed: fetching table metadata and listing partition names that
//! may satisfy a [`PartitionPredicate`].
//!
//! ## Filtering Contract
//!
//! `get_partition_names_by_filter` is allowed to *over-approximate*: it may return
//! partitions that do not satisfy the predicate, because many metastores can only
//! evaluate simple equality constraints. It must never *under-approximate*. The
//! pruner re-checks every returned name against the full predicate, so correctness
//! does not depend on how much filtering the store actually performs.
//!
//! ## In-Memory Implementation
//!
//! [`InMemoryMetastore`] keeps tables and partition names in a `RwLock`ed map. Its
//! filter mimics a typical metastore: it compares the value text of single-valued
//! string domains and ignores every other constraint.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::column::{Column, SchemaTableName, Table};
use crate::domain::Domain;
use crate::error::{HudiError, Result};
use crate::partition_name::to_partition_values;
use crate::types::Type;
use crate::value::ScalarValue;

/// Per-query session information supplied by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorSession {
    pub user: String,
    pub query_id: String,
    #[serde(default)]
    pub source: Option<String>,
}

impl ConnectorSession {
    pub fn new(user: impl Into<String>, query_id: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            query_id: query_id.into(),
            source: None,
        }
    }
}

/// Caller identity forwarded with every metastore request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetastoreContext {
    pub user: String,
    pub query_id: String,
    pub source: Option<String>,
}

impl From<&ConnectorSession> for MetastoreContext {
    fn from(session: &ConnectorSession) -> Self {
        Self {
            user: session.user.clone(),
            query_id: session.query_id.clone(),
            source: session.source.clone(),
        }
    }
}

/// Store-directed predicate: exactly one domain per partition column, in the
/// table's partition column order.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionPredicate {
    entries: Vec<(Column, Domain)>,
}

impl PartitionPredicate {
    pub fn new(entries: Vec<(Column, Domain)>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(Column, Domain)] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Column, &Domain)> {
        self.entries.iter().map(|(c, d)| (c, d))
    }

    pub fn get(&self, column: &Column) -> Option<&Domain> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, d)| d)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.entries.iter().map(|(c, _)| c)
    }
}

/// Metadata store consumed by the partition manager.
pub trait Metastore: Send + Sync {
    fn get_table(&self, ctx: &MetastoreContext, schema: &str, table: &str) -> Result<Option<Table>>;

    /// List partition names that may satisfy `predicate`. May return extra names;
    /// must not omit matching ones.
    fn get_partition_names_by_filter(
        &self,
        ctx: &MetastoreContext,
        schema: &str,
        table: &str,
        predicate: &PartitionPredicate,
    ) -> Result<Vec<String>>;
}

#[derive(Debug, Clone)]
struct TableEntry {
    table: Table,
    partitions: Vec<String>,
}

/// Metastore kept entirely in memory, for tests and the standalone server.
#[derive(Debug, Default)]
pub struct InMemoryMetastore {
    tables: RwLock<BTreeMap<SchemaTableName, TableEntry>>,
}

impl InMemoryMetastore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a table and its partition names. Names are kept in
    /// the given order.
    pub fn add_table(&self, table: Table, partitions: Vec<String>) -> Result<()> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| HudiError::Metastore("table registry lock poisoned".to_string()))?;
        tables.insert(table.name.clone(), TableEntry { table, partitions });
        Ok(())
    }

    pub fn table_names(&self) -> Result<Vec<SchemaTableName>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| HudiError::Metastore("table registry lock poisoned".to_string()))?;
        Ok(tables.keys().cloned().collect())
    }

    fn entry(&self, schema: &str, table: &str) -> Result<Option<TableEntry>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| HudiError::Metastore("table registry lock poisoned".to_string()))?;
        Ok(tables.get(&SchemaTableName::new(schema, table)).cloned())
    }
}

/// Value text a partition must carry for `domain`, when the domain pins a single
/// varchar value. Everything else is left to the engine.
fn exact_string_value(domain: &Domain) -> Option<&str> {
    if !matches!(domain.ty(), Type::Varchar(_)) {
        return None;
    }
    match domain.get_single_value() {
        Some(ScalarValue::Utf8(v)) => Some(v.as_str()),
        _ => None,
    }
}

impl Metastore for InMemoryMetastore {
    fn get_table(&self, _ctx: &MetastoreContext, schema: &str, table: &str) -> Result<Option<Table>> {
        Ok(self.entry(schema, table)?.map(|e| e.table))
    }

    fn get_partition_names_by_filter(
        &self,
        ctx: &MetastoreContext,
        schema: &str,
        table: &str,
        predicate: &PartitionPredicate,
    ) -> Result<Vec<String>> {
        let entry = self
            .entry(schema, table)?
            .ok_or_else(|| HudiError::TableNotFound(SchemaTableName::new(schema, table)))?;

        if predicate.iter().any(|(_, d)| d.is_none()) {
            return Ok(Vec::new());
        }

        let required: HashMap<String, &str> = predicate
            .iter()
            .filter_map(|(c, d)| exact_string_value(d).map(|v| (c.name.to_ascii_lowercase(), v)))
            .collect();
        if required.is_empty() {
            return Ok(entry.partitions);
        }

        let names: Vec<String> = entry
            .partitions
            .into_iter()
            .filter(|name| {
                // Names this store cannot interpret are passed through untouched.
                let Ok(parts) = to_partition_values(name) else {
                    return true;
                };
                parts.iter().all(|kv| match required.get(&kv.key.to_ascii_lowercase()) {
                    Some(expected) => kv.value.as_deref() == Some(*expected),
                    None => true,
                })
            })
            .collect();
        trace!(
            user = %ctx.user,
            table = %SchemaTableName::new(schema, table),
            returned = names.len(),
            "listed partition names"
        );
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::HiveType;
    use crate::domain::{Range, SortedRangeSet};

    fn ctx() -> MetastoreContext {
        MetastoreContext::from(&ConnectorSession::new("test", "q1"))
    }

    fn region_dt_table() -> Table {
        Table::new(
            SchemaTableName::new("default", "trips"),
            vec![],
            vec![
                Column::new("region", HiveType::new("string")),
                Column::new("dt", HiveType::new("string")),
            ],
        )
    }

    #[test]
    fn test_single_string_value_is_pushed_down() {
        let store = InMemoryMetastore::new();
        let table = region_dt_table();
        store
            .add_table(
                table.clone(),
                vec![
                    "region=us/dt=2018-08-30".into(),
                    "region=eu/dt=2018-08-30".into(),
                    "region=us/dt=2018-08-31".into(),
                ],
            )
            .unwrap();

        let ty = Type::Varchar(None);
        let predicate = PartitionPredicate::new(vec![
            (
                table.partition_columns[0].clone(),
                Domain::single_value(ty, ScalarValue::Utf8("us".into())).unwrap(),
            ),
            (
                table.partition_columns[1].clone(),
                Domain::create(
                    SortedRangeSet::of_ranges(
                        ty,
                        vec![Range::greater_than(ScalarValue::Utf8("2018-08-30".into()))],
                    )
                    .unwrap(),
                    false,
                ),
            ),
        ]);

        // The range on dt is not understood by the store and is passed through.
        let names = store
            .get_partition_names_by_filter(&ctx(), "default", "trips", &predicate)
            .unwrap();
        assert_eq!(names, vec!["region=us/dt=2018-08-30", "region=us/dt=2018-08-31"]);
    }

    #[test]
    fn test_none_domain_lists_nothing() {
        let store = InMemoryMetastore::new();
        let table = region_dt_table();
        store.add_table(table.clone(), vec!["region=us/dt=x".into()]).unwrap();
        let predicate = PartitionPredicate::new(vec![
            (table.partition_columns[0].clone(), Domain::none(Type::Varchar(None))),
            (table.partition_columns[1].clone(), Domain::all(Type::Varchar(None))),
        ]);
        let names = store
            .get_partition_names_by_filter(&ctx(), "default", "trips", &predicate)
            .unwrap();
        assert!(names.is_empty());
    }

    #[test]
    fn test_unknown_table() {
        let store = InMemoryMetastore::new();
        assert_eq!(store.get_table(&ctx(), "default", "missing").unwrap(), None);
        let err = store
            .get_partition_names_by_filter(&ctx(), "default", "missing", &PartitionPredicate::new(vec![]))
            .unwrap_err();
        assert!(matches!(err, HudiError::TableNotFound(_)));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let store = InMemoryMetastore::new();
        store.add_table(region_dt_table(), vec![]).unwrap();
        assert!(store.get_table(&ctx(), "DEFAULT", "Trips").unwrap().is_some());
        assert_eq!(store.table_names().unwrap(), vec![SchemaTableName::new("default", "trips")]);
    }
}
