//! # Partition Name Filtering
//!
//! Second phase of pruning. The metastore may return more partition names than the
//! predicate admits, so every returned name is parsed and checked against the
//! *full* predicate.
//!
//! ## Rules
//!
//! - A "no rows" predicate admits nothing. No name is parsed.
//! - An unpartitioned table has the single partition `""`, which always passes.
//! - Otherwise a name survives when every partition column's value (null
//!   included) lies in that column's domain. Columns without a domain impose no
//!   constraint. Checking a name stops at the first column that rejects it.
//! - Names that cannot be parsed fail the whole call.
//!
//! Names are independent of one another. Large candidate lists are checked on the
//! rayon pool; the result keeps the input order either way.

use hudi_core::column::{HudiColumnHandle, SchemaTableName};
use hudi_core::domain::TupleDomain;
use hudi_core::Result;
use rayon::prelude::*;
use tracing::debug;

use crate::layout::PartitionLayout;
use crate::parser::{parse_with_layout, PartitionRecord};
use crate::zone::PartitionTimeZone;

/// Checks partition names of one table against one predicate.
#[derive(Debug, Clone, Copy)]
pub struct PartitionFilter<'a> {
    table: &'a SchemaTableName,
    constraint: &'a TupleDomain<HudiColumnHandle>,
    layout: &'a PartitionLayout,
    time_zone: &'a PartitionTimeZone,
}

impl<'a> PartitionFilter<'a> {
    pub fn new(
        table: &'a SchemaTableName,
        constraint: &'a TupleDomain<HudiColumnHandle>,
        layout: &'a PartitionLayout,
        time_zone: &'a PartitionTimeZone,
    ) -> Self {
        Self {
            table,
            constraint,
            layout,
            time_zone,
        }
    }

    /// Whether the values of `record` satisfy the predicate.
    pub fn accepts(&self, record: &PartitionRecord) -> Result<bool> {
        if self.constraint.is_none() {
            return Ok(false);
        }
        for (column, value) in record.keys() {
            let Some(domain) = self.constraint.domain(column) else {
                continue;
            };
            if !domain.includes_nullable_value(value.value.as_ref())? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Parse `partition_name` and check it against the predicate.
    pub fn matches(&self, partition_name: &str) -> Result<bool> {
        let record = parse_with_layout(self.table, partition_name, self.layout, self.time_zone)?;
        self.accepts(&record)
    }

    /// Keep the names that satisfy the predicate, in input order. Lists of at least
    /// `parallel_threshold` names are checked in parallel.
    pub fn filter(&self, partition_names: Vec<String>, parallel_threshold: usize) -> Result<Vec<String>> {
        if self.constraint.is_none() {
            debug!(table = %self.table, "predicate admits no rows");
            return Ok(Vec::new());
        }
        if self.layout.is_empty() {
            return Ok(vec![String::new()]);
        }

        let candidates = partition_names.len();
        let retained: Vec<String> = if candidates >= parallel_threshold {
            partition_names
                .into_par_iter()
                .map(|name| -> Result<Option<String>> { Ok(self.matches(&name)?.then_some(name)) })
                .collect::<Result<Vec<Option<String>>>>()?
                .into_iter()
                .flatten()
                .collect()
        } else {
            let mut retained = Vec::new();
            for name in partition_names {
                if self.matches(&name)? {
                    retained.push(name);
                }
            }
            retained
        };

        debug!(
            table = %self.table,
            candidates,
            retained = retained.len(),
            parallel = candidates >= parallel_threshold,
            "filtered partition names"
        );
        Ok(retained)
    }
}

/// Filter `partition_names` of `table` against `constraint`.
pub fn filter_partition_names(
    table: &SchemaTableName,
    constraint: &TupleDomain<HudiColumnHandle>,
    partition_names: Vec<String>,
    layout: &PartitionLayout,
    time_zone: &PartitionTimeZone,
    parallel_threshold: usize,
) -> Result<Vec<String>> {
    PartitionFilter::new(table, constraint, layout, time_zone).filter(partition_names, parallel_threshold)
}
