//! # Partition Manager
//!
//! Entry point of partition pruning. Given a table and the engine's predicate it
//! returns the names of the partitions that may hold matching rows, in metastore
//! order.
//!
//! ## Flow
//!
//! 1. The table is looked up; a missing table is an error.
//! 2. An unpartitioned table returns `[""]`, its single implicit partition,
//!    whatever the predicate.
//! 3. A "no rows" predicate returns no partitions without listing any.
//! 4. The partition columns are resolved into a [`PartitionLayout`].
//! 5. The store-directed predicate is built and sent to the metastore.
//! 6. The returned names are re-checked against the full predicate.
//!
//! The manager holds no per-call state. One instance serves concurrent calls for
//! any number of tables.

use std::sync::Arc;

use hudi_core::column::{HudiColumnHandle, SchemaTableName, Table};
use hudi_core::domain::TupleDomain;
use hudi_core::metastore::{ConnectorSession, Metastore, MetastoreContext};
use hudi_core::types::TypeManager;
use hudi_core::{HudiError, Result};
use tracing::{debug, info};

use crate::config::PartitionManagerConfig;
use crate::filter::PartitionFilter;
use crate::layout::PartitionLayout;
use crate::splitter::build_partition_predicate;

#[derive(Clone)]
pub struct HudiPartitionManager {
    type_manager: Arc<dyn TypeManager>,
    config: PartitionManagerConfig,
}

impl std::fmt::Debug for HudiPartitionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HudiPartitionManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HudiPartitionManager {
    pub fn new(type_manager: Arc<dyn TypeManager>, config: PartitionManagerConfig) -> Self {
        Self { type_manager, config }
    }

    pub fn config(&self) -> &PartitionManagerConfig {
        &self.config
    }

    pub fn type_manager(&self) -> &dyn TypeManager {
        self.type_manager.as_ref()
    }

    /// Names of the partitions of `table_name` that may contain rows matching
    /// `constraint`.
    pub fn get_effective_partitions(
        &self,
        session: &ConnectorSession,
        metastore: &dyn Metastore,
        table_name: &SchemaTableName,
        constraint: &TupleDomain<HudiColumnHandle>,
    ) -> Result<Vec<String>> {
        let ctx = MetastoreContext::from(session);
        let table = metastore
            .get_table(&ctx, &table_name.schema, &table_name.table)?
            .ok_or_else(|| HudiError::TableNotFound(table_name.clone()))?;
        self.get_effective_partitions_for_table(&ctx, metastore, &table, constraint)
    }

    /// Same as [`Self::get_effective_partitions`] for a table whose metadata the
    /// caller already holds.
    pub fn get_effective_partitions_for_table(
        &self,
        ctx: &MetastoreContext,
        metastore: &dyn Metastore,
        table: &Table,
        constraint: &TupleDomain<HudiColumnHandle>,
    ) -> Result<Vec<String>> {
        if !table.is_partitioned() {
            debug!(table = %table.name, "table is not partitioned");
            return Ok(vec![String::new()]);
        }
        if constraint.is_none() {
            debug!(table = %table.name, "predicate admits no rows, skipping partition listing");
            return Ok(Vec::new());
        }

        let layout = PartitionLayout::resolve(&table.partition_columns, self.type_manager.as_ref())?;
        let predicate = build_partition_predicate(constraint, &layout)?;
        let candidates = metastore.get_partition_names_by_filter(
            ctx,
            &table.name.schema,
            &table.name.table,
            &predicate,
        )?;
        let candidate_count = candidates.len();

        let partitions = PartitionFilter::new(&table.name, constraint, &layout, &self.config.time_zone)
            .filter(candidates, self.config.parallel_filter_threshold)?;
        info!(
            table = %table.name,
            query_id = %ctx.query_id,
            candidates = candidate_count,
            partitions = partitions.len(),
            "resolved effective partitions"
        );
        Ok(partitions)
    }
}
