//! # Application State
//!
//! Created once at startup and shared with every handler through `Arc`.
//!
//! - **Metastore**: an [`InMemoryMetastore`], optionally seeded from a JSON catalog
//!   file and extended at runtime through `POST /tables`.
//! - **Partition manager**: stateless, so one instance serves all requests.
//!
//! ## Catalog File
//!
//! ```json
//! {
//!   "tables": [
//!     {
//!       "table": {
//!         "name": { "schema": "default", "table": "stock_ticks_cow" },
//!         "partition_columns": [{ "name": "dt", "hive_type": "string" }]
//!       },
//!       "partitions": ["dt=2018-08-30", "dt=2018-08-31"]
//!     }
//!   ]
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use hudi_core::column::Table;
use hudi_core::metastore::InMemoryMetastore;
use hudi_core::types::{BuiltinTypeManager, TypeManager};
use hudi_core::{HudiError, Result};
use hudi_pruning::layout::PartitionLayout;
use hudi_pruning::parser::parse_with_layout;
use hudi_pruning::{HudiPartitionManager, PartitionManagerConfig};
use serde::Deserialize;
use tracing::info;

/// One table with its partition names.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRegistration {
    pub table: Table,
    #[serde(default)]
    pub partitions: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSeed {
    #[serde(default)]
    pub tables: Vec<TableRegistration>,
}

pub struct AppState {
    pub metastore: Arc<InMemoryMetastore>,
    pub manager: HudiPartitionManager,
}

impl AppState {
    pub fn new(config: PartitionManagerConfig) -> Self {
        let type_manager: Arc<dyn TypeManager> = Arc::new(BuiltinTypeManager);
        Self {
            metastore: Arc::new(InMemoryMetastore::new()),
            manager: HudiPartitionManager::new(type_manager, config),
        }
    }

    /// Register a table after checking that every partition name parses against
    /// its partition columns. Nothing is registered when a name is rejected.
    pub fn register(&self, registration: TableRegistration) -> Result<usize> {
        let TableRegistration { table, partitions } = registration;
        let layout = PartitionLayout::resolve(&table.partition_columns, self.manager.type_manager())?;
        if layout.is_empty() {
            if let Some(name) = partitions.iter().find(|p| !p.is_empty()) {
                return Err(HudiError::InvalidPartitionName {
                    table: table.name.clone(),
                    partition: name.clone(),
                    reason: "table has no partition columns".to_string(),
                });
            }
        } else {
            for name in &partitions {
                parse_with_layout(&table.name, name, &layout, &self.manager.config().time_zone)?;
            }
        }

        let count = partitions.len();
        info!(table = %table.name, partitions = count, "registered table");
        self.metastore.add_table(table, partitions)?;
        Ok(count)
    }

    pub fn seed(&self, seed: CatalogSeed) -> Result<usize> {
        let tables = seed.tables.len();
        for registration in seed.tables {
            self.register(registration)?;
        }
        Ok(tables)
    }

    pub fn seed_from_json(&self, json: &str) -> Result<usize> {
        let seed: CatalogSeed = serde_json::from_str(json)
            .map_err(|e| HudiError::Config(format!("invalid catalog: {}", e)))?;
        self.seed(seed)
    }

    pub fn seed_from_file(&self, path: &Path) -> Result<usize> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| HudiError::Config(format!("cannot read catalog {}: {}", path.display(), e)))?;
        self.seed_from_json(&json)
    }
}
