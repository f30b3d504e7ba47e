//! # Table and Column Metadata
//!
//! Two views of a column exist side by side:
//!
//! - [`Column`] is what the Hive metastore stores: a name, a Hive type string and
//!   an optional comment. Partition predicates sent *to* the metastore are keyed by
//!   `Column`.
//! - [`HudiColumnHandle`] is what the engine uses to identify a column inside a
//!   query predicate. It adds the ordinal position and whether the column is a
//!   partition key. Predicates coming *from* the planner are keyed by handle.
//!
//! [`HudiColumnHandle::from_partition_columns`] derives handles from the table's
//! partition columns. Both the store-directed predicate and identifier parsing walk
//! that same ordered list, which keeps values attached to the right column.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{HudiError, Result};
use crate::types::{Type, TypeManager, TypeSignature};

/// Fully-qualified table name. Both parts are stored lower-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaTableName {
    pub schema: String,
    pub table: String,
}

impl SchemaTableName {
    pub fn new(schema: impl AsRef<str>, table: impl AsRef<str>) -> Self {
        Self {
            schema: schema.as_ref().to_ascii_lowercase(),
            table: table.as_ref().to_ascii_lowercase(),
        }
    }
}

impl fmt::Display for SchemaTableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// Column type as spelled in the Hive metastore (`string`, `int`, `decimal(10,2)`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HiveType(String);

impl HiveType {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_ascii_lowercase())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Engine type signature for this Hive type. Only primitive types can be
    /// partition keys, so complex types are rejected.
    pub fn type_signature(&self) -> Result<TypeSignature> {
        let sig: TypeSignature = self.0.parse()?;
        let params = sig.parameters.clone();
        let base = match (sig.base.as_str(), params.as_slice()) {
            ("boolean", []) => "boolean",
            ("tinyint", []) => "tinyint",
            ("smallint", []) => "smallint",
            ("int" | "integer", []) => "integer",
            ("bigint", []) => "bigint",
            ("float", []) => "real",
            ("double", []) => "double",
            // Hive's bare `decimal` is decimal(10,0).
            ("decimal", []) => return Ok(TypeSignature::with_parameters("decimal", vec![10, 0])),
            ("decimal", [precision]) => {
                return Ok(TypeSignature::with_parameters("decimal", vec![*precision, 0]))
            }
            ("decimal", [_, _]) => "decimal",
            ("string", []) => "varchar",
            ("varchar", [_]) => "varchar",
            ("char", [_]) => "char",
            ("date", []) => "date",
            ("timestamp", []) => "timestamp",
            _ => return Err(HudiError::UnknownType(self.0.clone())),
        };
        Ok(TypeSignature::with_parameters(base, params))
    }

    /// Resolve the engine type through the type-lookup service.
    pub fn get_type(&self, type_manager: &dyn TypeManager) -> Result<Type> {
        type_manager.resolve(&self.type_signature()?)
    }
}

impl fmt::Display for HiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn default_nullable() -> bool {
    true
}

/// Column as stored in the metastore.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub hive_type: HiveType,
    #[serde(default)]
    pub comment: Option<String>,
    /// Whether the column may hold null. Hive partition keys are nullable (the
    /// default partition); a table can declare otherwise.
    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, hive_type: HiveType) -> Self {
        Self {
            name: name.into(),
            hive_type,
            comment: None,
            nullable: true,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// Whether a column is a partition key or a regular data column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    PartitionKey,
    Regular,
}

/// Identity of a column inside query predicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HudiColumnHandle {
    pub name: String,
    pub hive_type: HiveType,
    /// Position within the partition columns (for partition keys) or within the
    /// data columns (for regular columns).
    pub ordinal: u32,
    pub column_type: ColumnType,
    pub comment: Option<String>,
    pub nullable: bool,
}

impl HudiColumnHandle {
    fn from_columns(columns: &[Column], column_type: ColumnType) -> Vec<Self> {
        columns
            .iter()
            .enumerate()
            .map(|(i, c)| HudiColumnHandle {
                name: c.name.clone(),
                hive_type: c.hive_type.clone(),
                ordinal: i as u32,
                column_type,
                comment: c.comment.clone(),
                nullable: c.nullable,
            })
            .collect()
    }

    /// Handles for a table's partition columns, in declaration order.
    pub fn from_partition_columns(columns: &[Column]) -> Vec<Self> {
        Self::from_columns(columns, ColumnType::PartitionKey)
    }

    pub fn from_data_columns(columns: &[Column]) -> Vec<Self> {
        Self::from_columns(columns, ColumnType::Regular)
    }

    pub fn is_partition_key(&self) -> bool {
        self.column_type == ColumnType::PartitionKey
    }

    pub fn get_type(&self, type_manager: &dyn TypeManager) -> Result<Type> {
        self.hive_type.get_type(type_manager)
    }
}

impl fmt::Display for HudiColumnHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.hive_type)?;
        if self.is_partition_key() {
            write!(f, ":partition")?;
        }
        Ok(())
    }
}

/// Table metadata as returned by the metastore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: SchemaTableName,
    #[serde(default)]
    pub data_columns: Vec<Column>,
    #[serde(default)]
    pub partition_columns: Vec<Column>,
    /// Base path of the Hudi table, when known.
    #[serde(default)]
    pub location: Option<String>,
}

impl Table {
    pub fn new(name: SchemaTableName, data_columns: Vec<Column>, partition_columns: Vec<Column>) -> Self {
        Self {
            name,
            data_columns,
            partition_columns,
            location: None,
        }
    }

    pub fn is_partitioned(&self) -> bool {
        !self.partition_columns.is_empty()
    }

    /// Handles for every column: data columns first, then partition keys.
    pub fn column_handles(&self) -> Vec<HudiColumnHandle> {
        let mut handles = HudiColumnHandle::from_data_columns(&self.data_columns);
        handles.extend(HudiColumnHandle::from_partition_columns(&self.partition_columns));
        handles
    }

    /// Look up a column handle by (case-insensitive) name.
    pub fn column_handle(&self, name: &str) -> Option<HudiColumnHandle> {
        self.column_handles()
            .into_iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
    }
}
