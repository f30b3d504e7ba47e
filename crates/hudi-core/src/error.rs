//! # Error Type
//!
//! All failures in the pruning path are precondition violations: the table is
//! missing, an identifier does not match the table's partition columns, or a
//! predicate references a type the column does not have. None of them are
//! retried; the whole request fails and no partial partition list is returned.

use crate::column::SchemaTableName;
use crate::types::Type;

/// Result alias used across the workspace.
pub type Result<T, E = HudiError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum HudiError {
    /// The metastore has no table with this name.
    #[error("Table not found: {0}")]
    TableNotFound(SchemaTableName),

    /// A partition identifier could not be split into the expected key/value pairs.
    #[error("Invalid partition name '{partition}' for table {table}: {reason}")]
    InvalidPartitionName {
        table: SchemaTableName,
        partition: String,
        reason: String,
    },

    /// A partition value could not be decoded as the column's type.
    #[error("Invalid partition value '{value}' for {ty} partition key: {column}={value} in {table}")]
    InvalidPartitionValue {
        table: SchemaTableName,
        column: String,
        value: String,
        ty: Type,
    },

    /// A value or domain does not have the type the caller expected.
    #[error("Type mismatch: expected {expected}, found {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// The type-lookup service has no type for this signature.
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// A domain or range was constructed from inconsistent arguments.
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    /// The metastore failed for a reason of its own.
    #[error("Metastore error: {0}")]
    Metastore(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl HudiError {
    pub fn type_mismatch(expected: impl ToString, actual: impl ToString) -> Self {
        HudiError::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}
