//! # hudi-core: Types and Interfaces for Hudi Partition Pruning
//!
//! This crate holds the value model shared by the partition pruner and its
//! collaborators. Nothing in here decides *which* partitions survive; it only
//! describes columns, values and predicates precisely enough that the pruner
//! can.
//!
//! ## Module Overview
//!
//! - **`types`**: Logical types, type signatures and the `TypeManager` lookup service.
//! - **`value`**: Typed scalar values and their nullable wrapper.
//! - **`domain`**: Value ranges, `Domain` (allowed values of one column) and
//!   `TupleDomain` (a conjunction of per-column domains).
//! - **`column`**: Table and column metadata as stored in the Hive metastore, plus
//!   the column handles that identify columns inside predicates.
//! - **`partition_name`**: The `key=value/key=value` naming convention used by the
//!   metastore for partition identifiers.
//! - **`metastore`**: The metastore trait consumed by the pruner and an in-memory
//!   implementation.
//! - **`error`**: The error type shared by every crate in the workspace.

pub mod column;
pub mod domain;
pub mod error;
pub mod metastore;
pub mod partition_name;
pub mod types;
pub mod value;

pub use error::{HudiError, Result};
