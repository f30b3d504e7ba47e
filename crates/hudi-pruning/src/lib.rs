//! # hudi-pruning: Partition Pruning for Hudi Tables
//!
//! Decides which partitions of a Hudi table a query has to read. Pruning runs in
//! two phases:
//!
//! 1. **Push-down.** The predicate is reduced to one domain per partition column
//!    and sent to the metastore, which lists candidate partition names. The
//!    metastore may filter coarsely and return extra names.
//! 2. **Re-check.** Every candidate name is parsed into typed values and checked
//!    against the full predicate. Only names that pass are returned.
//!
//! The second phase makes the result exact regardless of how much the metastore
//! can evaluate.
//!
//! ## Module Overview
//!
//! - **`manager`**: [`HudiPartitionManager`], the entry point tying both phases together.
//! - **`splitter`**: Builds the store-directed predicate.
//! - **`filter`**: Re-checks candidate names against the full predicate.
//! - **`parser`**: Parses partition names into typed records and builds names from values.
//! - **`decode`**: Per-type decoders for partition value text, selected by type tag.
//! - **`layout`**: The resolved, ordered partition columns shared by the phases.
//! - **`config`**: Manager settings (time zone, parallelism threshold).
//! - **`zone`**: [`PartitionTimeZone`], a named IANA zone or a fixed offset.

pub mod config;
pub mod decode;
pub mod filter;
pub mod layout;
pub mod manager;
pub mod parser;
pub mod splitter;
pub mod zone;

pub use config::PartitionManagerConfig;
pub use manager::HudiPartitionManager;
pub use zone::PartitionTimeZone;
