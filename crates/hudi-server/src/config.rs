//! # Server Configuration
//!
//! Read from the environment at startup:
//!
//! | Variable               | Default        | Meaning                                   |
//! |------------------------|----------------|-------------------------------------------|
//! | `HUDI_PRUNE_LISTEN`    | `0.0.0.0:3000` | Listen address                            |
//! | `HUDI_PRUNE_CATALOG`   | unset          | JSON file with tables to register at boot |
//! | `HUDI_PRUNE_TIME_ZONE` | `+00:00`       | Zone used to read timestamp partitions    |
//!
//! The time zone is an IANA id (`America/New_York`) or a fixed offset (`+08:00`).
//!
//! Logging is controlled separately through `RUST_LOG`.

use std::net::SocketAddr;
use std::path::PathBuf;

use hudi_core::{HudiError, Result};
use hudi_pruning::config::parse_time_zone;
use hudi_pruning::PartitionManagerConfig;

pub const LISTEN_VAR: &str = "HUDI_PRUNE_LISTEN";
pub const CATALOG_VAR: &str = "HUDI_PRUNE_CATALOG";
pub const TIME_ZONE_VAR: &str = "HUDI_PRUNE_TIME_ZONE";

const DEFAULT_LISTEN: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub catalog_path: Option<PathBuf>,
    pub manager: PartitionManagerConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source. Empty values count
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let listen_text = var(LISTEN_VAR).unwrap_or_else(|| DEFAULT_LISTEN.to_string());
        let listen = listen_text
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| HudiError::Config(format!("{}='{}': {}", LISTEN_VAR, listen_text, e)))?;

        let mut manager = PartitionManagerConfig::default();
        if let Some(tz) = var(TIME_ZONE_VAR) {
            manager.time_zone = parse_time_zone(&tz)?;
        }

        Ok(Self {
            listen,
            catalog_path: var(CATALOG_VAR).map(PathBuf::from),
            manager,
        })
    }
}
