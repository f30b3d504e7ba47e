//! Partition manager settings.

use hudi_core::Result;
use serde::{Deserialize, Serialize};

use crate::zone::PartitionTimeZone;

/// Default number of candidate names at which filtering moves to the rayon pool.
pub const DEFAULT_PARALLEL_FILTER_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionManagerConfig {
    /// Zone used to read timestamp partition values. It must match the zone the
    /// writer used, otherwise timestamp partitions are shifted.
    pub time_zone: PartitionTimeZone,
    /// Candidate count at or above which names are checked in parallel.
    pub parallel_filter_threshold: usize,
}

impl Default for PartitionManagerConfig {
    fn default() -> Self {
        Self {
            time_zone: PartitionTimeZone::utc(),
            parallel_filter_threshold: DEFAULT_PARALLEL_FILTER_THRESHOLD,
        }
    }
}

impl PartitionManagerConfig {
    pub fn with_time_zone(mut self, time_zone: PartitionTimeZone) -> Self {
        self.time_zone = time_zone;
        self
    }

    pub fn with_parallel_filter_threshold(mut self, threshold: usize) -> Self {
        self.parallel_filter_threshold = threshold;
        self
    }
}

/// Parse `Z`, `UTC`, a `+HH:MM` / `-HH:MM` offset or an IANA zone id such as
/// `America/New_York`.
pub fn parse_time_zone(text: &str) -> Result<PartitionTimeZone> {
    text.parse()
}
