//! # Partition Time Zone
//!
//! Timestamp partition values are wall-clock text in the writer's zone. A named
//! IANA zone (`America/New_York`) follows that zone's daylight saving rules, so
//! January and July values of one table read with different offsets. A fixed
//! offset (`+02:00`) applies the same shift all year.
//!
//! ## Local Times Around Transitions
//!
//! - A wall-clock time that occurs twice (clocks set back) reads as the earlier
//!   of the two instants.
//! - A wall-clock time that never occurs (clocks set forward) has no instant and
//!   fails to decode.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, Utc};
use chrono_tz::Tz;
use hudi_core::HudiError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionTimeZone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl Default for PartitionTimeZone {
    fn default() -> Self {
        Self::utc()
    }
}

impl PartitionTimeZone {
    pub fn utc() -> Self {
        Self::Fixed(Utc.fix())
    }

    /// UTC epoch milliseconds of `local` read in this zone.
    pub fn to_utc_millis(&self, local: &NaiveDateTime) -> Option<i64> {
        Some(match self {
            Self::Named(tz) => local.and_local_timezone(*tz).earliest()?.timestamp_millis(),
            Self::Fixed(offset) => local.and_local_timezone(*offset).single()?.timestamp_millis(),
        })
    }

    /// Wall-clock time in this zone of the instant `millis` after the epoch.
    pub fn to_local(&self, millis: i64) -> Option<NaiveDateTime> {
        let instant = DateTime::from_timestamp_millis(millis)?;
        Some(match self {
            Self::Named(tz) => instant.with_timezone(tz).naive_local(),
            Self::Fixed(offset) => instant.with_timezone(offset).naive_local(),
        })
    }
}

impl FromStr for PartitionTimeZone {
    type Err = HudiError;

    /// Accepts `Z`, `UTC`, a `+HH:MM` / `-HH:MM` offset or an IANA zone id.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("z") || text.eq_ignore_ascii_case("utc") {
            return Ok(Self::utc());
        }
        if text.starts_with('+') || text.starts_with('-') {
            return text
                .parse::<FixedOffset>()
                .map(Self::Fixed)
                .map_err(|e| HudiError::Config(format!("invalid time zone offset '{}': {}", text, e)));
        }
        text.parse::<Tz>()
            .map(Self::Named)
            .map_err(|e| HudiError::Config(format!("unknown time zone '{}': {}", text, e)))
    }
}

impl fmt::Display for PartitionTimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(tz) => f.write_str(tz.name()),
            Self::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

impl Serialize for PartitionTimeZone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PartitionTimeZone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    fn new_york() -> PartitionTimeZone {
        "America/New_York".parse().unwrap()
    }

    #[test]
    fn test_parse() {
        assert_eq!("UTC".parse::<PartitionTimeZone>().unwrap(), PartitionTimeZone::utc());
        assert_eq!(
            "+05:30".parse::<PartitionTimeZone>().unwrap(),
            PartitionTimeZone::Fixed(FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap())
        );
        assert_eq!(new_york(), PartitionTimeZone::Named(Tz::America__New_York));
        assert!(matches!("CEST".parse::<PartitionTimeZone>(), Err(HudiError::Config(_))));
        assert!(matches!("+ab:cd".parse::<PartitionTimeZone>(), Err(HudiError::Config(_))));
    }

    #[test]
    fn test_named_zone_follows_daylight_saving() {
        let tz = new_york();
        // EST (-05:00) in January, EDT (-04:00) in July.
        let january = tz.to_utc_millis(&at(2018, 1, 15, 10, 0)).unwrap();
        let july = tz.to_utc_millis(&at(2018, 7, 15, 10, 0)).unwrap();
        assert_eq!(january, at(2018, 1, 15, 15, 0).and_utc().timestamp_millis());
        assert_eq!(july, at(2018, 7, 15, 14, 0).and_utc().timestamp_millis());
        assert_eq!(tz.to_local(july), Some(at(2018, 7, 15, 10, 0)));
    }

    #[test]
    fn test_transition_times() {
        let tz = new_york();
        // 01:30 happens twice on 2018-11-04; the first is still EDT.
        assert_eq!(
            tz.to_utc_millis(&at(2018, 11, 4, 1, 30)),
            Some(at(2018, 11, 4, 5, 30).and_utc().timestamp_millis())
        );
        // 02:30 is skipped on 2018-03-11.
        assert_eq!(tz.to_utc_millis(&at(2018, 3, 11, 2, 30)), None);
    }

    #[test]
    fn test_display_round_trips() {
        for text in ["America/New_York", "+02:00", "-08:00"] {
            let tz: PartitionTimeZone = text.parse().unwrap();
            assert_eq!(tz.to_string(), text);
        }
        assert_eq!(PartitionTimeZone::utc().to_string(), "+00:00");
    }
}
