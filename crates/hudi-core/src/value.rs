//! # Typed Values
//!
//! A [`ScalarValue`] is a non-null constant of some logical type. Nullability is
//! modelled one level up: a [`NullableValue`] pairs a type with an optional value,
//! which is what a parsed partition key produces (Hive's default partition decodes
//! to null).
//!
//! Several logical types share a representation: every integer width is an
//! `Int64`, `real` and `double` are both `Float64`, `varchar` and `char` are both
//! `Utf8`. [`ScalarValue::matches_type`] is the single place that decides whether a
//! value may be used where a given type is expected.

use chrono::{DateTime, NaiveDate};
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::types::Type;

/// Scalar value of a partition column or predicate literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarValue {
    /// Boolean true/false.
    Bool(bool),
    /// Any integer type, widened to 64 bits.
    Int64(i64),
    /// `real` or `double`, wrapped in OrderedFloat for Eq/Hash support.
    Float64(OrderedFloat<f64>),
    /// Exact decimal, already rescaled to the column's declared scale.
    Decimal(Decimal),
    /// `varchar` or `char` text.
    Utf8(String),
    /// Date as days since Unix epoch (1970-01-01).
    Date(i32),
    /// Timestamp as milliseconds since the Unix epoch, UTC.
    Timestamp(i64),
}

impl ScalarValue {
    /// Whether this value is a legal instance of `ty`.
    pub fn matches_type(&self, ty: &Type) -> bool {
        match (self, ty) {
            (ScalarValue::Bool(_), Type::Boolean) => true,
            (ScalarValue::Int64(v), _) => match ty.integer_range() {
                Some((min, max)) => (min..=max).contains(v),
                None => false,
            },
            (ScalarValue::Float64(_), Type::Real | Type::Double) => true,
            (ScalarValue::Decimal(d), Type::Decimal { scale, .. }) => d.scale() == *scale as u32,
            (ScalarValue::Utf8(_), Type::Varchar(_) | Type::Char(_)) => true,
            (ScalarValue::Date(_), Type::Date) => true,
            (ScalarValue::Timestamp(_), Type::Timestamp) => true,
            _ => false,
        }
    }

    /// Short name of the representation, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ScalarValue::Bool(_) => "boolean",
            ScalarValue::Int64(_) => "integer",
            ScalarValue::Float64(_) => "floating point",
            ScalarValue::Decimal(_) => "decimal",
            ScalarValue::Utf8(_) => "string",
            ScalarValue::Date(_) => "date",
            ScalarValue::Timestamp(_) => "timestamp",
        }
    }
}

/// Values of the same representation are totally ordered; values of different
/// representations are incomparable.
impl PartialOrd for ScalarValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Int64(a), Self::Int64(b)) => Some(a.cmp(b)),
            (Self::Float64(a), Self::Float64(b)) => Some(a.cmp(b)),
            (Self::Decimal(a), Self::Decimal(b)) => Some(a.cmp(b)),
            (Self::Utf8(a), Self::Utf8(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::Timestamp(a), Self::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Bool(v) => write!(f, "{}", v),
            ScalarValue::Int64(v) => write!(f, "{}", v),
            ScalarValue::Float64(v) => write!(f, "{}", v),
            ScalarValue::Decimal(v) => write!(f, "{}", v),
            ScalarValue::Utf8(v) => write!(f, "'{}'", v),
            ScalarValue::Date(days) => {
                match days.checked_add(EPOCH_DAYS_FROM_CE).and_then(NaiveDate::from_num_days_from_ce_opt) {
                    Some(date) => write!(f, "DATE '{}'", date.format("%Y-%m-%d")),
                    None => write!(f, "DATE {}", days),
                }
            }
            ScalarValue::Timestamp(millis) => match DateTime::from_timestamp_millis(*millis) {
                Some(ts) => write!(f, "TIMESTAMP '{}'", ts.format("%Y-%m-%d %H:%M:%S%.3f")),
                None => write!(f, "TIMESTAMP {}", millis),
            },
        }
    }
}

/// Days from 0001-01-01 (day 1 of the common era) to 1970-01-01.
pub const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// A value of a known type that may be null.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NullableValue {
    pub ty: Type,
    pub value: Option<ScalarValue>,
}

impl NullableValue {
    pub fn of(ty: Type, value: ScalarValue) -> Self {
        Self {
            ty,
            value: Some(value),
        }
    }

    pub fn as_null(ty: Type) -> Self {
        Self { ty, value: None }
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }
}

impl fmt::Display for NullableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(v) => write!(f, "{}", v),
            None => write!(f, "NULL"),
        }
    }
}
