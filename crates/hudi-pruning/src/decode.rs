//! # Partition Value Decoders
//!
//! Partition names carry every value as text. Turning that text back into a typed
//! [`ScalarValue`] has to agree exactly with how the writer produced it, or the
//! re-check after the metastore call admits or rejects the wrong partitions.
//!
//! Decoding is dispatched on the column's [`TypeTag`] through a fixed table of
//! [`ValueDecoder`]s, one per tag. Each decoder also knows how to encode a value
//! back into partition text, so names built with [`crate::parser::make_partition_name`]
//! always parse back to the same values.
//!
//! ## Conventions
//!
//! - Empty text decodes to `false` for booleans and to zero for numeric types.
//! - Integer values are range-checked against the declared width.
//! - Decimals are rescaled to the declared scale; a value that would need rounding
//!   or exceeds the declared precision is rejected.
//! - `char` values have trailing spaces removed; bounded `varchar` and `char`
//!   values longer than the declared length are rejected.
//! - Timestamps are local wall-clock times in the supplied time zone and are
//!   stored as UTC epoch milliseconds. Wall-clock times skipped by a daylight
//!   saving change do not decode.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use hudi_core::types::{Type, TypeTag};
use hudi_core::value::{ScalarValue, EPOCH_DAYS_FROM_CE};
use rust_decimal::Decimal;

use crate::zone::PartitionTimeZone;

type DecodeFn = fn(&str, &Type, &PartitionTimeZone) -> Option<ScalarValue>;
type EncodeFn = fn(&ScalarValue, &PartitionTimeZone) -> Option<String>;

/// Text codec for one family of partition value types.
pub struct ValueDecoder {
    pub tag: TypeTag,
    decode: DecodeFn,
    encode: EncodeFn,
}

impl ValueDecoder {
    /// Decode partition text as `ty`. `None` when the text is not a valid `ty`.
    pub fn decode(&self, text: &str, ty: &Type, time_zone: &PartitionTimeZone) -> Option<ScalarValue> {
        (self.decode)(text, ty, time_zone)
    }

    /// Encode a value as partition text. `None` when the value belongs to another family.
    pub fn encode(&self, value: &ScalarValue, time_zone: &PartitionTimeZone) -> Option<String> {
        (self.encode)(value, time_zone)
    }
}

// Indexed by `TypeTag as usize`; order must follow the enum declaration.
static DECODERS: [ValueDecoder; 7] = [
    ValueDecoder {
        tag: TypeTag::Boolean,
        decode: decode_boolean,
        encode: encode_boolean,
    },
    ValueDecoder {
        tag: TypeTag::Integer,
        decode: decode_integer,
        encode: encode_integer,
    },
    ValueDecoder {
        tag: TypeTag::Floating,
        decode: decode_floating,
        encode: encode_floating,
    },
    ValueDecoder {
        tag: TypeTag::Decimal,
        decode: decode_decimal,
        encode: encode_decimal,
    },
    ValueDecoder {
        tag: TypeTag::String,
        decode: decode_string,
        encode: encode_string,
    },
    ValueDecoder {
        tag: TypeTag::Date,
        decode: decode_date,
        encode: encode_date,
    },
    ValueDecoder {
        tag: TypeTag::Timestamp,
        decode: decode_timestamp,
        encode: encode_timestamp,
    },
];

/// The decoder responsible for values of `ty`.
pub fn decoder_for(ty: &Type) -> &'static ValueDecoder {
    &DECODERS[ty.tag() as usize]
}

fn decode_boolean(text: &str, _ty: &Type, _tz: &PartitionTimeZone) -> Option<ScalarValue> {
    if text.is_empty() || text.eq_ignore_ascii_case("false") {
        Some(ScalarValue::Bool(false))
    } else if text.eq_ignore_ascii_case("true") {
        Some(ScalarValue::Bool(true))
    } else {
        None
    }
}

fn encode_boolean(value: &ScalarValue, _tz: &PartitionTimeZone) -> Option<String> {
    match value {
        ScalarValue::Bool(v) => Some(v.to_string()),
        _ => None,
    }
}

fn decode_integer(text: &str, ty: &Type, _tz: &PartitionTimeZone) -> Option<ScalarValue> {
    let (min, max) = ty.integer_range()?;
    let v = if text.is_empty() { 0 } else { text.parse::<i64>().ok()? };
    (min..=max).contains(&v).then_some(ScalarValue::Int64(v))
}

fn encode_integer(value: &ScalarValue, _tz: &PartitionTimeZone) -> Option<String> {
    match value {
        ScalarValue::Int64(v) => Some(v.to_string()),
        _ => None,
    }
}

fn decode_floating(text: &str, ty: &Type, _tz: &PartitionTimeZone) -> Option<ScalarValue> {
    let v = if text.is_empty() { 0.0 } else { text.parse::<f64>().ok()? };
    let v = match ty {
        Type::Real => v as f32 as f64,
        _ => v,
    };
    Some(ScalarValue::Float64(v.into()))
}

fn encode_floating(value: &ScalarValue, _tz: &PartitionTimeZone) -> Option<String> {
    match value {
        ScalarValue::Float64(v) => Some(v.to_string()),
        _ => None,
    }
}

fn decimal_digits(d: &Decimal) -> u32 {
    let mut mantissa = d.mantissa().unsigned_abs();
    let mut digits = 1;
    while mantissa >= 10 {
        mantissa /= 10;
        digits += 1;
    }
    digits
}

fn decode_decimal(text: &str, ty: &Type, _tz: &PartitionTimeZone) -> Option<ScalarValue> {
    let Type::Decimal { precision, scale } = *ty else {
        return None;
    };
    let scale = scale as u32;
    let mut d = if text.is_empty() {
        Decimal::ZERO
    } else {
        Decimal::from_str(text).ok()?
    };
    if d.scale() > scale {
        let rounded = d.round_dp(scale);
        if rounded != d {
            return None;
        }
        d = rounded;
    }
    d.rescale(scale);
    if d.scale() != scale || decimal_digits(&d) > precision as u32 {
        return None;
    }
    Some(ScalarValue::Decimal(d))
}

fn encode_decimal(value: &ScalarValue, _tz: &PartitionTimeZone) -> Option<String> {
    match value {
        ScalarValue::Decimal(d) => Some(d.to_string()),
        _ => None,
    }
}

fn decode_string(text: &str, ty: &Type, _tz: &PartitionTimeZone) -> Option<ScalarValue> {
    let (value, max_len) = match ty {
        Type::Varchar(len) => (text, *len),
        Type::Char(len) => (text.trim_end_matches(' '), Some(*len)),
        _ => return None,
    };
    if let Some(max_len) = max_len {
        if value.chars().count() > max_len as usize {
            return None;
        }
    }
    Some(ScalarValue::Utf8(value.to_string()))
}

fn encode_string(value: &ScalarValue, _tz: &PartitionTimeZone) -> Option<String> {
    match value {
        ScalarValue::Utf8(v) => Some(v.clone()),
        _ => None,
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

fn decode_date(text: &str, _ty: &Type, _tz: &PartitionTimeZone) -> Option<ScalarValue> {
    let date = NaiveDate::parse_from_str(text, DATE_FORMAT).ok()?;
    Some(ScalarValue::Date(date.num_days_from_ce() - EPOCH_DAYS_FROM_CE))
}

fn encode_date(value: &ScalarValue, _tz: &PartitionTimeZone) -> Option<String> {
    match value {
        ScalarValue::Date(days) => {
            let date = NaiveDate::from_num_days_from_ce_opt(days.checked_add(EPOCH_DAYS_FROM_CE)?)?;
            Some(date.format(DATE_FORMAT).to_string())
        }
        _ => None,
    }
}

fn decode_timestamp(text: &str, _ty: &Type, tz: &PartitionTimeZone) -> Option<ScalarValue> {
    let local = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    Some(ScalarValue::Timestamp(tz.to_utc_millis(&local)?))
}

fn encode_timestamp(value: &ScalarValue, tz: &PartitionTimeZone) -> Option<String> {
    match value {
        ScalarValue::Timestamp(millis) => {
            Some(tz.to_local(*millis)?.format(TIMESTAMP_FORMAT).to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc() -> PartitionTimeZone {
        PartitionTimeZone::utc()
    }

    fn fixed(hours: i32) -> PartitionTimeZone {
        PartitionTimeZone::Fixed(FixedOffset::east_opt(hours * 3600).unwrap())
    }

    fn decode(text: &str, ty: Type) -> Option<ScalarValue> {
        decoder_for(&ty).decode(text, &ty, &utc())
    }

    #[test]
    fn test_table_is_indexed_by_tag() {
        for (i, decoder) in DECODERS.iter().enumerate() {
            assert_eq!(decoder.tag as usize, i);
        }
    }

    #[test]
    fn test_boolean() {
        assert_eq!(decode("TRUE", Type::Boolean), Some(ScalarValue::Bool(true)));
        assert_eq!(decode("", Type::Boolean), Some(ScalarValue::Bool(false)));
        assert_eq!(decode("yes", Type::Boolean), None);
    }

    #[test]
    fn test_integer_widths() {
        assert_eq!(decode("127", Type::TinyInt), Some(ScalarValue::Int64(127)));
        assert_eq!(decode("128", Type::TinyInt), None);
        assert_eq!(decode("", Type::Integer), Some(ScalarValue::Int64(0)));
        assert_eq!(decode("-9", Type::BigInt), Some(ScalarValue::Int64(-9)));
        assert_eq!(decode("1.5", Type::BigInt), None);
    }

    #[test]
    fn test_real_is_rounded_to_single_precision() {
        let Some(ScalarValue::Float64(v)) = decode("0.1", Type::Real) else {
            panic!("expected a float");
        };
        assert_eq!(v.0, 0.1f32 as f64);
        assert_eq!(decode("2.5", Type::Double), Some(ScalarValue::Float64(2.5.into())));
    }

    #[test]
    fn test_decimal_rescaling() {
        let ty = Type::Decimal { precision: 5, scale: 2 };
        assert_eq!(decode("12.3", ty), Some(ScalarValue::Decimal(Decimal::new(1230, 2))));
        assert_eq!(decode("12.300", ty), Some(ScalarValue::Decimal(Decimal::new(1230, 2))));
        assert_eq!(decode("", ty), Some(ScalarValue::Decimal(Decimal::new(0, 2))));
        // Would need rounding.
        assert_eq!(decode("12.345", ty), None);
        // Exceeds precision.
        assert_eq!(decode("1234.5", ty), None);
        assert_eq!(decode("abc", ty), None);
    }

    #[test]
    fn test_strings() {
        assert_eq!(decode("abc", Type::Varchar(None)), Some(ScalarValue::Utf8("abc".into())));
        assert_eq!(decode("abcd", Type::Varchar(Some(3))), None);
        assert_eq!(decode("ab  ", Type::Char(2)), Some(ScalarValue::Utf8("ab".into())));
    }

    #[test]
    fn test_date() {
        assert_eq!(decode("1970-01-01", Type::Date), Some(ScalarValue::Date(0)));
        assert_eq!(decode("2018-08-30", Type::Date), Some(ScalarValue::Date(17_773)));
        assert_eq!(decode("2018-13-01", Type::Date), None);
    }

    #[test]
    fn test_timestamp_uses_supplied_time_zone() {
        let ty = Type::Timestamp;
        let text = "2018-08-30 10:00:00";
        assert_eq!(decode(text, ty), Some(ScalarValue::Timestamp(1_535_623_200_000)));

        let plus_two = fixed(2);
        assert_eq!(
            decoder_for(&ty).decode(text, &ty, &plus_two),
            Some(ScalarValue::Timestamp(1_535_623_200_000 - 2 * 3_600_000))
        );
        assert_eq!(
            decode("2018-08-30 10:00:00.250", ty),
            Some(ScalarValue::Timestamp(1_535_623_200_250))
        );
        assert_eq!(decode("2018-08-30", ty), Some(ScalarValue::Timestamp(1_535_587_200_000)));
        assert_eq!(decode("yesterday", ty), None);
    }

    #[test]
    fn test_timestamp_in_named_zone_tracks_daylight_saving() {
        let ty = Type::Timestamp;
        let new_york: PartitionTimeZone = "America/New_York".parse().unwrap();
        let decoder = decoder_for(&ty);
        // 2018-01-15 15:00 UTC and 2018-07-15 14:00 UTC.
        assert_eq!(
            decoder.decode("2018-01-15 10:00:00", &ty, &new_york),
            Some(ScalarValue::Timestamp(1_516_028_400_000))
        );
        assert_eq!(
            decoder.decode("2018-07-15 10:00:00", &ty, &new_york),
            Some(ScalarValue::Timestamp(1_531_663_200_000))
        );
        assert_eq!(
            decoder.encode(&ScalarValue::Timestamp(1_531_663_200_000), &new_york).as_deref(),
            Some("2018-07-15 10:00:00")
        );
        // Repeated hour reads as EDT, 2018-11-04 05:30 UTC.
        assert_eq!(
            decoder.decode("2018-11-04 01:30:00", &ty, &new_york),
            Some(ScalarValue::Timestamp(1_541_309_400_000))
        );
        assert_eq!(decoder.decode("2018-03-11 02:30:00", &ty, &new_york), None);
    }

    #[test]
    fn test_encode_then_decode_agrees() {
        let plus_five = fixed(5);
        let cases = [
            (Type::Timestamp, ScalarValue::Timestamp(1_535_623_200_250)),
            (Type::Date, ScalarValue::Date(-3)),
            (Type::Decimal { precision: 10, scale: 2 }, ScalarValue::Decimal(Decimal::new(-505, 2))),
            (Type::Double, ScalarValue::Float64(3.0.into())),
        ];
        for (ty, value) in cases {
            let decoder = decoder_for(&ty);
            let text = decoder.encode(&value, &plus_five).unwrap();
            assert_eq!(decoder.decode(&text, &ty, &plus_five), Some(value), "{}", text);
        }
        assert_eq!(decoder_for(&Type::Date).encode(&ScalarValue::Int64(1), &utc()), None);
    }
}
