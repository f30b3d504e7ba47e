//! # Partition Identifier Parsing
//!
//! Turns a metastore partition name such as `region=us/dt=2018-08-30` into a
//! [`PartitionRecord`]: one typed, possibly-null value per partition column.
//!
//! Parsing is strict. The name must have exactly one `key=value` component per
//! partition column, in column order, and every key must name the column at that
//! position. A name that does not fit the table's partition columns means the
//! metastore and the table metadata disagree, so it is reported as an error rather
//! than silently kept or dropped.

use hudi_core::column::{HudiColumnHandle, SchemaTableName};
use hudi_core::partition_name::{self, to_partition_values};
use hudi_core::types::Type;
use hudi_core::value::NullableValue;
use hudi_core::{HudiError, Result};

use crate::decode::decoder_for;
use crate::layout::PartitionLayout;
use crate::zone::PartitionTimeZone;

/// Typed key values of one partition.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionRecord {
    name: String,
    keys: Vec<(HudiColumnHandle, NullableValue)>,
}

impl PartitionRecord {
    /// The partition name this record was parsed from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keys(&self) -> &[(HudiColumnHandle, NullableValue)] {
        &self.keys
    }

    pub fn get(&self, column: &HudiColumnHandle) -> Option<&NullableValue> {
        self.keys.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }
}

fn invalid_name(table: &SchemaTableName, partition: &str, reason: String) -> HudiError {
    HudiError::InvalidPartitionName {
        table: table.clone(),
        partition: partition.to_string(),
        reason,
    }
}

/// Parse `partition_name` against ordered partition columns and their types.
pub fn parse_partition(
    table: &SchemaTableName,
    partition_name: &str,
    columns: &[HudiColumnHandle],
    types: &[Type],
    time_zone: &PartitionTimeZone,
) -> Result<PartitionRecord> {
    if columns.len() != types.len() {
        return Err(HudiError::type_mismatch(
            format!("{} partition column types", columns.len()),
            types.len(),
        ));
    }

    let parts = to_partition_values(partition_name)
        .map_err(|reason| invalid_name(table, partition_name, reason))?;
    if parts.len() != columns.len() {
        return Err(invalid_name(
            table,
            partition_name,
            format!("expected {} partition keys, found {}", columns.len(), parts.len()),
        ));
    }

    let mut keys = Vec::with_capacity(columns.len());
    for ((part, column), ty) in parts.into_iter().zip(columns).zip(types) {
        if !part.key.eq_ignore_ascii_case(&column.name) {
            return Err(invalid_name(
                table,
                partition_name,
                format!(
                    "expected key '{}' at position {}, found '{}'",
                    column.name, column.ordinal, part.key
                ),
            ));
        }
        let value = match part.value {
            None => NullableValue::as_null(*ty),
            Some(text) => {
                let decoded = decoder_for(ty).decode(&text, ty, time_zone).ok_or_else(|| {
                    HudiError::InvalidPartitionValue {
                        table: table.clone(),
                        column: column.name.clone(),
                        value: text.clone(),
                        ty: *ty,
                    }
                })?;
                NullableValue::of(*ty, decoded)
            }
        };
        keys.push((column.clone(), value));
    }

    Ok(PartitionRecord {
        name: partition_name.to_string(),
        keys,
    })
}

/// [`parse_partition`] over a resolved layout.
pub fn parse_with_layout(
    table: &SchemaTableName,
    partition_name: &str,
    layout: &PartitionLayout,
    time_zone: &PartitionTimeZone,
) -> Result<PartitionRecord> {
    parse_partition(table, partition_name, layout.handles(), layout.types(), time_zone)
}

/// Build the partition name for typed values, the exact inverse of [`parse_partition`].
pub fn make_partition_name(
    layout: &PartitionLayout,
    values: &[NullableValue],
    time_zone: &PartitionTimeZone,
) -> Result<String> {
    if values.len() != layout.len() {
        return Err(HudiError::type_mismatch(
            format!("{} partition values", layout.len()),
            values.len(),
        ));
    }
    let mut encoded = Vec::with_capacity(values.len());
    for ((_, handle, ty), value) in layout.iter().zip(values) {
        let text = match &value.value {
            None => None,
            Some(v) => {
                if !v.matches_type(ty) {
                    return Err(HudiError::type_mismatch(ty, format!("{} value {}", v.kind(), v)));
                }
                let text = decoder_for(ty)
                    .encode(v, time_zone)
                    .ok_or_else(|| HudiError::type_mismatch(ty, v.kind()))?;
                Some(text)
            }
        };
        encoded.push((handle.name.as_str(), text));
    }
    Ok(partition_name::make_partition_name(
        encoded.iter().map(|(k, v)| (*k, v.as_deref())),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hudi_core::column::{Column, HiveType};
    use hudi_core::types::BuiltinTypeManager;
    use hudi_core::value::ScalarValue;

    fn utc() -> PartitionTimeZone {
        PartitionTimeZone::utc()
    }

    fn table() -> SchemaTableName {
        SchemaTableName::new("default", "trips")
    }

    fn layout() -> PartitionLayout {
        PartitionLayout::resolve(
            &[
                Column::new("region", HiveType::new("string")),
                Column::new("dt", HiveType::new("date")),
                Column::new("hour", HiveType::new("int")),
            ],
            &BuiltinTypeManager,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_multi_column_name() {
        let layout = layout();
        let record =
            parse_with_layout(&table(), "region=us%2Feast/dt=2018-08-30/hour=7", &layout, &utc())
                .unwrap();
        assert_eq!(record.name(), "region=us%2Feast/dt=2018-08-30/hour=7");
        let values: Vec<_> = record.keys().iter().map(|(_, v)| v.value.clone()).collect();
        assert_eq!(
            values,
            vec![
                Some(ScalarValue::Utf8("us/east".into())),
                Some(ScalarValue::Date(17_773)),
                Some(ScalarValue::Int64(7)),
            ]
        );
        assert_eq!(
            record.get(&layout.handles()[2]),
            Some(&NullableValue::of(Type::Integer, ScalarValue::Int64(7)))
        );
    }

    #[test]
    fn test_default_partition_is_null() {
        let record = parse_with_layout(
            &table(),
            "region=__HIVE_DEFAULT_PARTITION__/dt=2018-08-30/hour=0",
            &layout(),
            &utc(),
        )
        .unwrap();
        assert!(record.keys()[0].1.is_null());
    }

    #[test]
    fn test_wrong_component_count() {
        let err = parse_with_layout(&table(), "region=us/dt=2018-08-30", &layout(), &utc()).unwrap_err();
        assert!(matches!(err, HudiError::InvalidPartitionName { .. }));
    }

    #[test]
    fn test_keys_must_follow_column_order() {
        let err = parse_with_layout(&table(), "dt=2018-08-30/region=us/hour=1", &layout(), &utc())
            .unwrap_err();
        match err {
            HudiError::InvalidPartitionName { reason, .. } => {
                assert!(reason.contains("expected key 'region'"), "{}", reason)
            }
            other => panic!("unexpected error: {other}"),
        }
        // Key case is not significant.
        assert!(parse_with_layout(&table(), "REGION=us/dt=2018-08-30/Hour=1", &layout(), &utc()).is_ok());
    }

    #[test]
    fn test_undecodable_value() {
        let err = parse_with_layout(&table(), "region=us/dt=yesterday/hour=1", &layout(), &utc())
            .unwrap_err();
        match err {
            HudiError::InvalidPartitionValue { column, value, ty, .. } => {
                assert_eq!(column, "dt");
                assert_eq!(value, "yesterday");
                assert_eq!(ty, Type::Date);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_skipped_local_time_is_invalid() {
        let layout =
            PartitionLayout::resolve(&[Column::new("ts", HiveType::new("timestamp"))], &BuiltinTypeManager)
                .unwrap();
        let new_york: PartitionTimeZone = "America/New_York".parse().unwrap();
        assert!(parse_with_layout(&table(), "ts=2018-03-11 01:30:00", &layout, &new_york).is_ok());
        let err = parse_with_layout(&table(), "ts=2018-03-11 02:30:00", &layout, &new_york).unwrap_err();
        assert!(matches!(err, HudiError::InvalidPartitionValue { .. }), "{err}");
    }

    #[test]
    fn test_make_partition_name_parses_back() {
        let layout = layout();
        let values = vec![
            NullableValue::of(Type::Varchar(None), ScalarValue::Utf8("a=b".into())),
            NullableValue::as_null(Type::Date),
            NullableValue::of(Type::Integer, ScalarValue::Int64(23)),
        ];
        let name = make_partition_name(&layout, &values, &utc()).unwrap();
        assert_eq!(name, "region=a%3Db/dt=__HIVE_DEFAULT_PARTITION__/hour=23");
        let record = parse_with_layout(&table(), &name, &layout, &utc()).unwrap();
        let parsed: Vec<_> = record.keys().iter().map(|(_, v)| v.clone()).collect();
        assert_eq!(parsed, values);

        let wrong = vec![
            NullableValue::of(Type::Date, ScalarValue::Date(1)),
            NullableValue::as_null(Type::Date),
            NullableValue::as_null(Type::Integer),
        ];
        assert!(make_partition_name(&layout, &wrong, &utc()).is_err());
    }
}
