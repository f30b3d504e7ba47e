//! # Predicate Splitting
//!
//! Builds the predicate handed to the metastore from the engine's full predicate.
//!
//! The full predicate is keyed by [`HudiColumnHandle`] and may constrain any
//! column, partition key or not. The metastore only understands partition columns
//! and wants every one of them. [`build_partition_predicate`] therefore walks the
//! table's partition columns in order and emits exactly one domain per column:
//!
//! - the column's domain from the full predicate, when it has one;
//! - otherwise an unconstrained domain of the column's type. Whether that domain
//!   admits null follows the column's nullability.
//!
//! Constraints on data columns are not sent to the metastore at all.

use hudi_core::column::HudiColumnHandle;
use hudi_core::domain::{Domain, TupleDomain};
use hudi_core::metastore::PartitionPredicate;
use hudi_core::types::Type;
use hudi_core::{HudiError, Result};
use tracing::trace;

use crate::layout::PartitionLayout;

/// Domain allowing every value a column can hold.
pub fn unconstrained_domain(handle: &HudiColumnHandle, ty: Type) -> Domain {
    if handle.nullable {
        Domain::all(ty)
    } else {
        Domain::not_null(ty)
    }
}

/// Store-directed predicate for `constraint`, one entry per partition column in
/// layout order.
///
/// A "no rows" constraint yields a "none" domain for every column. A domain whose
/// type differs from the column type is a [`HudiError::TypeMismatch`].
pub fn build_partition_predicate(
    constraint: &TupleDomain<HudiColumnHandle>,
    layout: &PartitionLayout,
) -> Result<PartitionPredicate> {
    let entries = layout
        .iter()
        .map(|(column, handle, ty)| {
            let domain = if constraint.is_none() {
                Domain::none(*ty)
            } else {
                match constraint.domain(handle) {
                    Some(domain) if domain.ty() != ty => {
                        return Err(HudiError::type_mismatch(
                            format!("{} domain for partition column {}", ty, handle.name),
                            domain.ty(),
                        ));
                    }
                    Some(domain) => domain.clone(),
                    None => unconstrained_domain(handle, *ty),
                }
            };
            trace!(column = %column.name, domain = %domain, "partition column domain");
            Ok((column.clone(), domain))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(PartitionPredicate::new(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hudi_core::column::{Column, HiveType, SchemaTableName, Table};
    use hudi_core::domain::{Range, SortedRangeSet};
    use hudi_core::types::BuiltinTypeManager;
    use hudi_core::value::ScalarValue;

    fn table() -> Table {
        Table::new(
            SchemaTableName::new("default", "stock_ticks_cow"),
            vec![Column::new("symbol", HiveType::new("string"))],
            vec![
                Column::new("dt", HiveType::new("string")),
                Column::new("hour", HiveType::new("int")).not_null(),
            ],
        )
    }

    fn layout(table: &Table) -> PartitionLayout {
        PartitionLayout::resolve(&table.partition_columns, &BuiltinTypeManager).unwrap()
    }

    fn string(v: &str) -> ScalarValue {
        ScalarValue::Utf8(v.to_string())
    }

    #[test]
    fn test_one_entry_per_partition_column() {
        let table = table();
        let dt = table.column_handle("dt").unwrap();
        let symbol = table.column_handle("symbol").unwrap();
        let dt_domain = Domain::create(
            SortedRangeSet::of_ranges(
                Type::Varchar(None),
                vec![Range::greater_than_or_equal(string("2018-08-30"))],
            )
            .unwrap(),
            false,
        );
        let constraint = TupleDomain::with_column_domains(vec![
            (symbol, Domain::single_value(Type::Varchar(None), string("GOOG")).unwrap()),
            (dt, dt_domain.clone()),
        ]);

        let predicate = build_partition_predicate(&constraint, &layout(&table)).unwrap();
        let columns: Vec<_> = predicate.columns().map(|c| c.name.as_str()).collect();
        assert_eq!(columns, vec!["dt", "hour"]);
        assert_eq!(predicate.get(&table.partition_columns[0]), Some(&dt_domain));
        // hour is declared not null, so its default domain excludes null.
        assert_eq!(
            predicate.get(&table.partition_columns[1]),
            Some(&Domain::not_null(Type::Integer))
        );
    }

    #[test]
    fn test_all_constraint_leaves_columns_unconstrained() {
        let table = table();
        let predicate = build_partition_predicate(&TupleDomain::all(), &layout(&table)).unwrap();
        assert_eq!(predicate.len(), 2);
        assert!(predicate.entries()[0].1.is_all());
        assert!(!predicate.entries()[1].1.is_null_allowed());
    }

    #[test]
    fn test_none_constraint_maps_to_none_domains() {
        let table = table();
        let predicate = build_partition_predicate(&TupleDomain::none(), &layout(&table)).unwrap();
        assert!(predicate.iter().all(|(_, d)| d.is_none()));
    }

    #[test]
    fn test_domain_type_must_match_column() {
        let table = table();
        let hour = table.column_handle("hour").unwrap();
        let constraint = TupleDomain::with_column_domains(vec![(
            hour,
            Domain::single_value(Type::BigInt, ScalarValue::Int64(3)).unwrap(),
        )]);
        let err = build_partition_predicate(&constraint, &layout(&table)).unwrap_err();
        assert!(matches!(err, HudiError::TypeMismatch { .. }));
    }
}
