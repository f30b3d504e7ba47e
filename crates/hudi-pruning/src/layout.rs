//! Resolved partition columns of one table.
//!
//! The store-directed predicate and the identifier parser must see the partition
//! columns in the same order with the same types. Both take a [`PartitionLayout`],
//! which is resolved once per call from the table's partition columns.

use hudi_core::column::{Column, HudiColumnHandle};
use hudi_core::types::{Type, TypeManager};
use hudi_core::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct PartitionLayout {
    columns: Vec<Column>,
    handles: Vec<HudiColumnHandle>,
    types: Vec<Type>,
}

impl PartitionLayout {
    pub fn resolve(partition_columns: &[Column], type_manager: &dyn TypeManager) -> Result<Self> {
        let handles = HudiColumnHandle::from_partition_columns(partition_columns);
        let types = handles
            .iter()
            .map(|h| h.get_type(type_manager))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            columns: partition_columns.to_vec(),
            handles,
            types,
        })
    }

    pub fn handles(&self) -> &[HudiColumnHandle] {
        &self.handles
    }

    pub fn types(&self) -> &[Type] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// `(metastore column, handle, type)` per partition column, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&Column, &HudiColumnHandle, &Type)> {
        self.columns
            .iter()
            .zip(self.handles.iter())
            .zip(self.types.iter())
            .map(|((c, h), t)| (c, h, t))
    }
}
