//! Partition demand records by raw material number.
//!
//! # Architecture
//!
//! ```text
//! Filtered records                   →  Material groups
//! ┌──────────────────────────────┐      ┌────────────────────────────┐
//! │ 123456701   VH_0001   qty 2  │      │ 123456701: [qty 2, qty 3]  │
//! │ 123456701A  VH_0001   qty 1  │  →   ├────────────────────────────┤
//! │ 123456701   VH_0002   qty 3  │      │ 123456701A: [qty 1]        │
//! └──────────────────────────────┘      └────────────────────────────┘
//! ```
//!
//! Grouping is by the exact string. `123456701` and `123456701A` derive the
//! same material key but stay separate here; they are merged by the
//! aggregator.

use std::collections::HashMap;

use crate::models::DemandRecord;

/// Records sharing one exact material number, in input order.
#[derive(Debug, Clone)]
pub struct MaterialGroup<'a> {
    pub material_number: &'a str,
    /// Position of the group's first record in the grouped input.
    pub first_index: usize,
    pub records: Vec<&'a DemandRecord>,
}

impl MaterialGroup<'_> {
    /// Sum of the quantities of all records in the group, `None` on overflow.
    pub fn total_quantity(&self) -> Option<u64> {
        self.records
            .iter()
            .try_fold(0u64, |total, record| total.checked_add(record.quantity))
    }
}

/// Group records by material number, keeping first-occurrence order of groups
/// and of records within each group.
pub fn group_by_material<'a, I>(records: I) -> Vec<MaterialGroup<'a>>
where
    I: IntoIterator<Item = &'a DemandRecord>,
{
    let mut groups: Vec<MaterialGroup<'a>> = Vec::new();
    let mut positions: HashMap<&'a str, usize> = HashMap::new();

    for (index, record) in records.into_iter().enumerate() {
        let material_number = record.material_number.as_str();
        match positions.get(material_number) {
            Some(&pos) => groups[pos].records.push(record),
            None => {
                positions.insert(material_number, groups.len());
                groups.push(MaterialGroup {
                    material_number,
                    first_index: index,
                    records: vec![record],
                });
            }
        }
    }

    groups
}
