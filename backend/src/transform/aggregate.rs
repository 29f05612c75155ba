//! Aggregation of material groups into material change index nodes.
//!
//! ```text
//! MaterialGroup ──▶ reduce_steps ──▶ [ProductionStepNode]  ┐
//!       │                                                  ├──▶ merge ──▶ [MaterialChangeIndexNode]
//!       └────────▶ derive_key ───▶ (partNumber, changeIndex)┘
//! ```
//!
//! Steps are deduplicated within a group only. When two groups collide on the
//! same derived key, the second group's step nodes are appended to the
//! existing node as they are, even if step codes repeat.

use std::collections::HashMap;

use thiserror::Error;

use super::filter::vehicle_level_records;
use super::grouper::{group_by_material, MaterialGroup};
use crate::error::{AssemblyError, AssemblyResult};
use crate::models::{
    DemandRecord, MaterialChangeIndexNode, MaterialKey, ProductionStepNode, VehicleAttributes,
    VehicleDocument,
};

const PART_NUMBER_LEN: usize = 7;
const CHANGE_INDEX_LEN: usize = 2;
const QUANTITY_OVERFLOW: &str = "quantity overflow";

/// Why a material number cannot be split into a [`MaterialKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("material number has {0} characters, at least 9 are required")]
    TooShort(usize),

    #[error("change index '{0}' is not a two-digit number")]
    NonNumericChangeIndex(String),
}

/// Split a material number into part number (7 chars) and change index (next 2 digits).
///
/// Characters past the ninth are variant suffixes and are ignored.
pub fn derive_key(material_number: &str) -> Result<MaterialKey, KeyError> {
    let chars: Vec<char> = material_number.chars().collect();
    if chars.len() < PART_NUMBER_LEN + CHANGE_INDEX_LEN {
        return Err(KeyError::TooShort(chars.len()));
    }

    let part_number: String = chars[..PART_NUMBER_LEN].iter().collect();
    let index_chars = &chars[PART_NUMBER_LEN..PART_NUMBER_LEN + CHANGE_INDEX_LEN];

    let mut change_index = 0u32;
    for c in index_chars {
        match c.to_digit(10) {
            Some(digit) => change_index = change_index * 10 + digit,
            None => {
                return Err(KeyError::NonNumericChangeIndex(index_chars.iter().collect()));
            }
        }
    }

    Ok(MaterialKey {
        part_number,
        change_index,
    })
}

/// Collapse a group's records into one node per production step.
///
/// Nodes keep first-seen order; passthrough fields come from the first record of a step.
/// Returns `None` when a step quantity exceeds `u64::MAX`.
pub fn reduce_steps(records: &[&DemandRecord]) -> Option<Vec<ProductionStepNode>> {
    let mut steps: Vec<ProductionStepNode> = Vec::new();

    for record in records {
        let step = record.production_step();
        match steps.iter_mut().find(|node| node.step() == step) {
            Some(node) => {
                let quantity = &mut node.relationship_attributes.quantity;
                *quantity = quantity.checked_add(record.quantity)?;
            }
            None => steps.push(ProductionStepNode::from_record(record)),
        }
    }

    Some(steps)
}

/// Accumulates material change index nodes, merging groups that share a key.
#[derive(Debug, Default)]
pub struct MaterialAggregator {
    nodes: Vec<MaterialChangeIndexNode>,
    positions: HashMap<MaterialKey, usize>,
}

impl MaterialAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reduce one material group and fold it into the output list.
    pub fn add_group(&mut self, group: &MaterialGroup<'_>) -> AssemblyResult<()> {
        let malformed = |reason: String| AssemblyError::MalformedRecord {
            index: group.first_index,
            material_number: group.material_number.to_string(),
            planned_order_id: group
                .records
                .first()
                .map(|record| record.planned_order_id.clone())
                .unwrap_or_default(),
            reason,
        };
        let overflow = || malformed(QUANTITY_OVERFLOW.to_string());

        let key = derive_key(group.material_number).map_err(|e| malformed(e.to_string()))?;
        let steps = reduce_steps(&group.records).ok_or_else(overflow)?;
        let quantity = group.total_quantity().ok_or_else(overflow)?;
        self.merge(key, quantity, steps).ok_or_else(overflow)
    }

    /// Fold a reduced group into the node for `key`. Leaves the node untouched
    /// and returns `None` when its quantity would overflow.
    fn merge(
        &mut self,
        key: MaterialKey,
        quantity: u64,
        steps: Vec<ProductionStepNode>,
    ) -> Option<()> {
        match self.positions.get(&key) {
            Some(&pos) => {
                let node = &mut self.nodes[pos];
                let total = node.relationship_attributes.quantity.checked_add(quantity)?;
                node.relationship_attributes.quantity = total;
                node.relationship_children.extend(steps);
            }
            None => {
                self.positions.insert(key.clone(), self.nodes.len());
                self.nodes.push(MaterialChangeIndexNode::new(key, quantity, steps));
            }
        }
        Some(())
    }

    pub fn finish(self) -> Vec<MaterialChangeIndexNode> {
        self.nodes
    }
}

/// Group, reduce and merge already filtered records.
pub fn aggregate<'a, I>(records: I) -> AssemblyResult<Vec<MaterialChangeIndexNode>>
where
    I: IntoIterator<Item = &'a DemandRecord>,
{
    let mut aggregator = MaterialAggregator::new();
    for group in group_by_material(records) {
        aggregator.add_group(&group)?;
    }
    Ok(aggregator.finish())
}

/// Build the vehicle document from the full demand list of an event.
///
/// Records outside the vehicle-level planned orders (`order_prefix`) are ignored.
pub fn assemble_document(
    attributes: VehicleAttributes,
    records: &[DemandRecord],
    order_prefix: &str,
) -> AssemblyResult<VehicleDocument> {
    let filtered = vehicle_level_records(records, order_prefix);
    let children = aggregate(filtered)?;
    Ok(VehicleDocument::new(attributes, children))
}
