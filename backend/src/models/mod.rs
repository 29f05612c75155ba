//! Domain models for the vehicle ingress pipeline.
//!
//! This module contains the data structures that flow through the core:
//!
//! - [`DemandRecord`] - One demand line linking a material quantity to a planned order
//! - [`Passthrough`] - Provenance fields carried verbatim into the output
//! - [`ProductionStepNode`] - Quantity of a material consumed by one production step
//! - [`MaterialChangeIndexNode`] - A part revision with its production steps
//! - [`VehicleDocument`] - The output root
//!
//! The serde representation of the node types *is* the wire format of the
//! produced document, including the `"type"` discriminator of each level.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// =============================================================================
// Input
// =============================================================================

/// Provenance attributes of a demand record.
///
/// Never interpreted by the aggregation; copied from the first record of a
/// production step into that step's `relationshipAttributes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passthrough {
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub reservation_number: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub reservation_item: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub item_category: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub pegged_requirement: Option<String>,
    /// Header material of the planned order. Emitted as `null` when unknown.
    #[serde(default, deserialize_with = "optional_text")]
    pub material_group_top_level: Option<String>,
}

/// A single demand line of a vehicle production event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandRecord {
    /// At least 9 characters: 7 for the part number, 2 for the change index.
    pub material_number: String,
    pub quantity: u64,
    /// First two characters name the production step.
    pub planned_order_id: String,
    #[serde(flatten)]
    pub passthrough: Passthrough,
}

impl DemandRecord {
    pub fn new(
        material_number: impl Into<String>,
        quantity: u64,
        planned_order_id: impl Into<String>,
    ) -> Self {
        Self {
            material_number: material_number.into(),
            quantity,
            planned_order_id: planned_order_id.into(),
            passthrough: Passthrough::default(),
        }
    }

    pub fn with_passthrough(mut self, passthrough: Passthrough) -> Self {
        self.passthrough = passthrough;
        self
    }

    /// Production step code: the first two characters of the planned order id.
    ///
    /// Shorter ids yield the whole id.
    pub fn production_step(&self) -> &str {
        match self.planned_order_id.char_indices().nth(2) {
            Some((end, _)) => &self.planned_order_id[..end],
            None => &self.planned_order_id,
        }
    }
}

/// Accept strings and numbers for identifier-like fields.
///
/// Upstream systems send reservation numbers, plant ids and order statuses
/// either way; numbers are kept in their JSON spelling.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

/// [`text`] for optional fields; `null` is `None`.
pub(crate) fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

// =============================================================================
// Production Step
// =============================================================================

/// `attributes` of a production step node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionStep {
    pub production_step: String,
}

/// `relationshipAttributes` of a production step node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepAttributes {
    pub quantity: u64,
    pub planned_order_number: String,
    #[serde(flatten)]
    pub passthrough: Passthrough,
}

/// Quantity of one material consumed by one production step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "vehicleProductionStep", rename_all = "camelCase")]
pub struct ProductionStepNode {
    pub attributes: ProductionStep,
    pub relationship_attributes: StepAttributes,
}

impl ProductionStepNode {
    /// Seed a node from the first record observed for its step.
    pub fn from_record(record: &DemandRecord) -> Self {
        Self {
            attributes: ProductionStep {
                production_step: record.production_step().to_string(),
            },
            relationship_attributes: StepAttributes {
                quantity: record.quantity,
                planned_order_number: record.planned_order_id.clone(),
                passthrough: record.passthrough.clone(),
            },
        }
    }

    pub fn step(&self) -> &str {
        &self.attributes.production_step
    }

    pub fn quantity(&self) -> u64 {
        self.relationship_attributes.quantity
    }
}

// =============================================================================
// Material Change Index
// =============================================================================

/// Normalized part revision identity: `(partNumber, changeIndex)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialKey {
    pub part_number: String,
    pub change_index: u32,
}

/// `relationshipAttributes` of a material change index node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialQuantity {
    pub quantity: u64,
}

/// A part revision together with the production steps consuming it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "materialChangeIndex", rename_all = "camelCase")]
pub struct MaterialChangeIndexNode {
    pub attributes: MaterialKey,
    pub relationship_attributes: MaterialQuantity,
    pub relationship_children: Vec<ProductionStepNode>,
}

impl MaterialChangeIndexNode {
    pub fn new(key: MaterialKey, quantity: u64, children: Vec<ProductionStepNode>) -> Self {
        Self {
            attributes: key,
            relationship_attributes: MaterialQuantity { quantity },
            relationship_children: children,
        }
    }

    pub fn key(&self) -> &MaterialKey {
        &self.attributes
    }

    pub fn quantity(&self) -> u64 {
        self.relationship_attributes.quantity
    }
}

// =============================================================================
// Vehicle
// =============================================================================

/// Vehicle-level attributes resolved by the payload adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleAttributes {
    #[serde(rename = "Vin")]
    pub vin: String,
    /// `YYYYMMDD`
    #[serde(rename = "buildDate")]
    pub build_date: String,
    /// `HHMMSS`
    #[serde(rename = "buildTime")]
    pub build_time: String,
    #[serde(rename = "modelCode")]
    pub model_code: String,
    #[serde(rename = "buildStatus")]
    pub build_status: i64,
    #[serde(rename = "orderNumber")]
    pub order_number: String,
    #[serde(rename = "plantCode")]
    pub plant_code: Option<String>,
    #[serde(rename = "SapPlantCode")]
    pub sap_plant_code: Option<String>,
}

/// Output root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "vehicle")]
pub struct VehicleDocument {
    pub attributes: VehicleAttributes,
    pub children: Vec<MaterialChangeIndexNode>,
}

impl VehicleDocument {
    pub fn new(attributes: VehicleAttributes, children: Vec<MaterialChangeIndexNode>) -> Self {
        Self {
            attributes,
            children,
        }
    }

    /// Sum of quantities over all material change index nodes, saturating at `u64::MAX`.
    pub fn total_quantity(&self) -> u64 {
        self.children
            .iter()
            .map(MaterialChangeIndexNode::quantity)
            .fold(0, u64::saturating_add)
    }

    /// Number of production step nodes across all materials.
    pub fn step_count(&self) -> usize {
        self.children
            .iter()
            .map(|mci| mci.relationship_children.len())
            .sum()
    }
}
