//! Upstream payload adapters.
//!
//! Each adapter turns one upstream shape into the same list of
//! [`DemandRecord`]s, so the aggregation only ever sees one input type.
//!
//! - [`ProtonEvent`] - Nested customer-order event (planned orders with demands)
//! - [`flat`] - Plain demand lists, as JSON array or CSV export
//! - [`headers`] - Transport headers of the produced message
//!
//! Vehicle attribute extraction also lives here: it is plain field
//! formatting and never touches the demand aggregation.

pub mod flat;
pub mod headers;

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::config::IngressConfig;
use crate::error::{PayloadError, PayloadResult};
use crate::models::{optional_text, text, DemandRecord, Passthrough, VehicleAttributes};

pub use flat::{parse_demand_csv, parse_demand_csv_file, parse_demand_json};
pub use headers::{build_headers, TransportHeaders};

// =============================================================================
// Event Shape
// =============================================================================

/// Nested customer-order event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtonEvent {
    pub actual_customer_order: ActualCustomerOrder,
    pub actual_customer_order_material: CustomerOrderMaterial,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualCustomerOrder {
    pub pima_data: PimaData,
    pub order_attributes: OrderAttributes,
    #[serde(deserialize_with = "text")]
    pub order_number: String,
    pub order_per_plant: Vec<OrderPerPlant>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PimaData {
    pub actual_order: ActualOrder,
    pub order_production: OrderProduction,
    pub pipeline_order_attributes: PipelineOrderAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActualOrder {
    #[serde(rename = "VIN10")]
    pub vin10: String,
    #[serde(rename = "VIN7")]
    pub vin7: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderProduction {
    pub build_time: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PipelineOrderAttributes {
    pub manufacturer_model_code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAttributes {
    /// Numeric status, sent either as number or numeric string.
    #[serde(deserialize_with = "text")]
    pub order_status: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPerPlant {
    pub planned_order: Vec<PlantPlannedOrder>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantPlannedOrder {
    pub planned_order_id: String,
    #[serde(default, deserialize_with = "optional_text")]
    pub header_material: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerOrderMaterial {
    pub planned_orders: Vec<PlannedOrder>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedOrder {
    pub planned_order_id: String,
    #[serde(default, deserialize_with = "optional_text")]
    pub plant_id: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub sap_plant_id: Option<String>,
    #[serde(default)]
    pub demands: Vec<Demand>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demand {
    pub material_number: String,
    pub quantity: u64,
    #[serde(default, deserialize_with = "optional_text")]
    pub reservation_number: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub reservation_item: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub item_category: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub pegged_requirement: Option<String>,
}

// =============================================================================
// Extraction
// =============================================================================

impl ProtonEvent {
    /// Read the event from a JSON value.
    pub fn from_value(value: Value) -> PayloadResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn planned_orders(&self) -> &[PlannedOrder] {
        &self.actual_customer_order_material.planned_orders
    }

    /// Header material of every planned order across all plants.
    pub fn header_materials(&self) -> HashMap<&str, Option<&str>> {
        self.actual_customer_order
            .order_per_plant
            .iter()
            .flat_map(|plant| plant.planned_order.iter())
            .map(|order| {
                (
                    order.planned_order_id.as_str(),
                    order.header_material.as_deref(),
                )
            })
            .collect()
    }

    /// Flatten all planned orders into demand records, in event order.
    ///
    /// Every record carries its planned order id and that order's header material.
    pub fn demand_records(&self) -> Vec<DemandRecord> {
        let header_materials = self.header_materials();

        self.planned_orders()
            .iter()
            .flat_map(|order| {
                let header_material = header_materials
                    .get(order.planned_order_id.as_str())
                    .copied()
                    .flatten()
                    .map(str::to_string);

                order.demands.iter().map(move |demand| {
                    DemandRecord::new(
                        demand.material_number.clone(),
                        demand.quantity,
                        order.planned_order_id.clone(),
                    )
                    .with_passthrough(Passthrough {
                        reservation_number: demand.reservation_number.clone(),
                        reservation_item: demand.reservation_item.clone(),
                        item_category: demand.item_category.clone(),
                        pegged_requirement: demand.pegged_requirement.clone(),
                        material_group_top_level: header_material.clone(),
                    })
                })
            })
            .collect()
    }

    /// First planned order with the vehicle-order prefix.
    pub fn first_vehicle_order(&self, prefix: &str) -> Option<&PlannedOrder> {
        self.planned_orders()
            .iter()
            .find(|order| order.planned_order_id.starts_with(prefix))
    }

    /// Vehicle-level attributes of the document root.
    pub fn vehicle_attributes(&self, config: &IngressConfig) -> PayloadResult<VehicleAttributes> {
        let order = &self.actual_customer_order;
        let pima = &order.pima_data;

        let build_time = parse_build_time(&pima.order_production.build_time)?;
        let raw_status: i64 = order.order_attributes.order_status.trim().parse().map_err(|_| {
            PayloadError::InvalidField {
                field: "orderStatus".to_string(),
                message: format!("'{}' is not numeric", order.order_attributes.order_status),
            }
        })?;

        let vehicle_order = self.first_vehicle_order(&config.vehicle_order_prefix);

        Ok(VehicleAttributes {
            vin: format!("{}{}", pima.actual_order.vin10, pima.actual_order.vin7),
            build_date: build_time.format("%Y%m%d").to_string(),
            build_time: build_time.format("%H%M%S").to_string(),
            model_code: pima.pipeline_order_attributes.manufacturer_model_code.clone(),
            build_status: config.build_status(raw_status),
            order_number: order.order_number.clone(),
            plant_code: vehicle_order
                .and_then(|o| o.plant_id.as_deref())
                .map(|plant| config.plant_code(plant)),
            sap_plant_code: vehicle_order.and_then(|o| o.sap_plant_id.clone()),
        })
    }
}

/// Parse the local date and time part of a build timestamp.
///
/// Offsets and fractional seconds after the first 19 characters are ignored:
/// the published date and time are the plant-local wall clock.
fn parse_build_time(value: &str) -> PayloadResult<NaiveDateTime> {
    let invalid = || PayloadError::InvalidField {
        field: "BuildTime".to_string(),
        message: format!("'{}' is not a timestamp", value),
    };

    let head = value.get(..19).ok_or_else(invalid)?;
    NaiveDateTime::parse_from_str(head, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(head, "%Y-%m-%d %H:%M:%S"))
        .map_err(|_| invalid())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn sample_event() -> Value {
        json!({
            "actualCustomerOrder": {
                "pimaData": {
                    "ActualOrder": { "VIN10": "WBA1234567", "VIN7": "AB12345" },
                    "OrderProduction": { "BuildTime": "2024-03-15T08:09:10.000+01:00" },
                    "PipelineOrderAttributes": { "ManufacturerModelCode": "31AK" }
                },
                "orderAttributes": { "orderStatus": "5500" },
                "orderNumber": "0001234567",
                "orderPerPlant": [
                    { "plannedOrder": [
                        { "plannedOrderId": "VH_0001", "headerMaterial": "HM-VEH" },
                        { "plannedOrderId": "KA_0001", "headerMaterial": "HM-BODY" }
                    ]}
                ]
            },
            "actualCustomerOrderMaterial": {
                "plannedOrders": [
                    {
                        "plannedOrderId": "KA_0001",
                        "plantId": "0720",
                        "sapPlantId": "S720",
                        "demands": [
                            { "materialNumber": "999999901", "quantity": 9 }
                        ]
                    },
                    {
                        "plannedOrderId": "VH_0001",
                        "plantId": "0710",
                        "sapPlantId": "S710",
                        "demands": [
                            { "materialNumber": "123456701", "quantity": 2, "reservationNumber": 4711 },
                            { "materialNumber": "123456701", "quantity": 3 },
                            { "materialNumber": "123456701B", "quantity": 1 },
                            { "materialNumber": "765432102", "quantity": 4, "itemCategory": "L" }
                        ]
                    }
                ]
            }
        })
    }

    #[test]
    fn test_demand_records_flatten_orders() {
        let event = ProtonEvent::from_value(sample_event()).unwrap();
        let records = event.demand_records();

        assert_eq!(records.len(), 5);
        assert_eq!(records[0].planned_order_id, "KA_0001");
        assert_eq!(records[0].passthrough.material_group_top_level.as_deref(), Some("HM-BODY"));
        assert_eq!(records[1].planned_order_id, "VH_0001");
        assert_eq!(records[1].passthrough.reservation_number.as_deref(), Some("4711"));
        assert_eq!(records[1].passthrough.material_group_top_level.as_deref(), Some("HM-VEH"));
        assert_eq!(records[4].passthrough.item_category.as_deref(), Some("L"));
    }

    #[test]
    fn test_vehicle_attributes() {
        let event = ProtonEvent::from_value(sample_event()).unwrap();
        let attrs = event.vehicle_attributes(&IngressConfig::default()).unwrap();

        assert_eq!(attrs.vin, "WBA1234567AB12345");
        assert_eq!(attrs.build_date, "20240315");
        assert_eq!(attrs.build_time, "080910");
        assert_eq!(attrs.model_code, "31AK");
        assert_eq!(attrs.build_status, 6000);
        assert_eq!(attrs.order_number, "0001234567");
        assert_eq!(attrs.plant_code.as_deref(), Some("0710"));
        assert_eq!(attrs.sap_plant_code.as_deref(), Some("S710"));
    }

    #[test]
    fn test_plant_code_lookup() {
        let event = ProtonEvent::from_value(sample_event()).unwrap();
        let mut config = IngressConfig::default();
        config.plant_codes.insert("0710".into(), "DGF".into());

        let attrs = event.vehicle_attributes(&config).unwrap();
        assert_eq!(attrs.plant_code.as_deref(), Some("DGF"));
    }

    #[test]
    fn test_no_vehicle_order_leaves_plant_empty() {
        let mut value = sample_event();
        value["actualCustomerOrderMaterial"]["plannedOrders"] = json!([]);
        let event = ProtonEvent::from_value(value).unwrap();

        let attrs = event.vehicle_attributes(&IngressConfig::default()).unwrap();
        assert!(attrs.plant_code.is_none());
        assert!(attrs.sap_plant_code.is_none());
    }

    #[test]
    fn test_invalid_build_time() {
        let mut value = sample_event();
        value["actualCustomerOrder"]["pimaData"]["OrderProduction"]["BuildTime"] = json!("yesterday");
        let event = ProtonEvent::from_value(value).unwrap();

        let err = event.vehicle_attributes(&IngressConfig::default()).unwrap_err();
        assert!(err.to_string().contains("BuildTime"));
    }

    #[test]
    fn test_non_numeric_status() {
        let mut value = sample_event();
        value["actualCustomerOrder"]["orderAttributes"]["orderStatus"] = json!("open");
        let event = ProtonEvent::from_value(value).unwrap();

        let err = event.vehicle_attributes(&IngressConfig::default()).unwrap_err();
        assert!(err.to_string().contains("orderStatus"));
    }

    #[test]
    fn test_missing_field_is_shape_error() {
        let mut value = sample_event();
        value["actualCustomerOrder"]
            .as_object_mut()
            .unwrap()
            .remove("orderNumber");

        let err = ProtonEvent::from_value(value).unwrap_err();
        assert!(matches!(err, PayloadError::Shape(_)));
        assert!(err.to_string().contains("orderNumber"));
    }
}
