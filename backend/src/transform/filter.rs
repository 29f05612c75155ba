//! Selection of vehicle-level demand records.
//!
//! Only demands of planned orders whose id carries the vehicle-order prefix
//! (`VH_` by default) take part in the material aggregation.

use crate::models::DemandRecord;

/// Default prefix marking vehicle-level planned orders.
pub const DEFAULT_VEHICLE_ORDER_PREFIX: &str = "VH_";

/// Keep the records whose planned order id starts with `prefix`, in input order.
pub fn vehicle_level_records<'a>(records: &'a [DemandRecord], prefix: &str) -> Vec<&'a DemandRecord> {
    records
        .iter()
        .filter(|record| record.planned_order_id.starts_with(prefix))
        .collect()
}
