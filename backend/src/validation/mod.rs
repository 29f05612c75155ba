//! JSON Schema validation for produced vehicle documents.
//!
//! The schema is embedded at compile time from
//! `schemas/vehicle-document.json` (JSON Schema Draft 7) and checks the
//! wire shape: node `type` discriminators, key formats, and integer
//! quantities.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use vehicle_ingress::validate_vehicle_document;
//!
//! let doc = json!({
//!     "type": "vehicle",
//!     "attributes": { "Vin": "WBA1234567AB12345", "buildDate": "20240315",
//!                     "buildTime": "080910", "modelCode": "31AK",
//!                     "buildStatus": 6000, "orderNumber": "0001234567" },
//!     "children": []
//! });
//! assert!(validate_vehicle_document(&doc).is_ok());
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

static VEHICLE_DOCUMENT_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/vehicle-document.json"))
        .expect("Invalid embedded schema")
});

/// Validate a JSON value against a JSON schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with one message per violation
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator =
        jsonschema::draft7::new(schema).map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick true/false check against a schema.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate against the embedded vehicle document schema.
pub fn validate_vehicle_document(data: &Value) -> Result<(), Vec<String>> {
    validate(&VEHICLE_DOCUMENT_SCHEMA, data)
}

/// Quick check against the vehicle document schema.
pub fn is_valid_vehicle_document(data: &Value) -> bool {
    is_valid(&VEHICLE_DOCUMENT_SCHEMA, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DemandRecord, VehicleAttributes};
    use crate::transform::aggregate::assemble_document;
    use serde_json::json;

    fn attributes() -> VehicleAttributes {
        VehicleAttributes {
            vin: "WBA1234567AB12345".into(),
            build_date: "20240315".into(),
            build_time: "080910".into(),
            model_code: "31AK".into(),
            build_status: 6000,
            order_number: "0001234567".into(),
            plant_code: Some("0710".into()),
            sap_plant_code: None,
        }
    }

    #[test]
    fn test_assembled_document_is_valid() {
        let records = vec![
            DemandRecord::new("123456701", 2, "VH_0001"),
            DemandRecord::new("123456701B", 1, "VH_0001"),
        ];
        let doc = assemble_document(attributes(), &records, "VH_").unwrap();
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(validate_vehicle_document(&value), Ok(()));
    }

    #[test]
    fn test_empty_children_valid() {
        let doc = assemble_document(attributes(), &[], "VH_").unwrap();
        assert!(is_valid_vehicle_document(&serde_json::to_value(&doc).unwrap()));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let mut value = serde_json::to_value(assemble_document(attributes(), &[], "VH_").unwrap())
            .unwrap();
        value["type"] = json!("truck");

        let errors = validate_vehicle_document(&value).unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_bad_change_index_rejected() {
        let mut value = serde_json::to_value(
            assemble_document(attributes(), &[DemandRecord::new("123456701", 1, "VH_1")], "VH_")
                .unwrap(),
        )
        .unwrap();
        value["children"][0]["attributes"]["changeIndex"] = json!("01");

        assert!(!is_valid_vehicle_document(&value));
    }
}
