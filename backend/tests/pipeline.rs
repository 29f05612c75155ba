//! End-to-end and property tests for the vehicle document pipeline.

use serde_json::Value;
use std::collections::HashSet;
use vehicle_ingress::{
    aggregate, process_bytes, process_event, reduce_steps, AssemblyError, DemandRecord,
    IngressOptions, PipelineError,
};

const EVENT: &str = include_str!("fixtures/vehicle_event.json");
const EXPECTED_DOCUMENT: &str = include_str!("fixtures/vehicle_document.json");

fn options() -> IngressOptions {
    IngressOptions {
        tracking: Some("it-tracking".into()),
        ..IngressOptions::default()
    }
}

fn vehicle_records() -> Vec<DemandRecord> {
    vec![
        DemandRecord::new("742185401", 4, "VH_1000"),
        DemandRecord::new("903311712", 1, "VH_1000"),
        DemandRecord::new("742185401", 2, "VH_1001"),
        DemandRecord::new("742185401-V2", 3, "VH_1000"),
        DemandRecord::new("560000100", 7, "VH_1001"),
        DemandRecord::new("903311712", 5, "VH_1001"),
        DemandRecord::new("742185401", 1, "KA_3000"),
    ]
}

#[test]
fn event_produces_expected_document() {
    let output = process_bytes(EVENT.as_bytes(), &options()).unwrap();

    let actual = serde_json::to_value(&output.documents[0]).unwrap();
    let expected: Value = serde_json::from_str(EXPECTED_DOCUMENT).unwrap();
    assert_eq!(actual, expected);
}

#[test]
fn event_headers() {
    let output = process_bytes(EVENT.as_bytes(), &options()).unwrap();

    assert_eq!(output.headers["BMW-DVF-Contract-ID"], "PRIW");
    assert_eq!(output.headers["BMW-DVF-Source-System"], "protonOxf");
    assert_eq!(output.headers["BMW-DVF-Source-Tracking-String"], "it-tracking");
}

#[test]
fn output_is_byte_identical_across_runs() {
    let event: Value = serde_json::from_str(EVENT).unwrap();

    let first = process_event(Some(&event), &options()).unwrap();
    let second = process_event(Some(&event), &options()).unwrap();

    assert_eq!(
        serde_json::to_string(&first.documents).unwrap(),
        serde_json::to_string(&second.documents).unwrap()
    );
}

#[test]
fn quantities_are_conserved() {
    let records = vehicle_records();
    let nodes = aggregate(&records).unwrap();

    let input: u64 = records.iter().map(|r| r.quantity).sum();
    let output: u64 = nodes.iter().map(|n| n.quantity()).sum();
    assert_eq!(input, output);

    for node in &nodes {
        let steps: u64 = node.relationship_children.iter().map(|s| s.quantity()).sum();
        assert_eq!(steps, node.quantity());
    }
}

#[test]
fn material_keys_are_unique() {
    let nodes = aggregate(&vehicle_records()).unwrap();

    let keys: HashSet<_> = nodes.iter().map(|n| n.key().clone()).collect();
    assert_eq!(keys.len(), nodes.len());
    assert_eq!(nodes.len(), 3);
}

#[test]
fn step_quantity_independent_of_record_order() {
    let records = vec![
        DemandRecord::new("742185401", 4, "VH_1000"),
        DemandRecord::new("742185401", 2, "VH_1001"),
        DemandRecord::new("742185401", 9, "KA_3000"),
        DemandRecord::new("742185401", 1, "VH_1002"),
    ];

    let mut refs: Vec<&DemandRecord> = records.iter().collect();
    let mut totals = Vec::new();
    for _ in 0..refs.len() {
        let steps = reduce_steps(&refs).unwrap();
        let vh = steps.iter().find(|s| s.step() == "VH").unwrap().quantity();
        let ka = steps.iter().find(|s| s.step() == "KA").unwrap().quantity();
        totals.push((vh, ka));
        refs.rotate_left(1);
    }
    refs.reverse();
    let steps = reduce_steps(&refs).unwrap();
    totals.push((
        steps.iter().find(|s| s.step() == "VH").unwrap().quantity(),
        steps.iter().find(|s| s.step() == "KA").unwrap().quantity(),
    ));

    assert!(totals.iter().all(|&t| t == (7, 9)));
}

#[test]
fn steps_unique_within_a_group() {
    let records = vehicle_records();
    let refs: Vec<&DemandRecord> = records
        .iter()
        .filter(|r| r.material_number == "742185401")
        .collect();

    let steps = reduce_steps(&refs).unwrap();
    let codes: HashSet<&str> = steps.iter().map(|s| s.step()).collect();
    assert_eq!(codes.len(), steps.len());
}

#[test]
fn short_material_number_is_malformed() {
    let records = vec![DemandRecord::new("74218", 1, "VH_1000")];

    let err = aggregate(&records).unwrap_err();
    assert!(matches!(err, AssemblyError::MalformedRecord { .. }));
}

#[test]
fn event_without_vehicle_demands_has_no_children() {
    let mut event: Value = serde_json::from_str(EVENT).unwrap();
    for order in event["actualCustomerOrderMaterial"]["plannedOrders"]
        .as_array_mut()
        .unwrap()
    {
        if order["plannedOrderId"].as_str().unwrap().starts_with("VH_") {
            order["demands"] = Value::Array(vec![]);
        }
    }

    let output = process_event(Some(&event), &options()).unwrap();
    let doc = serde_json::to_value(&output.documents[0]).unwrap();
    assert_eq!(doc["children"], Value::Array(vec![]));
}

#[test]
fn missing_payload_is_empty_payload() {
    let err = process_event(None, &options()).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Assembly(AssemblyError::EmptyPayload)
    ));
}
