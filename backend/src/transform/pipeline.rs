//! High-level pipeline API: upstream event in, headers and vehicle document out.
//!
//! Combines all steps: payload adapter, attribute extraction, aggregation,
//! schema validation, and header construction.
//!
//! # Example
//!
//! ```rust,ignore
//! use vehicle_ingress::{process_event, IngressOptions};
//!
//! let event: serde_json::Value = serde_json::from_str(&raw)?;
//! let output = process_event(Some(&event), &IngressOptions::default())?;
//! println!("{} material change indexes", output.documents[0].children.len());
//! ```

use serde::Serialize;
use serde_json::Value;

use super::aggregate::assemble_document;
use super::filter::vehicle_level_records;
use crate::api::logs::{
    log_detail, log_error, log_info, log_success, log_warning, LogLevel,
};
use crate::config::IngressConfig;
use crate::error::{AssemblyError, PayloadError, PipelineResult, ValidationError};
use crate::models::{DemandRecord, VehicleAttributes, VehicleDocument};
use crate::payload::{build_headers, ProtonEvent, TransportHeaders};
use crate::validation::validate_vehicle_document;

/// Options for one pipeline run
#[derive(Debug, Clone, Default)]
pub struct IngressOptions {
    pub config: IngressConfig,

    /// Upstream tracking string. A fresh UUID is used when absent.
    pub tracking: Option<String>,

    /// Skip schema validation of the produced document
    pub skip_validation: bool,
}

/// Counters describing one assembly
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyStats {
    pub input_records: usize,
    pub vehicle_records: usize,
    pub material_count: usize,
    pub step_count: usize,
    pub total_quantity: u64,
}

/// Result of a complete pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct IngressOutput {
    pub headers: TransportHeaders,
    pub documents: Vec<VehicleDocument>,
    pub stats: AssemblyStats,
}

/// Transform raw event bytes.
///
/// Empty or whitespace-only input is an empty payload.
pub fn process_bytes(bytes: &[u8], options: &IngressOptions) -> PipelineResult<IngressOutput> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(AssemblyError::EmptyPayload.into());
    }
    let value: Value = serde_json::from_slice(bytes).map_err(PayloadError::from)?;
    process_event(Some(&value), options)
}

/// Transform a nested customer-order event.
///
/// `None` and JSON `null` are rejected as an empty payload.
pub fn process_event(payload: Option<&Value>, options: &IngressOptions) -> PipelineResult<IngressOutput> {
    let value = match payload {
        Some(Value::Null) | None => {
            log_error("Empty payload");
            return Err(AssemblyError::EmptyPayload.into());
        }
        Some(value) => value,
    };

    log_info("📥 Reading vehicle event...");
    let event = ProtonEvent::from_value(value.clone())?;
    let attributes = event.vehicle_attributes(&options.config)?;
    log_success(format!("Vehicle {} (order {})", attributes.vin, attributes.order_number));

    let records = event.demand_records();
    log_detail(
        LogLevel::Info,
        format!(
            "{} demands in {} planned orders",
            records.len(),
            event.planned_orders().len()
        ),
    );

    let (document, stats) = process_records(attributes, &records, options)?;

    let tracking = options
        .tracking
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let headers = build_headers(&options.config, &tracking);

    Ok(IngressOutput {
        headers,
        documents: vec![document],
        stats,
    })
}

/// Aggregate demand records into a document and validate it.
pub fn process_records(
    attributes: VehicleAttributes,
    records: &[DemandRecord],
    options: &IngressOptions,
) -> PipelineResult<(VehicleDocument, AssemblyStats)> {
    let prefix = options.config.vehicle_order_prefix.as_str();
    let vehicle_records = vehicle_level_records(records, prefix).len();
    if vehicle_records == 0 {
        log_warning(format!("No demands on '{}' planned orders", prefix));
    } else {
        log_detail(
            LogLevel::Info,
            format!("{} of {} demands on '{}' orders", vehicle_records, records.len(), prefix),
        );
    }

    log_info("📦 Aggregating material change indexes...");
    let document = assemble_document(attributes, records, prefix).map_err(|e| {
        log_error(e.to_string());
        e
    })?;

    let stats = AssemblyStats {
        input_records: records.len(),
        vehicle_records,
        material_count: document.children.len(),
        step_count: document.step_count(),
        total_quantity: document.total_quantity(),
    };
    log_success(format!(
        "{} material change indexes, {} production steps",
        stats.material_count, stats.step_count
    ));
    log_detail(LogLevel::Info, format!("total quantity {}", stats.total_quantity));

    if options.skip_validation {
        log_info("(validation skipped)");
    } else {
        let value = serde_json::to_value(&document).map_err(PayloadError::from)?;
        if let Err(errors) = validate_vehicle_document(&value) {
            log_error(format!("{} schema violation(s)", errors.len()));
            for err in errors.iter().take(3) {
                log_detail(LogLevel::Error, err.clone());
            }
            return Err(ValidationError::SchemaError { errors }.into());
        }
        log_success("Document matches vehicle schema");
    }

    Ok((document, stats))
}
