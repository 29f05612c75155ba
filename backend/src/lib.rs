//! # Vehicle Ingress - vehicle production events to vehicle documents
//!
//! Turns a vehicle production event (demands of planned orders) into a
//! hierarchical document: vehicle → material change indexes → production steps.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Event    │────▶│   Payload   │────▶│  Transform  │────▶│   Vehicle   │
//! │   (JSON)    │     │  (adapters) │     │ (aggregate) │     │  document   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! The aggregation core (`transform::{filter, grouper, aggregate}`) is pure
//! and synchronous; it knows nothing about event shapes, headers or logging.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vehicle_ingress::{aggregate, DemandRecord};
//!
//! let records = vec![
//!     DemandRecord::new("123456701", 2, "VH_0001"),
//!     DemandRecord::new("123456701", 3, "VH_0001"),
//! ];
//! let nodes = aggregate(&records)?;
//! assert_eq!(nodes[0].quantity(), 5);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Input records and output nodes
//! - [`config`] - Injected lookup tables and constants
//! - [`payload`] - Upstream event adapters and transport headers
//! - [`transform`] - Filter, grouping, aggregation, and pipeline
//! - [`validation`] - Output schema validation
//! - [`api`] - HTTP API server and log broadcasting

// Core modules
pub mod error;
pub mod models;

// Configuration
pub mod config;

// Adapters
pub mod payload;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{
    AssemblyError, ConfigError, PayloadError, PipelineError, ServerError, ValidationError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    DemandRecord, MaterialChangeIndexNode, MaterialKey, Passthrough, ProductionStepNode,
    VehicleAttributes, VehicleDocument,
};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::IngressConfig;

// =============================================================================
// Re-exports - Payload
// =============================================================================

pub use payload::{
    build_headers, parse_demand_csv, parse_demand_csv_file, parse_demand_json, ProtonEvent,
    TransportHeaders,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    aggregate, assemble_document, derive_key, group_by_material, reduce_steps,
    vehicle_level_records, KeyError, MaterialGroup, DEFAULT_VEHICLE_ORDER_PREFIX,
};

pub use transform::pipeline::{
    process_bytes, process_event, process_records, AssemblyStats, IngressOptions, IngressOutput,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid_vehicle_document, validate_vehicle_document};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
