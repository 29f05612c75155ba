//! Transformation module.
//!
//! This module turns demand records into the vehicle document:
//! - Filter: Vehicle-level planned orders only
//! - Grouper: Records by raw material number
//! - Aggregate: Step reduction, key derivation, merge by key
//! - Pipeline: Event in, headers and document out

pub mod aggregate;
pub mod filter;
pub mod grouper;
pub mod pipeline;

pub use aggregate::{aggregate, assemble_document, derive_key, reduce_steps, KeyError};
pub use filter::{vehicle_level_records, DEFAULT_VEHICLE_ORDER_PREFIX};
pub use grouper::{group_by_material, MaterialGroup};
pub use pipeline::*;
