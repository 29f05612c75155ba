//! REST API types.
//!
//! Documents are returned in their final wire format; headers are returned
//! alongside so the caller can forward the message unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::VehicleDocument;
use crate::payload::TransportHeaders;
use crate::transform::pipeline::{AssemblyStats, IngressOutput};

/// Response of `POST /api/transform`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Status: "ready" or "empty" (no vehicle-level demands)
    pub status: String,

    /// Transport headers for the produced message
    pub headers: TransportHeaders,

    /// Vehicle documents, ready to forward
    pub documents: Vec<VehicleDocument>,

    pub metadata: ResponseMetadata,
}

/// Counters about the transformation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub input_records: usize,
    pub vehicle_records: usize,
    pub material_count: usize,
    pub step_count: usize,
    pub total_quantity: u64,
}

impl From<AssemblyStats> for ResponseMetadata {
    fn from(stats: AssemblyStats) -> Self {
        Self {
            input_records: stats.input_records,
            vehicle_records: stats.vehicle_records,
            material_count: stats.material_count,
            step_count: stats.step_count,
            total_quantity: stats.total_quantity,
        }
    }
}

impl From<IngressOutput> for TransformResponse {
    fn from(output: IngressOutput) -> Self {
        let status = if output.stats.vehicle_records == 0 { "empty" } else { "ready" };

        TransformResponse {
            job_id: Uuid::new_v4().to_string(),
            status: status.to_string(),
            headers: output.headers,
            documents: output.documents,
            metadata: output.stats.into(),
        }
    }
}

/// Create an error response
pub fn error_response(message: &str) -> Value {
    json!({
        "status": "error",
        "error": message
    })
}
