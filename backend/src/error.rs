//! Error types for the vehicle ingress pipeline.
//!
//! - [`AssemblyError`] - Aggregation and document assembly errors (the core)
//! - [`PayloadError`] - Upstream event shape errors (adapters)
//! - [`ConfigError`] - Configuration loading errors
//! - [`ValidationError`] - Output schema validation errors
//! - [`PipelineError`] - Top-level orchestration errors
//! - [`ServerError`] - HTTP layer errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Assembly Errors (core)
// =============================================================================

/// Errors raised while aggregating demand records into a vehicle document.
///
/// Both variants are fatal for the invocation: no partially built document
/// is ever returned alongside them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    /// No payload at all was handed to the pipeline.
    #[error("Empty payload")]
    EmptyPayload,

    /// A record's material number cannot be split into part number and change index.
    #[error(
        "Malformed record #{index} (materialNumber '{material_number}', plannedOrderId '{planned_order_id}'): {reason}"
    )]
    MalformedRecord {
        index: usize,
        material_number: String,
        planned_order_id: String,
        reason: String,
    },
}

// =============================================================================
// Payload Errors (adapters)
// =============================================================================

/// Errors while reading an upstream event into typed records.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The event does not match the declared shape (missing field, wrong type).
    #[error("Invalid event shape: {0}")]
    Shape(#[from] serde_json::Error),

    /// A field is present but its value cannot be interpreted.
    #[error("Invalid value for field '{field}': {message}")]
    InvalidField { field: String, message: String },

    /// CSV demand export could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Failed to read the input file.
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading [`crate::config::IngressConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for the expected shape.
    #[error("Invalid config file: {0}")]
    Json(#[from] serde_json::Error),

    /// An environment override has an unusable value.
    #[error("Invalid value for {var}: {message}")]
    InvalidEnv { var: String, message: String },
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors during output document validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Schema validation failed.
    #[error("Validation failed: {errors:?}")]
    SchemaError { errors: Vec<String> },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::process_event`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Aggregation error.
    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    /// Upstream payload error.
    #[error("Payload error: {0}")]
    Payload(#[from] PayloadError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Produced document failed schema validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Failed to bind or serve.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for core assembly operations.
pub type AssemblyResult<T> = Result<T, AssemblyError>;

/// Result type for payload adapters.
pub type PayloadResult<T> = Result<T, PayloadError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
