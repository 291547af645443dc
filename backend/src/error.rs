//! Error types for the import conversion pipeline.
//!
//! - [`SourceError`] - reading the input spreadsheet (CSV or workbook)
//! - [`TransformError`] - the grouping-and-flattening transform
//! - [`ConfigError`] - import configuration documents
//! - [`OutputError`] - serializing the output table
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Source Errors
// =============================================================================

/// Errors while reading the input dataset.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode the file content.
    #[error("Failed to decode content: {0}")]
    Encoding(String),

    /// Invalid delimited text.
    #[error("Line {line}: {message}")]
    Parse { line: u64, message: String },

    /// Empty file.
    #[error("Input file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in input")]
    NoHeaders,

    /// Workbook could not be read.
    #[error("Workbook read error: {0}")]
    Workbook(#[from] calamine::Error),

    /// Requested worksheet does not exist.
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// File extension is not a known spreadsheet format.
    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),
}

impl From<csv::Error> for SourceError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        SourceError::Parse {
            line,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors raised by the flattening transform.
///
/// Every other irregularity in the input is absorbed as a blank cell.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    /// No column was kept as an attribute.
    #[error("No attributes configured. Please select at least one attribute to continue.")]
    EmptyAttributeConfiguration,
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors in an import configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the document.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Document is not valid JSON or does not deserialize.
    #[error("Config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Document violates the config schema.
    #[error("Invalid config: {}", errors.join("; "))]
    Schema { errors: Vec<String> },

    /// A role column does not exist in the dataset.
    #[error("{role} column '{column}' not found in input")]
    UnknownColumn { role: &'static str, column: String },
}

// =============================================================================
// Output Errors
// =============================================================================

/// Errors while serializing the output table.
#[derive(Debug, Error)]
pub enum OutputError {
    /// CSV writer error.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON write error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("Output IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::convert_file`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input reading error.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Transformation error.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Output error.
    #[error("Output error: {0}")]
    Output(#[from] OutputError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for source reading.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for output serialization.
pub type OutputResult<T> = Result<T, OutputError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
