//! # HNE Import - WebToffee product import generator
//!
//! Turns a flat product spreadsheet (one row per purchasable variation) into
//! the CSV layout the WebToffee WooCommerce importer expects: one `variable`
//! parent per product name followed by its `variation` children, with
//! multi-valued attributes encoded as pipe-separated columns.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ CSV / XLSX  │────▶│   Parser    │────▶│ Classifier  │────▶│  Flattener  │──▶ import CSV
//! │ (any enc.)  │     │  (typed)    │     │ + decisions │     │ parent/var. │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hne_import::{convert_file, ColumnRoles, ImportConfig};
//! use std::path::Path;
//!
//! let mut config = ImportConfig::new(ColumnRoles::new("SKU", "Product Name", "Categories"), "Acme");
//! config.decision_mut("Size").is_variation = true;
//!
//! let result = convert_file(Path::new("catalog.xlsx"), None, &config).unwrap();
//! println!("{} products", result.group_count);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Import configuration and constants
//! - [`models`] - Cells, datasets, attribute settings, output records
//! - [`parser`] - CSV and workbook readers
//! - [`transform`] - Classification, flattening, pipeline
//! - [`writer`] - Output table and CSV serialization
//! - [`validation`] - Config schema validation
//! - [`logs`] - Progress log stream

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Reading
pub mod parser;

// Transformation
pub mod transform;

// Output
pub mod writer;

pub mod validation;
pub mod logs;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{
    ConfigError, OutputError, PipelineError, PipelineResult, SourceError, TransformError,
};

pub use config::ImportConfig;

pub use models::{
    AttributeCells, AttributeConfig, AttributeDecision, AttributeDecisions, CellValue,
    ColumnRoles, Dataset, ProductRecord, ProductType, SourceRow,
};

pub use parser::{parse_bytes_auto, parse_delimited, read_source, ParseResult, SourceFormat};
pub use parser::xlsx::sheet_names;

pub use transform::clean::{brand_prefix, clean_value, slugify};
pub use transform::{
    classify, configure, convert_dataset, convert_file, flatten, inspect_file,
    CandidateColumn, ConversionResult, FlattenSettings, SourceInfo,
};

pub use writer::OutputTable;
