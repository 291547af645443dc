//! JSON Schema validation for import configuration documents.
//!
//! The schema is embedded at compile time from `schemas/import-config.json`
//! and checked with JSON Schema Draft 7 before the document is deserialized,
//! so users get every problem in one report instead of the first serde error.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use hne_import::validation::validate_import_config;
//!
//! let config = json!({
//!     "brand": "Acme",
//!     "columns": { "sku": "SKU", "product": "Product Name", "category": "Categories" }
//! });
//! assert!(validate_import_config(&config).is_ok());
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

static IMPORT_CONFIG_SCHEMA: Lazy<Result<Value, String>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/import-config.json"))
        .map_err(|e| format!("Invalid embedded schema: {}", e))
});

/// Validate a JSON value against a schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with every violation otherwise
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

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

/// Quick yes/no check.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate against the import configuration schema.
pub fn validate_import_config(data: &Value) -> Result<(), Vec<String>> {
    match IMPORT_CONFIG_SCHEMA.as_ref() {
        Ok(schema) => validate(schema, data),
        Err(e) => Err(vec![e.clone()]),
    }
}

pub fn is_valid_import_config(data: &Value) -> bool {
    validate_import_config(data).is_ok()
}
