//! Import configuration.
//!
//! Well-known column names and output markers, plus [`ImportConfig`], the
//! document that replaces the interactive column-picking step: role columns,
//! brand, and one [`AttributeDecision`] per attribute column.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::models::{AttributeDecision, AttributeDecisions, ColumnRoles, Dataset};
use crate::validation::validate_import_config;

/// Short description source column.
pub const SHORT_DESCRIPTION_COLUMN: &str = "Short description";

/// Long description source column.
pub const DESCRIPTION_COLUMN: &str = "Description";

/// Image URL source column.
pub const IMAGE_COLUMN: &str = "Image URL";

/// Columns that are never offered as attributes, besides the role columns.
pub const WELL_KNOWN_COLUMNS: [&str; 5] = [
    "Price",
    SHORT_DESCRIPTION_COLUMN,
    DESCRIPTION_COLUMN,
    IMAGE_COLUMN,
    "Regular price",
];

/// Brand used when none is configured.
pub const DEFAULT_BRAND: &str = "Enter Brand Name";

/// Stock status written on every record.
pub const STOCK_STATUS: &str = "instock";

/// Regular price written on every variation.
pub const VARIATION_REGULAR_PRICE: &str = "0";

/// Joins the brand prefix and the first SKU of a group.
pub const SKU_SEPARATOR: &str = "-";

/// Conventional file name for the generated import file.
pub const DEFAULT_OUTPUT_NAME: &str = "webtoffee_import.csv";

/// Environment variable read for the brand when no flag is given.
pub const BRAND_ENV: &str = "HNE_BRAND";

fn default_brand() -> String {
    DEFAULT_BRAND.to_string()
}

/// Complete configuration of one conversion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportConfig {
    /// Free-text brand, used for parent SKUs.
    #[serde(default = "default_brand")]
    pub brand: String,

    /// Role columns.
    pub columns: ColumnRoles,

    /// Per-column attribute decisions. Unlisted candidates get the default decision.
    #[serde(default)]
    pub attributes: AttributeDecisions,

    /// Prefix parent titles with the brand.
    #[serde(default)]
    pub brand_in_title: bool,

    /// Suffix variation titles with the variation SKU.
    #[serde(default)]
    pub sku_in_variation_title: bool,
}

impl ImportConfig {
    pub fn new(columns: ColumnRoles, brand: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            columns,
            attributes: AttributeDecisions::new(),
            brand_in_title: false,
            sku_in_variation_title: false,
        }
    }

    /// Parse and schema-check a JSON document.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        validate_import_config(&value).map_err(|errors| ConfigError::Schema { errors })?;
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decision for a column, falling back to the default decision.
    pub fn decision(&self, column: &str) -> AttributeDecision {
        self.attributes.get(column).copied().unwrap_or_default()
    }

    /// Mutable decision for a column, inserting the default decision first.
    pub fn decision_mut(&mut self, column: &str) -> &mut AttributeDecision {
        self.attributes.entry(column.to_string()).or_default()
    }

    /// Check that the SKU and product name columns exist in the dataset.
    ///
    /// The category column is optional: without it every record gets empty categories.
    pub fn check_columns(&self, dataset: &Dataset) -> ConfigResult<()> {
        let roles = [("SKU", &self.columns.sku), ("Product name", &self.columns.product)];
        for (role, column) in roles {
            if !dataset.has_column(column) {
                return Err(ConfigError::UnknownColumn {
                    role,
                    column: column.clone(),
                });
            }
        }
        Ok(())
    }
}
