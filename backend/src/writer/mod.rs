//! Output table for the WebToffee import file.
//!
//! Projects [`ProductRecord`]s onto the fixed column layout and serializes
//! the result as CSV (UTF-8, header row, minimal quoting) or JSON.
//!
//! # Column layout
//!
//! ```text
//! product_type, post_type, post_title, sku, parent_sku, regular_price,
//! stock_status, categories, short_description, description, images,
//! then per attribute, in configuration order:
//!   attribute:pa_{slug}, attribute_data:pa_{slug}, attribute_default:pa_{slug},
//!   attribute_variation:pa_{slug}, meta:attribute_pa_{slug}
//! ```

use serde::Serialize;
use std::io::Write;

use crate::error::OutputResult;
use crate::models::{AttributeCells, AttributeConfig, ProductRecord};

/// Fixed leading columns.
pub const BASE_COLUMNS: [&str; 11] = [
    "product_type",
    "post_type",
    "post_title",
    "sku",
    "parent_sku",
    "regular_price",
    "stock_status",
    "categories",
    "short_description",
    "description",
    "images",
];

/// The five column names emitted for one attribute slug.
pub fn attribute_columns(slug: &str) -> [String; 5] {
    [
        format!("attribute:pa_{}", slug),
        format!("attribute_data:pa_{}", slug),
        format!("attribute_default:pa_{}", slug),
        format!("attribute_variation:pa_{}", slug),
        format!("meta:attribute_pa_{}", slug),
    ]
}

/// Header row for a given attribute configuration.
pub fn header_row(attributes: &[AttributeConfig]) -> Vec<String> {
    BASE_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(attributes.iter().flat_map(|a| attribute_columns(&a.slug)))
        .collect()
}

/// Tabular form of the import file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl OutputTable {
    /// Project records onto the column layout. Absent cells become empty strings.
    pub fn project(records: &[ProductRecord], attributes: &[AttributeConfig]) -> Self {
        let blank = AttributeCells::default();
        let rows = records
            .iter()
            .map(|record| {
                let mut row = vec![
                    record.product_type.as_str().to_string(),
                    record.product_type.post_type().to_string(),
                    record.post_title.clone(),
                    record.sku.clone(),
                    record.parent_sku.clone(),
                    record.regular_price.clone(),
                    record.stock_status.clone(),
                    record.categories.clone(),
                    record.short_description.clone(),
                    record.description.clone(),
                    record.images.clone(),
                ];
                for attribute in attributes {
                    let cells = record.attribute(&attribute.slug).unwrap_or(&blank);
                    row.extend([
                        cells.value.clone(),
                        cells.data.clone(),
                        cells.default.clone(),
                        cells.variation.clone(),
                        cells.meta.clone(),
                    ]);
                }
                row
            })
            .collect();

        Self {
            headers: header_row(attributes),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of a named column on a row.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.headers.iter().position(|h| h == column)?;
        self.rows.get(row)?.get(index).map(String::as_str)
    }

    /// Write the table as CSV.
    pub fn write_csv<W: Write>(&self, writer: W) -> OutputResult<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(b',')
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);

        csv_writer.write_record(&self.headers)?;
        for row in &self.rows {
            csv_writer.write_record(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_csv_bytes(&self) -> OutputResult<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(buffer)
    }

    /// Rows as JSON objects keyed by column name, keys in column order.
    pub fn to_json(&self) -> OutputResult<String> {
        let objects: Vec<serde_json::Map<String, serde_json::Value>> = self
            .rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned().map(serde_json::Value::String))
                    .collect()
            })
            .collect();
        Ok(serde_json::to_string_pretty(&objects)?)
    }
}
