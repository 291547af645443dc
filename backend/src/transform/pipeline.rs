//! High-level conversion API.
//!
//! Combines all steps: reading the spreadsheet, classifying attribute
//! columns, applying the configured decisions, flattening and projecting
//! onto the import file layout.
//!
//! # Example
//!
//! ```rust,ignore
//! use hne_import::{convert_file, ImportConfig};
//! use std::path::Path;
//!
//! let config = ImportConfig::from_file(Path::new("import.json"))?;
//! let result = convert_file(Path::new("catalog.xlsx"), Some("Products"), &config)?;
//! std::fs::write("webtoffee_import.csv", result.table.to_csv_bytes()?)?;
//! ```

use serde::Serialize;
use std::path::Path;

use crate::config::ImportConfig;
use crate::error::PipelineResult;
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::{AttributeConfig, Dataset, ProductRecord};
use crate::parser::{read_source, ParseResult};
use crate::writer::OutputTable;
use super::classifier::{classify, configure, CandidateColumn};
use super::flattener::{flatten, group_rows, FlattenSettings};

/// Number of distinct values shown per candidate column.
const PREVIEW_VALUES: usize = 5;

/// Source file information
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub encoding: String,
    pub delimiter: Option<char>,
    pub sheet: Option<String>,
    pub headers: Vec<String>,
    pub row_count: usize,
}

impl SourceInfo {
    fn from_dataset(dataset: &Dataset) -> Self {
        Self {
            encoding: "utf-8".to_string(),
            delimiter: None,
            sheet: None,
            headers: dataset.headers.clone(),
            row_count: dataset.len(),
        }
    }
}

/// Result of a complete conversion
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    /// Attribute set used for the run
    pub attributes: Vec<AttributeConfig>,
    /// Parent and variation records, in output order
    pub records: Vec<ProductRecord>,
    /// Records projected onto the import layout
    pub table: OutputTable,
    pub group_count: usize,
    pub source_info: SourceInfo,
}

impl ConversionResult {
    pub fn parent_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_parent()).count()
    }

    pub fn variation_count(&self) -> usize {
        self.records.len() - self.parent_count()
    }
}

/// Convert a spreadsheet file.
///
/// 1. Reads the file (CSV with auto-detection, or a workbook sheet)
/// 2. Checks the role columns
/// 3. Classifies and configures attribute columns
/// 4. Flattens rows into parent and variation records
pub fn convert_file(path: &Path, sheet: Option<&str>, config: &ImportConfig) -> PipelineResult<ConversionResult> {
    log_info(format!("📖 Reading {}...", path.display()));
    let parsed = read_source(path, sheet)?;
    let info = source_info(&parsed);
    convert_parsed(&parsed.dataset, config, info)
}

/// Convert an already loaded dataset.
pub fn convert_dataset(dataset: &Dataset, config: &ImportConfig) -> PipelineResult<ConversionResult> {
    convert_parsed(dataset, config, SourceInfo::from_dataset(dataset))
}

/// Read a file and list its candidate attribute columns, for building a configuration.
pub fn inspect_file(path: &Path, sheet: Option<&str>, config: &ImportConfig) -> PipelineResult<Vec<CandidateColumn>> {
    let parsed = read_source(path, sheet)?;
    log_source(&source_info(&parsed));
    config.check_columns(&parsed.dataset)?;
    Ok(classify(&parsed.dataset, &config.columns))
}

fn source_info(parsed: &ParseResult) -> SourceInfo {
    SourceInfo {
        encoding: parsed.encoding.clone(),
        delimiter: parsed.delimiter,
        sheet: parsed.sheet.clone(),
        headers: parsed.dataset.headers.clone(),
        row_count: parsed.dataset.len(),
    }
}

fn convert_parsed(dataset: &Dataset, config: &ImportConfig, source_info: SourceInfo) -> PipelineResult<ConversionResult> {
    log_source(&source_info);
    config.check_columns(dataset)?;
    if !dataset.has_column(&config.columns.category) {
        log_warning(format!(
            "Category column '{}' not found, categories left empty",
            config.columns.category
        ));
    }

    log_info("🔎 Classifying attribute columns...");
    let candidates = classify(dataset, &config.columns);
    for name in config.attributes.keys() {
        if !candidates.iter().any(|c| &c.name == name) {
            log_warning(format!("'{}' is not an attribute column, decision ignored", name));
        }
    }
    log_candidates(&candidates);

    let attributes = configure(&candidates, |column| config.attributes.get(column).copied())?;
    log_attributes(&attributes);

    let groups = group_rows(dataset, &config.columns.product);
    let grouped_rows: usize = groups.iter().map(|g| g.rows.len()).sum();
    if grouped_rows < dataset.len() {
        log_warning(format!(
            "{} rows skipped (no value in '{}')",
            dataset.len() - grouped_rows,
            config.columns.product
        ));
    }

    log_info("⚙️  Flattening rows...");
    let settings = FlattenSettings {
        brand: config.brand.clone(),
        brand_in_title: config.brand_in_title,
        sku_in_variation_title: config.sku_in_variation_title,
    };
    let records = flatten(dataset, &config.columns, &attributes, &settings)?;
    let table = OutputTable::project(&records, &attributes);

    let result = ConversionResult {
        attributes,
        records,
        table,
        group_count: groups.len(),
        source_info,
    };
    log_success(format!(
        "{} products: {} parents, {} variations",
        result.group_count,
        result.parent_count(),
        result.variation_count()
    ));

    Ok(result)
}

fn log_source(info: &SourceInfo) {
    log_success(format!("Encoding: {}", info.encoding));
    if let Some(d) = info.delimiter {
        log_success(format!("Separator: '{}'", format_delimiter(d)));
    }
    if let Some(ref sheet) = info.sheet {
        log_success(format!("Sheet: {}", sheet));
    }
    log_success(format!("Read {} rows, {} columns", info.row_count, info.headers.len()));
}

fn log_candidates(candidates: &[CandidateColumn]) {
    if candidates.is_empty() {
        log_warning("No attribute columns found");
        return;
    }
    log_info(format!("📋 {} candidate attribute columns:", candidates.len()));
    for candidate in candidates {
        let (shown, hidden) = candidate.preview(PREVIEW_VALUES);
        let more = if hidden > 0 { format!(" ... and {} more", hidden) } else { String::new() };
        log_info_indent(
            format!(
                "{} - unique values ({}): {}{}",
                candidate.name,
                candidate.distinct_values.len(),
                shown.join(", "),
                more
            ),
            1,
        );
    }
}

fn log_attributes(attributes: &[AttributeConfig]) {
    log_success(format!("Using {} attributes:", attributes.len()));
    for attribute in attributes {
        let mut flags = Vec::new();
        if attribute.is_variation {
            flags.push("variation");
        }
        if attribute.visible_info {
            flags.push("visible");
        }
        log_info_indent(format!("pa_{} ← {} [{}]", attribute.slug, attribute.column, flags.join(", ")), 1);
    }
}

/// Format delimiter for display
fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, PipelineError, TransformError};
    use crate::models::{AttributeDecision, ColumnRoles};
    use std::io::Write;

    fn config() -> ImportConfig {
        let mut config = ImportConfig::new(ColumnRoles::new("SKU", "Product Name", "Categories"), "Acme");
        for column in ["Size", "Color"] {
            config.decision_mut(column).is_variation = true;
        }
        config
    }

    fn shirts() -> Dataset {
        Dataset::from_text_rows(
            ["Product Name", "Size", "Color", "SKU", "Categories", "Price"],
            vec![
                vec!["Shirt", "S", "Red", "SKU1", "Tops", "10"],
                vec!["Shirt", "M", "Red", "SKU2", "Tops", "10"],
                vec!["Shirt", "S", "Blue", "SKU3", "Tops", "12"],
            ],
        )
    }

    #[test]
    fn test_convert_worked_example() {
        let result = convert_dataset(&shirts(), &config()).unwrap();

        assert_eq!(result.group_count, 1);
        assert_eq!(result.parent_count(), 1);
        assert_eq!(result.variation_count(), 3);
        let slugs: Vec<_> = result.attributes.iter().map(|a| a.slug.as_str()).collect();
        assert_eq!(slugs, vec!["size", "color"]);

        let table = &result.table;
        assert_eq!(table.cell(0, "sku"), Some("ACME-SKU1"));
        assert_eq!(table.cell(0, "attribute:pa_size"), Some("M|S"));
        assert_eq!(table.cell(0, "attribute:pa_color"), Some("Blue|Red"));
        assert_eq!(table.cell(0, "attribute_data:pa_color"), Some("0|0|1"));
        assert_eq!(table.cell(2, "attribute_data:pa_color"), Some("Red"));
        assert_eq!(table.cell(3, "attribute_data:pa_size"), Some("S"));
        assert_eq!(table.cell(3, "meta:attribute_pa_size"), Some(""));
    }

    #[test]
    fn test_csv_document() {
        let result = convert_dataset(&shirts(), &config()).unwrap();
        let csv = String::from_utf8(result.table.to_csv_bytes().unwrap()).unwrap();
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[0],
            "product_type,post_type,post_title,sku,parent_sku,regular_price,stock_status,categories,\
             short_description,description,images,\
             attribute:pa_size,attribute_data:pa_size,attribute_default:pa_size,attribute_variation:pa_size,meta:attribute_pa_size,\
             attribute:pa_color,attribute_data:pa_color,attribute_default:pa_color,attribute_variation:pa_color,meta:attribute_pa_color"
        );
        assert_eq!(
            lines[1],
            "variable,product,Shirt,ACME-SKU1,,,instock,Tops,,,,M|S,0|0|1,,1,,Blue|Red,0|0|1,,1,"
        );
        assert_eq!(
            lines[3],
            "variation,product_variation,Shirt,SKU2,ACME-SKU1,0,instock,,,,,,,,,,,Red,,,"
        );
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let a = convert_dataset(&shirts(), &config()).unwrap().table.to_csv_bytes().unwrap();
        let b = convert_dataset(&shirts(), &config()).unwrap().table.to_csv_bytes().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_attributes_halts() {
        let mut config = config();
        for column in ["Size", "Color"] {
            *config.decision_mut(column) = AttributeDecision { use_as_attribute: false, ..Default::default() };
        }
        let err = convert_dataset(&shirts(), &config).unwrap_err();
        assert!(matches!(err, PipelineError::Transform(TransformError::EmptyAttributeConfiguration)));
    }

    #[test]
    fn test_unknown_role_column() {
        let mut config = config();
        config.columns.sku = "Reference".into();
        let err = convert_dataset(&shirts(), &config).unwrap_err();
        assert!(matches!(err, PipelineError::Config(ConfigError::UnknownColumn { .. })));
    }

    #[test]
    fn test_missing_category_column_leaves_categories_empty() {
        let mut config = config();
        config.columns.category = "Department".into();

        let result = convert_dataset(&shirts(), &config).unwrap();
        assert_eq!(result.parent_count(), 1);
        assert_eq!(result.table.cell(0, "categories"), Some(""));
        assert_eq!(result.table.cell(0, "sku"), Some("ACME-SKU1"));
    }

    #[test]
    fn test_convert_csv_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(
            "Product Name;Size;SKU;Categories\nShirt;S;SKU1;Tops\nShirt;M;SKU2;Tops\nCap;One Size;C1;Hats\n".as_bytes(),
        )
        .unwrap();

        let result = convert_file(file.path(), None, &config()).unwrap();
        assert_eq!(result.source_info.delimiter, Some(';'));
        assert_eq!(result.group_count, 2);
        assert_eq!(result.records.len(), 5);
        assert_eq!(result.table.cell(3, "sku"), Some("ACME-C1"));
        assert_eq!(result.table.cell(3, "attribute:pa_size"), Some("OneSize"));
    }

    #[test]
    fn test_inspect_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(b"SKU,Product Name,Categories,Size,Weight\nA,Shirt,Tops,S,1\n").unwrap();

        let candidates = inspect_file(file.path(), None, &config()).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "Size");
    }
}
