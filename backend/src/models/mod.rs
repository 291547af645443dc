//! Domain models for the import conversion pipeline.
//!
//! - [`CellValue`] - one spreadsheet cell (text, number or absent)
//! - [`Dataset`] / [`SourceRow`] - the input table
//! - [`ColumnRoles`] - which columns hold SKU, product name and category
//! - [`AttributeDecision`] / [`AttributeConfig`] - per-column attribute settings
//! - [`ProductRecord`] - one parent or variation line of the import file

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

// =============================================================================
// Cells
// =============================================================================

/// A single cell of the source spreadsheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Absent,
}

impl CellValue {
    /// Infer the type of a raw textual cell.
    ///
    /// Empty strings are absent. Text becomes a number only when the number
    /// renders back to the exact same text, so `"00123"` or `"1.50"` keep
    /// their spelling. Use [`CellValue::is_numeric`] to ask whether such a
    /// cell holds a number.
    pub fn infer(raw: &str) -> Self {
        if raw.is_empty() {
            return CellValue::Absent;
        }
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() && format_number(n) == raw => CellValue::Number(n),
            _ => CellValue::Text(raw.to_string()),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, CellValue::Absent)
    }

    /// Holds a finite number, either typed or spelled as text (`"1.50"`, `"00123"`).
    pub fn is_numeric(&self) -> bool {
        match self {
            CellValue::Number(n) => n.is_finite(),
            CellValue::Text(s) => s.trim().parse::<f64>().map_or(false, f64::is_finite),
            CellValue::Absent => false,
        }
    }

    /// Absent, or text made only of whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Absent => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Text projection of the cell. Absent cells render as an empty string.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Text(s) => Cow::Borrowed(s.as_str()),
            CellValue::Number(n) => Cow::Owned(format_number(*n)),
            CellValue::Absent => Cow::Borrowed(""),
        }
    }
}

/// Render a number the way a spreadsheet shows it: integral values without a fraction.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

// =============================================================================
// Dataset
// =============================================================================

static ABSENT: CellValue = CellValue::Absent;

/// One record of the input dataset, positionally aligned with [`Dataset::headers`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceRow {
    pub values: Vec<CellValue>,
}

impl SourceRow {
    pub fn new(values: Vec<CellValue>) -> Self {
        Self { values }
    }

    /// Cell at a column index; out-of-range indices read as absent.
    pub fn get(&self, index: usize) -> &CellValue {
        self.values.get(index).unwrap_or(&ABSENT)
    }
}

/// In-memory tabular dataset with named columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<SourceRow>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<SourceRow>) -> Self {
        Self { headers, rows }
    }

    /// Build a dataset from raw text cells, inferring each cell's type.
    pub fn from_text_rows<H, R, C>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let headers = headers.into_iter().map(Into::into).collect();
        let rows = rows
            .into_iter()
            .map(|row| SourceRow::new(row.into_iter().map(|c| CellValue::infer(c.as_ref())).collect()))
            .collect();
        Self { headers, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All cells of a column, in row order.
    pub fn column<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a CellValue> + 'a {
        let index = self.column_index(name);
        self.rows.iter().map(move |row| match index {
            Some(i) => row.get(i),
            None => &ABSENT,
        })
    }
}

// =============================================================================
// Configuration records
// =============================================================================

/// Role assignments for the columns the transform reads directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnRoles {
    pub sku: String,
    pub product: String,
    pub category: String,
}

impl ColumnRoles {
    pub fn new(sku: impl Into<String>, product: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            product: product.into(),
            category: category.into(),
        }
    }
}

/// Caller's decision for one candidate attribute column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttributeDecision {
    /// Keep the column as an attribute at all.
    #[serde(rename = "use")]
    pub use_as_attribute: bool,
    /// Attribute distinguishes variations.
    pub is_variation: bool,
    /// Shown in the "additional information" tab.
    pub visible_info: bool,
}

impl Default for AttributeDecision {
    fn default() -> Self {
        Self {
            use_as_attribute: true,
            is_variation: false,
            visible_info: false,
        }
    }
}

/// Decisions keyed by column name.
pub type AttributeDecisions = BTreeMap<String, AttributeDecision>;

/// A column kept as a product attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeConfig {
    /// Source column name.
    pub column: String,
    /// Output column suffix, see [`crate::transform::clean::slugify`].
    pub slug: String,
    /// Non-blank values seen in the whole dataset, first-appearance order.
    pub distinct_values: Vec<String>,
    pub is_variation: bool,
    pub visible_info: bool,
}

// =============================================================================
// Output records
// =============================================================================

/// Parent (variable) or child (variation) product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Variable,
    Variation,
}

impl ProductType {
    /// Value of the `product_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Variable => "variable",
            Self::Variation => "variation",
        }
    }

    /// Value of the `post_type` column.
    pub fn post_type(&self) -> &'static str {
        match self {
            Self::Variable => "product",
            Self::Variation => "product_variation",
        }
    }
}

/// The five output cells of one attribute on one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttributeCells {
    /// `attribute:pa_{slug}`
    pub value: String,
    /// `attribute_data:pa_{slug}`
    pub data: String,
    /// `attribute_default:pa_{slug}`
    pub default: String,
    /// `attribute_variation:pa_{slug}`
    pub variation: String,
    /// `meta:attribute_pa_{slug}`
    pub meta: String,
}

/// One line of the import file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub product_type: ProductType,
    pub post_title: String,
    pub sku: String,
    pub parent_sku: String,
    pub regular_price: String,
    pub stock_status: String,
    pub categories: String,
    pub short_description: String,
    pub description: String,
    pub images: String,
    /// Attribute cells keyed by slug. Missing slugs are blank in the output.
    pub attributes: HashMap<String, AttributeCells>,
}

impl ProductRecord {
    pub fn is_parent(&self) -> bool {
        self.product_type == ProductType::Variable
    }

    pub fn attribute(&self, slug: &str) -> Option<&AttributeCells> {
        self.attributes.get(slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_cell_types() {
        assert_eq!(CellValue::infer(""), CellValue::Absent);
        assert_eq!(CellValue::infer("42"), CellValue::Number(42.0));
        assert_eq!(CellValue::infer("-1.5"), CellValue::Number(-1.5));
        assert_eq!(CellValue::infer("Red"), CellValue::Text("Red".into()));
        assert_eq!(CellValue::infer("   "), CellValue::Text("   ".into()));
    }

    #[test]
    fn test_leading_zeros_stay_text() {
        assert_eq!(CellValue::infer("00123"), CellValue::Text("00123".into()));
        assert_eq!(CellValue::infer("1.50"), CellValue::Text("1.50".into()));
        assert_eq!(CellValue::infer("inf"), CellValue::Text("inf".into()));
    }

    #[test]
    fn test_numeric_text() {
        assert!(CellValue::infer("1.50").is_numeric());
        assert!(CellValue::infer("3.0").is_numeric());
        assert!(CellValue::infer("00123").is_numeric());
        assert!(CellValue::Text(" 2.00 ".into()).is_numeric());
        assert!(CellValue::Number(7.0).is_numeric());

        assert!(!CellValue::infer("inf").is_numeric());
        assert!(!CellValue::infer("NaN").is_numeric());
        assert!(!CellValue::infer("1,5").is_numeric());
        assert!(!CellValue::infer("M").is_numeric());
        assert!(!CellValue::Absent.is_numeric());
    }

    #[test]
    fn test_number_text_projection() {
        assert_eq!(CellValue::Number(10.0).to_text(), "10");
        assert_eq!(CellValue::Number(2.25).to_text(), "2.25");
        assert_eq!(CellValue::Absent.to_text(), "");
    }

    #[test]
    fn test_blank_cells() {
        assert!(CellValue::Absent.is_blank());
        assert!(CellValue::Text(" \t".into()).is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
        assert!(!CellValue::Text("x".into()).is_blank());
    }

    #[test]
    fn test_dataset_lookup() {
        let ds = Dataset::from_text_rows(["SKU", "Size"], vec![vec!["A1", "S"], vec!["A2"]]);
        assert_eq!(ds.column_index("Size"), Some(1));
        assert!(!ds.has_column("Color"));

        let sizes: Vec<_> = ds.column("Size").cloned().collect();
        assert_eq!(sizes, vec![CellValue::Text("S".into()), CellValue::Absent]);

        let missing: Vec<_> = ds.column("Color").collect();
        assert!(missing.iter().all(|c| c.is_absent()));
    }

    #[test]
    fn test_decision_defaults_from_json() {
        let decision: AttributeDecision = serde_json::from_str(r#"{"isVariation": true}"#).unwrap();
        assert!(decision.use_as_attribute);
        assert!(decision.is_variation);
        assert!(!decision.visible_info);

        let skipped: AttributeDecision = serde_json::from_str(r#"{"use": false}"#).unwrap();
        assert!(!skipped.use_as_attribute);
    }

    #[test]
    fn test_product_type_markers() {
        assert_eq!(ProductType::Variable.as_str(), "variable");
        assert_eq!(ProductType::Variable.post_type(), "product");
        assert_eq!(ProductType::Variation.as_str(), "variation");
        assert_eq!(ProductType::Variation.post_type(), "product_variation");
    }
}
