//! Value-cleaning helpers shared by the classifier and the flattener.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use crate::models::CellValue;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Clean one attribute cell.
///
/// Text projection, commas become pipes, all whitespace is removed.
/// Returns `None` for absent cells and for values that clean to nothing.
pub fn clean_value(cell: &CellValue) -> Option<String> {
    if cell.is_absent() {
        return None;
    }
    let text = cell.to_text().replace(',', "|");
    let cleaned = WHITESPACE.replace_all(&text, "").into_owned();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Split a cleaned value into its pipe-separated tokens.
pub fn split_values(cleaned: &str) -> impl Iterator<Item = &str> {
    cleaned.split('|').filter(|t| !t.is_empty())
}

/// Sorted, deduplicated tokens of a set of cleaned values.
pub fn distinct_values<'a, I>(cleaned: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    cleaned
        .into_iter()
        .flat_map(split_values)
        .map(str::to_string)
        .collect()
}

/// Pipe-joined form of a sorted value set.
pub fn join_values(values: &BTreeSet<String>) -> String {
    values.iter().map(String::as_str).collect::<Vec<_>>().join("|")
}

/// Output slug for a column name: lowercase, spaces become hyphens.
pub fn slugify(column: &str) -> String {
    column.to_lowercase().replace(' ', "-")
}

/// SKU prefix for a brand: uppercase, whitespace removed.
pub fn brand_prefix(brand: &str) -> String {
    WHITESPACE.replace_all(&brand.to_uppercase(), "").into_owned()
}
