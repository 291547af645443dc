//! Attribute classification.
//!
//! Finds the columns that can serve as product attributes and turns the
//! caller's per-column decisions into the fixed [`AttributeConfig`] set used
//! for the whole run.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::config::WELL_KNOWN_COLUMNS;
use crate::error::{TransformError, TransformResult};
use crate::logs::log_warning;
use crate::models::{AttributeConfig, AttributeDecision, CellValue, ColumnRoles, Dataset};
use super::clean::slugify;

/// A column that may be used as an attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateColumn {
    pub name: String,
    /// Non-blank values in first-appearance order, as written in the source.
    pub distinct_values: Vec<String>,
}

impl CandidateColumn {
    /// Up to `limit` values for display, plus how many were left out.
    pub fn preview(&self, limit: usize) -> (Vec<&str>, usize) {
        let shown = self.distinct_values.iter().take(limit).map(String::as_str).collect();
        let hidden = self.distinct_values.len().saturating_sub(limit);
        (shown, hidden)
    }
}

/// Role columns plus the well-known non-attribute fields.
pub fn essential_columns(roles: &ColumnRoles) -> HashSet<&str> {
    let mut essential: HashSet<&str> = WELL_KNOWN_COLUMNS.iter().copied().collect();
    essential.insert(&roles.sku);
    essential.insert(&roles.product);
    essential.insert(&roles.category);
    essential
}

/// Every non-absent cell holds a number, whatever its spelling (`2.00`, `00123`).
/// A column with no values counts as numeric.
fn is_numeric_column<'a>(mut cells: impl Iterator<Item = &'a CellValue>) -> bool {
    cells.all(|c| c.is_absent() || c.is_numeric())
}

/// Non-blank values of a column, deduplicated, first-appearance order.
fn observed_values<'a>(cells: impl Iterator<Item = &'a CellValue>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for cell in cells {
        if cell.is_blank() {
            continue;
        }
        let text = cell.to_text().into_owned();
        if seen.insert(text.clone()) {
            values.push(text);
        }
    }
    values
}

/// Candidate attribute columns, in dataset column order.
///
/// A column qualifies when it is not essential and its values are not uniformly numeric.
pub fn classify(dataset: &Dataset, roles: &ColumnRoles) -> Vec<CandidateColumn> {
    let essential = essential_columns(roles);

    dataset
        .headers
        .iter()
        .filter(|h| !essential.contains(h.as_str()))
        .filter(|h| !is_numeric_column(dataset.column(h)))
        .map(|h| CandidateColumn {
            name: h.clone(),
            distinct_values: observed_values(dataset.column(h)),
        })
        .collect()
}

/// Apply decisions to the candidates and build the attribute set.
///
/// Candidates without a decision get [`AttributeDecision::default`]. A column whose
/// slug is already taken by an earlier column is skipped. Fails when nothing is left.
pub fn configure<F>(candidates: &[CandidateColumn], decide: F) -> TransformResult<Vec<AttributeConfig>>
where
    F: Fn(&str) -> Option<AttributeDecision>,
{
    let mut slugs: HashMap<String, String> = HashMap::new();
    let mut attributes = Vec::new();

    for candidate in candidates {
        let decision = decide(&candidate.name).unwrap_or_default();
        if !decision.use_as_attribute {
            continue;
        }

        let slug = slugify(&candidate.name);
        if let Some(owner) = slugs.get(&slug) {
            log_warning(format!(
                "Column '{}' skipped: slug '{}' already used by '{}'",
                candidate.name, slug, owner
            ));
            continue;
        }
        slugs.insert(slug.clone(), candidate.name.clone());

        attributes.push(AttributeConfig {
            column: candidate.name.clone(),
            slug,
            distinct_values: candidate.distinct_values.clone(),
            is_variation: decision.is_variation,
            visible_info: decision.visible_info,
        });
    }

    if attributes.is_empty() {
        return Err(TransformError::EmptyAttributeConfiguration);
    }
    Ok(attributes)
}
