//! Workbook reader (`.xlsx`, `.xls`, `.ods`, ...).
//!
//! The first row of the chosen worksheet is the header row.

use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;

use crate::error::{SourceError, SourceResult};
use crate::models::{format_number, CellValue, Dataset, SourceRow};
use super::normalize_headers;

/// Worksheet names in workbook order.
pub fn sheet_names(path: &Path) -> SourceResult<Vec<String>> {
    let workbook = open_workbook_auto(path)?;
    Ok(workbook.sheet_names().to_vec())
}

/// Read one worksheet; the first sheet when `sheet` is `None`.
///
/// Returns the dataset and the name of the sheet that was read.
pub fn read_workbook(path: &Path, sheet: Option<&str>) -> SourceResult<(Dataset, String)> {
    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names().to_vec();

    let name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| SourceError::SheetNotFound(wanted.to_string()))?,
        None => names.first().cloned().ok_or(SourceError::NoHeaders)?,
    };

    let range = workbook.worksheet_range(&name)?;
    Ok((range_to_dataset(&range)?, name))
}

/// Convert a cell to the dataset's value model.
pub fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Absent,
        Data::String(s) if s.is_empty() => CellValue::Absent,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(if *b { "True" } else { "False" }.to_string()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
    }
}

fn header_text(cell: &Data) -> String {
    match cell_value(cell) {
        CellValue::Number(n) => format_number(n),
        other => other.to_text().into_owned(),
    }
}

/// Convert a worksheet range into a dataset.
pub fn range_to_dataset(range: &Range<Data>) -> SourceResult<Dataset> {
    let mut rows = range.rows();
    let header_row = rows.next().ok_or(SourceError::EmptyFile)?;
    let headers = normalize_headers(header_row.iter().map(header_text));
    if headers.iter().all(|h| h.is_empty()) {
        return Err(SourceError::NoHeaders);
    }

    let data = rows
        .map(|row| {
            let values = (0..headers.len())
                .map(|i| row.get(i).map(cell_value).unwrap_or(CellValue::Absent))
                .collect();
            SourceRow::new(values)
        })
        .filter(|row| row.values.iter().any(|v| !v.is_blank()))
        .collect();

    Ok(Dataset::new(headers, data))
}
