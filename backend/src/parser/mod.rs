//! Spreadsheet readers with encoding and delimiter auto-detection.
//!
//! Delimited text (`.csv`, `.tsv`, `.txt`) is decoded after charset detection
//! and split on the delimiter found in the header line. Workbooks are read
//! through [`xlsx`]. Both produce a typed [`Dataset`].

pub mod xlsx;

use std::collections::HashMap;
use std::path::Path;

use crate::error::{SourceError, SourceResult};
use crate::models::{CellValue, Dataset, SourceRow};

/// Kind of input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Delimited,
    Workbook,
}

impl SourceFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> SourceResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "tsv" | "txt" => Ok(Self::Delimited),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Workbook),
            _ => Err(SourceError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Result of reading a source, with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub dataset: Dataset,
    /// Detected encoding (`"xlsx"` for workbooks)
    pub encoding: String,
    /// Detected delimiter, `None` for workbooks
    pub delimiter: Option<char>,
    /// Worksheet read, `None` for delimited text
    pub sheet: Option<String>,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(bytes);
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        // UTF-8 and anything unknown: lossy UTF-8
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ';';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Trim header names and disambiguate duplicates with `.1`, `.2`, ...
pub fn normalize_headers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.into_iter()
        .map(|h| {
            let name = h.as_ref().trim().to_string();
            let count = seen.entry(name.clone()).or_insert(0);
            let unique = if *count == 0 {
                name
            } else {
                format!("{}.{}", name, count)
            };
            *count += 1;
            unique
        })
        .collect()
}

/// Parse delimited text with an explicit delimiter.
///
/// # Example
/// ```ignore
/// use hne_import::parser::parse_delimited;
///
/// let ds = parse_delimited("SKU;Size\nA1;S\nA2;M", ';').unwrap();
/// assert_eq!(ds.len(), 2);
/// ```
pub fn parse_delimited(content: &str, delimiter: char) -> SourceResult<Dataset> {
    if content.trim().is_empty() {
        return Err(SourceError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = normalize_headers(reader.headers()?.iter());
    if headers.iter().all(|h| h.is_empty()) {
        return Err(SourceError::NoHeaders);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }
        let values = (0..headers.len())
            .map(|i| CellValue::infer(record.get(i).unwrap_or("")))
            .collect();
        rows.push(SourceRow::new(values));
    }

    Ok(Dataset::new(headers, rows))
}

/// Parse delimited bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> SourceResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);
    let dataset = parse_delimited(&content, delimiter)?;

    Ok(ParseResult {
        dataset,
        encoding,
        delimiter: Some(delimiter),
        sheet: None,
    })
}

/// Read any supported spreadsheet file.
///
/// `sheet` selects a worksheet in workbooks and is ignored for delimited text.
pub fn read_source(path: &Path, sheet: Option<&str>) -> SourceResult<ParseResult> {
    match SourceFormat::from_path(path)? {
        SourceFormat::Delimited => {
            let bytes = std::fs::read(path)?;
            parse_bytes_auto(&bytes)
        }
        SourceFormat::Workbook => {
            let (dataset, sheet) = xlsx::read_workbook(path, sheet)?;
            Ok(ParseResult {
                dataset,
                encoding: "xlsx".to_string(),
                delimiter: None,
                sheet: Some(sheet),
            })
        }
    }
}
