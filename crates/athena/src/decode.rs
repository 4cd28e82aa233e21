//! Decoding of fetched result objects: CSV into [`Table`], statement
//! output into text.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::AthenaError;
use crate::result::{Cell, ColumnType, Table, TableColumn};

/// Per-column type hints for one query, keyed by column name.
pub type TypeHints = HashMap<String, ColumnType>;

/// Tokens read as NULL unless `keep_default_na` is off.
pub const DEFAULT_NA_VALUES: &[&str] = &["", "NA", "N/A", "NULL", "null", "NaN", "nan"];

/// Parsing options passed straight through to the CSV reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    pub delimiter: u8,
    /// First record names the columns; otherwise columns are `0..n`.
    pub has_headers: bool,
    /// Extra tokens read as NULL.
    pub na_values: Vec<String>,
    pub keep_default_na: bool,
    /// Accept records with a varying number of fields.
    pub flexible: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
            na_values: Vec::new(),
            keep_default_na: true,
            flexible: false,
        }
    }
}

impl ReadOptions {
    fn is_na(&self, raw: &str) -> bool {
        (self.keep_default_na && DEFAULT_NA_VALUES.contains(&raw))
            || self.na_values.iter().any(|na| na == raw)
    }
}

/// Decode a CSV result object into a [`Table`].
///
/// Columns named in `hints` are parsed as the hinted type and fail on a
/// value that does not fit. Other columns are inferred: integer, then
/// float, then boolean, falling back to text.
pub fn decode_csv(
    data: &[u8],
    hints: Option<&TypeHints>,
    options: &ReadOptions,
) -> Result<Table, AthenaError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(options.has_headers)
        .flexible(options.flexible)
        .from_reader(data);

    let mut names: Vec<String> = if options.has_headers {
        reader
            .headers()
            .map_err(|e| AthenaError::Decode(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect()
    } else {
        Vec::new()
    };

    let mut raw_rows: Vec<Vec<Option<String>>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AthenaError::Decode(e.to_string()))?;
        let row: Vec<Option<String>> = record
            .iter()
            .map(|field| (!options.is_na(field)).then(|| field.to_string()))
            .collect();
        while names.len() < row.len() {
            names.push(names.len().to_string());
        }
        raw_rows.push(row);
    }

    let columns: Vec<TableColumn> = names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let data_type = hints
                .and_then(|h| h.get(&name).copied())
                .unwrap_or_else(|| infer_type(raw_rows.iter().filter_map(|r| r.get(idx)?.as_deref())));
            TableColumn { name, data_type }
        })
        .collect();

    let mut rows = Vec::with_capacity(raw_rows.len());
    for raw in raw_rows {
        let mut row = Vec::with_capacity(columns.len());
        for (idx, col) in columns.iter().enumerate() {
            let cell = match raw.get(idx).and_then(Option::as_deref) {
                None => Cell::Null,
                Some(value) => parse_cell(value, col)?,
            };
            row.push(cell);
        }
        rows.push(row);
    }

    Ok(Table { columns, rows })
}

/// Decode a statement output object as UTF-8 text.
pub fn decode_text(data: &[u8]) -> Result<String, AthenaError> {
    String::from_utf8(data.to_vec()).map_err(|e| AthenaError::Decode(e.to_string()))
}

fn infer_type<'a>(values: impl Iterator<Item = &'a str> + Clone) -> ColumnType {
    let mut values = values.peekable();
    if values.peek().is_none() {
        return ColumnType::Text;
    }
    if values.clone().all(|v| v.parse::<i64>().is_ok()) {
        ColumnType::Int
    } else if values.clone().all(|v| v.parse::<f64>().is_ok()) {
        ColumnType::Float
    } else if values.all(|v| parse_bool(v).is_some()) {
        ColumnType::Bool
    } else {
        ColumnType::Text
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

fn parse_cell(value: &str, col: &TableColumn) -> Result<Cell, AthenaError> {
    let mismatch = || {
        AthenaError::Decode(format!(
            "column '{}': cannot read '{}' as {:?}",
            col.name, value, col.data_type
        ))
    };
    Ok(match col.data_type {
        ColumnType::Text => Cell::Text(value.to_string()),
        ColumnType::Int => Cell::Int(value.parse().map_err(|_| mismatch())?),
        ColumnType::Float => Cell::Float(value.parse().map_err(|_| mismatch())?),
        ColumnType::Bool => Cell::Bool(parse_bool(value).ok_or_else(mismatch)?),
    })
}
