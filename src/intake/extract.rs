use super::error::ExtractionError;
use super::schema::{extension_of, Cell, ExtractedContent, Table};
use calamine::{open_workbook_auto, Data, Reader};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Extensions read as plain text.
const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "py", "java", "c", "cpp", "html", "css", "js"];

/// Cell values treated as missing when loading CSV files.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Turn a file into something the prompt builder can render.
///
/// The handler is chosen from the lower-cased extension. Nothing here returns
/// an error: parse and read failures come back as [`ExtractedContent::Message`].
pub fn extract_content(path: &Path) -> ExtractedContent {
    let extension = extension_of(path);
    debug!(path = %path.display(), %extension, "Extracting file content");

    match extension.as_str() {
        "csv" => match load_csv(path) {
            Ok(table) => ExtractedContent::Table(table),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "CSV parse failed");
                ExtractedContent::Message(format!("Error processing CSV: {}", e))
            }
        },

        "xls" | "xlsx" => match load_spreadsheet(path) {
            Ok(table) => ExtractedContent::Table(table),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Spreadsheet parse failed");
                ExtractedContent::Message(format!("Error processing Excel file: {}", e))
            }
        },

        // Invalid JSON is still useful to the model as text
        "json" => match load_json(path) {
            Ok(value) => ExtractedContent::Structured(value),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "JSON parse failed, reading as text");
                read_text(path)
            }
        },

        ext if TEXT_EXTENSIONS.contains(&ext) => read_text(path),

        other => ExtractedContent::Message(format!(
            "File type {} not supported for detailed processing.",
            other
        )),
    }
}

/// Load a CSV file with a header row into a [`Table`].
///
/// Rows shorter than the header are padded with nulls; longer rows are an error.
pub fn load_csv(path: &Path) -> Result<Table, ExtractionError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if columns.is_empty() {
        return Err(ExtractionError::Malformed(
            "No columns to parse from file".to_string(),
        ));
    }

    let mut raw_columns: Vec<Vec<Option<String>>> = vec![Vec::new(); columns.len()];
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() > columns.len() {
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(i as u64 + 2);
            return Err(ExtractionError::Malformed(format!(
                "Error tokenizing data. Expected {} fields in line {}, saw {}",
                columns.len(),
                line,
                record.len()
            )));
        }
        for (c, column) in raw_columns.iter_mut().enumerate() {
            let value = record
                .get(c)
                .filter(|v| !NA_VALUES.contains(v))
                .map(str::to_string);
            column.push(value);
        }
    }

    let typed: Vec<Vec<Cell>> = raw_columns.into_iter().map(infer_column).collect();
    Ok(Table::new(columns, transpose(typed)))
}

/// Pick one type for a whole column of raw CSV values.
///
/// Integer columns with gaps become floats, mixed numeric columns become
/// floats, and anything with non-numeric text keeps the original strings.
fn infer_column(raw: Vec<Option<String>>) -> Vec<Cell> {
    let present = || raw.iter().flatten().map(|v| v.trim());
    let has_nulls = raw.iter().any(Option::is_none);

    if present().all(|v| v.parse::<i64>().is_ok()) && !has_nulls {
        return raw
            .iter()
            .flatten()
            .filter_map(|v| v.trim().parse().ok())
            .map(Cell::Int)
            .collect();
    }

    if present().all(|v| v.parse::<f64>().is_ok()) {
        return raw
            .iter()
            .map(|v| match v.as_deref().map(|v| v.trim().parse::<f64>()) {
                Some(Ok(f)) => Cell::Float(f),
                _ => Cell::Null,
            })
            .collect();
    }

    if present().all(|v| parse_bool(v).is_some()) {
        return raw
            .iter()
            .map(|v| v.as_deref().and_then(parse_bool).map_or(Cell::Null, Cell::Bool))
            .collect();
    }

    raw.into_iter().map(|v| v.map_or(Cell::Null, Cell::Str)).collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

fn transpose(columns: Vec<Vec<Cell>>) -> Vec<Vec<Cell>> {
    let height = columns.first().map_or(0, Vec::len);
    let mut rows: Vec<Vec<Cell>> = (0..height)
        .map(|_| Vec::with_capacity(columns.len()))
        .collect();
    for column in columns {
        for (row, cell) in rows.iter_mut().zip(column) {
            row.push(cell);
        }
    }
    rows
}

/// Load the first worksheet of a workbook; its first row names the columns.
fn load_spreadsheet(path: &Path) -> Result<Table, ExtractionError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ExtractionError::Malformed("Workbook has no worksheets".to_string()))?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let columns: Vec<String> = match rows.next() {
        Some(header) => header
            .iter()
            .enumerate()
            .map(|(j, cell)| match cell_to_cell(cell) {
                Cell::Null => format!("Unnamed: {}", j),
                named => named.to_string(),
            })
            .collect(),
        None => {
            return Err(ExtractionError::Malformed(
                "No columns to parse from file".to_string(),
            ))
        }
    };

    let mut typed: Vec<Vec<Cell>> = vec![Vec::new(); columns.len()];
    for row in rows {
        for (c, column) in typed.iter_mut().enumerate() {
            column.push(row.get(c).map_or(Cell::Null, cell_to_cell));
        }
    }

    let typed = typed.into_iter().map(promote_numeric).collect();
    Ok(Table::new(columns, transpose(typed)))
}

fn cell_to_cell(cell: &Data) -> Cell {
    match cell {
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::String(s) if s.is_empty() => Cell::Null,
        Data::String(s) => Cell::Str(s.clone()),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Str(format!("{}", dt)),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Str(s.clone()),
        Data::Error(e) => Cell::Str(format!("#{:?}", e)),
        Data::Empty => Cell::Null,
    }
}

/// Workbooks store every number as a float; whole-number columns without
/// gaps read back as integers, other numeric columns as floats.
fn promote_numeric(column: Vec<Cell>) -> Vec<Cell> {
    let numeric = column
        .iter()
        .all(|c| matches!(c, Cell::Int(_) | Cell::Float(_) | Cell::Null));
    if !numeric {
        return column;
    }

    let integral = column.iter().all(|c| match c {
        Cell::Int(_) => true,
        Cell::Float(f) => f.fract() == 0.0 && f.abs() < i64::MAX as f64,
        _ => false,
    });
    column
        .into_iter()
        .map(|c| match c {
            Cell::Float(f) if integral => Cell::Int(f as i64),
            Cell::Int(i) if !integral => Cell::Float(i as f64),
            other => other,
        })
        .collect()
}

fn load_json(path: &Path) -> Result<serde_json::Value, ExtractionError> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| ExtractionError::Malformed(e.to_string()))
}

fn read_text(path: &Path) -> ExtractedContent {
    match fs::read(path) {
        Ok(bytes) => ExtractedContent::Text(decode_text(bytes)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Text read failed");
            ExtractedContent::Message(format!("Error reading file: {}", e))
        }
    }
}

/// Decode as UTF-8, falling back to ISO-8859-1, which maps every byte.
fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => encoding_rs::mem::decode_latin1(e.as_bytes()).into_owned(),
    }
}
