use std::fmt;
use std::path::{Path, PathBuf};

/// Tables longer than this are shown head-and-tail only.
const MAX_RENDERED_ROWS: usize = 60;
/// Rows shown at each end of a truncated table.
const TRUNCATED_EDGE_ROWS: usize = 5;

/// A file received with a request, persisted for the lifetime of that request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub path: PathBuf,
    pub original_name: String,
}

impl UploadedFile {
    pub fn new(path: impl Into<PathBuf>, original_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            original_name: original_name.into(),
        }
    }

    /// Lower-cased extension of the stored file, empty when it has none.
    pub fn extension(&self) -> String {
        extension_of(&self.path)
    }
}

/// Lower-cased extension of `path` without the leading dot.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// A single typed cell of a [`Table`].
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Null,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(i) => write!(f, "{}", i),
            Cell::Float(v) if v.is_nan() => f.write_str("NaN"),
            Cell::Float(v) if v.is_infinite() => {
                f.write_str(if *v > 0.0 { "inf" } else { "-inf" })
            }
            Cell::Float(v) => f.write_str(&float_repr(*v)),
            Cell::Bool(true) => f.write_str("True"),
            Cell::Bool(false) => f.write_str("False"),
            Cell::Str(s) => f.write_str(s),
            Cell::Null => f.write_str("NaN"),
        }
    }
}

impl Cell {
    /// Text form of the value on its own, outside a rendered table.
    ///
    /// Missing values read as `nan` here while tables show them as `NaN`.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Null => "nan".to_string(),
            Cell::Float(v) if v.is_nan() => "nan".to_string(),
            other => other.to_string(),
        }
    }
}

/// Shortest round-trip text for a finite float, switching to exponent form
/// (`1e-05`, `1.5e+20`) below 1e-4 or from 1e16 up.
fn float_repr(v: f64) -> String {
    let sci = format!("{:e}", v);
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return sci;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if v != 0.0 && !(-4..16).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", mantissa, sign, exponent.abs());
    }

    let plain = v.to_string();
    if plain.contains('.') {
        plain
    } else {
        format!("{}.0", plain)
    }
}

/// Rows of named-column values loaded from a CSV file or a worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the column named exactly `name` (case-sensitive).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` in column `name`.
    pub fn cell(&self, row: usize, name: &str) -> Option<&Cell> {
        let col = self.column_index(name)?;
        self.rows.get(row)?.get(col)
    }

    /// Indices of the rows that are shown when rendering, `None` marking the elision.
    fn visible_rows(&self) -> Vec<Option<usize>> {
        let n = self.rows.len();
        if n <= MAX_RENDERED_ROWS {
            return (0..n).map(Some).collect();
        }
        (0..TRUNCATED_EDGE_ROWS)
            .map(Some)
            .chain(std::iter::once(None))
            .chain((n - TRUNCATED_EDGE_ROWS..n).map(Some))
            .collect()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            writeln!(f, "Empty DataFrame")?;
            writeln!(f, "Columns: [{}]", self.columns.join(", "))?;
            return write!(f, "Index: []");
        }

        let visible = self.visible_rows();
        let rendered: Vec<(String, Vec<String>)> = visible
            .iter()
            .map(|slot| match slot {
                Some(i) => (
                    i.to_string(),
                    (0..self.columns.len())
                        .map(|c| {
                            self.rows[*i]
                                .get(c)
                                .map(Cell::to_string)
                                .unwrap_or_else(|| Cell::Null.to_string())
                        })
                        .collect(),
                ),
                None => ("..".to_string(), vec!["...".to_string(); self.columns.len()]),
            })
            .collect();

        let index_width = rendered.iter().map(|(idx, _)| idx.len()).max().unwrap_or(0);
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(c, name)| {
                rendered
                    .iter()
                    .map(|(_, cells)| cells[c].chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:index_width$}", "")?;
        for (name, width) in self.columns.iter().zip(widths.iter().copied()) {
            write!(f, "  {:>width$}", name)?;
        }
        for (idx, cells) in &rendered {
            write!(f, "\n{:<index_width$}", idx)?;
            for (cell, width) in cells.iter().zip(widths.iter().copied()) {
                write!(f, "  {:>width$}", cell)?;
            }
        }
        if visible.len() < self.rows.len() {
            write!(
                f,
                "\n\n[{} rows x {} columns]",
                self.rows.len(),
                self.columns.len()
            )?;
        }
        Ok(())
    }
}

/// What a file turned into after extraction.
///
/// Failures are carried as [`ExtractedContent::Message`] so that callers always
/// receive something they can hand to the model.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractedContent {
    Table(Table),
    Text(String),
    Structured(serde_json::Value),
    Message(String),
}

impl fmt::Display for ExtractedContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractedContent::Table(table) => fmt::Display::fmt(table, f),
            ExtractedContent::Text(text) | ExtractedContent::Message(text) => f.write_str(text),
            ExtractedContent::Structured(value) => {
                let pretty = serde_json::to_string_pretty(value).map_err(|_| fmt::Error)?;
                f.write_str(&pretty)
            }
        }
    }
}
