use crate::error::LoadError;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A single cell as it was read from the input file.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    /// Render the cell the way it is displayed to users.
    ///
    /// Integral numbers drop their fractional part so that a roll number read
    /// from a workbook as `101.0` becomes `"101"`.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            CellValue::Number(n) => n.to_string(),
        }
    }

    /// Interpret the cell as a mark. `Ok(None)` means the cell is blank.
    pub fn to_number(&self) -> Result<Option<f64>, String> {
        match self {
            CellValue::Empty => Ok(None),
            CellValue::Number(n) if n.is_finite() => Ok(Some(*n)),
            CellValue::Number(n) => Err(n.to_string()),
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                // `f64::from_str` accepts "NaN" and "inf", which are not marks.
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .map(Some)
                    .ok_or_else(|| trimmed.to_string())
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }
}

/// Header row plus data rows, exactly as they appear in the source file.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Load a table from a CSV file
///
/// The first non-blank line is the header row. Quoted fields may contain
/// commas and doubled quotes; every field is kept as text.
pub fn from_csv(filepath: impl AsRef<Path>) -> Result<Table, LoadError> {
    let path = filepath.as_ref();
    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    let reader = BufReader::new(file);
    let lines: Vec<String> = reader.lines().collect::<Result<_, _>>().map_err(io_err)?;

    let mut lines = lines.into_iter().filter(|line| !line.trim().is_empty());

    let header_line = lines.next().ok_or_else(|| LoadError::Empty(path.to_path_buf()))?;
    let headers = parse_csv_row(header_line.trim_start_matches('\u{feff}'))
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    let rows = lines
        .map(|line| {
            parse_csv_row(&line)
                .into_iter()
                .map(|field| {
                    if field.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(field)
                    }
                })
                .collect()
        })
        .collect();

    Ok(Table { headers, rows })
}

/// Load a table from the first worksheet of an Excel (or OpenDocument) workbook
pub fn from_excel(filepath: impl AsRef<Path>) -> Result<Table, LoadError> {
    use calamine::{Data, Reader, open_workbook_auto};

    let path = filepath.as_ref();
    let workbook_err = |source| LoadError::Workbook {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(workbook_err)?;

    // Get the first worksheet
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| LoadError::Empty(path.to_path_buf()))?;

    let range = workbook.worksheet_range(&sheet_name).map_err(workbook_err)?;

    let mut rows = range.rows().map(|row| {
        row.iter()
            .map(|cell| match cell {
                Data::Empty => CellValue::Empty,
                Data::Int(i) => CellValue::Number(*i as f64),
                Data::Float(f) => CellValue::Number(*f),
                Data::String(s) => CellValue::Text(s.clone()),
                other => CellValue::Text(other.to_string()),
            })
            .collect::<Vec<_>>()
    });

    let headers = rows
        .next()
        .ok_or_else(|| LoadError::Empty(path.to_path_buf()))?
        .iter()
        .map(CellValue::to_text)
        .collect();

    Ok(Table {
        headers,
        rows: rows.collect(),
    })
}

// Parse a CSV row into a vector of strings
fn parse_csv_row(line: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    // Doubled quote inside a quoted field
                    current_field.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                result.push(std::mem::take(&mut current_field));
            }
            '\r' if !in_quotes && chars.peek().is_none() => {}
            _ => current_field.push(c),
        }
    }

    result.push(current_field);
    result
}

/// Detect file type and load appropriate format
pub fn load_table(filepath: impl AsRef<Path>) -> Result<Table, LoadError> {
    let path = filepath.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("csv") => from_csv(path),
        Some("xlsx") | Some("xlsm") | Some("xls") | Some("ods") => from_excel(path),
        Some(ext) => Err(LoadError::UnsupportedFormat(ext.to_string())),
        None => Err(LoadError::UnsupportedFormat(String::new())),
    }
}
