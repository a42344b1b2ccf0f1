use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

use crate::error::LoadError;
use crate::loader::{self, CellValue, Table};
use crate::marks::{self, SubjectMark};

pub const ROLL_NUMBER: &str = "rollNumber";
pub const HALL_TICKET: &str = "hallTicket";
pub const FIRST_NAME: &str = "firstName";
pub const LAST_NAME: &str = "lastName";
pub const PHONE_NUMBER: &str = "phoneNumber";
pub const PARENT_PHONE: &str = "parentPhone";
pub const CITY: &str = "city";
pub const PHOTO: &str = "photo";

/// One row of the student table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub roll_number: String,
    pub hall_ticket: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub parent_phone: String,
    pub city: String,
    pub photo: Option<String>,
    pub marks: Vec<SubjectMark>,
}

/// How range searches compare roll numbers against their bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum RangeOrdering {
    /// Plain string comparison, so `"1000"` sorts between `"100"` and `"105"`.
    #[default]
    Lexical,
    /// Integer comparison when the roll number and both bounds are integers.
    Numeric,
}

impl RangeOrdering {
    /// Whether `roll_number` lies in `[start, end]`.
    ///
    /// Numeric mode compares integers only when all three values parse;
    /// otherwise both bounds are checked as strings.
    fn contains(self, roll_number: &str, start: &str, end: &str) -> bool {
        let numeric = match self {
            RangeOrdering::Lexical => None,
            RangeOrdering::Numeric => match (
                roll_number.parse::<i128>(),
                start.parse::<i128>(),
                end.parse::<i128>(),
            ) {
                (Ok(id), Ok(lo), Ok(hi)) => Some((id, lo, hi)),
                _ => None,
            },
        };

        match numeric {
            Some((id, lo, hi)) => lo <= id && id <= hi,
            None => start <= roll_number && roll_number <= end,
        }
    }
}

/// All students, sorted by roll number. Read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    records: Vec<StudentRecord>,
}

impl Roster {
    /// Read the student table from `path` (CSV or Excel workbook).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let table = loader::load_table(path)?;
        Self::from_table(&table)
    }

    /// Build a roster from an already-parsed table.
    pub fn from_table(table: &Table) -> Result<Self, LoadError> {
        let required = |name: &'static str| table.column(name).ok_or(LoadError::MissingColumn(name));

        let roll = required(ROLL_NUMBER)?;
        let hall = required(HALL_TICKET)?;
        let first = required(FIRST_NAME)?;
        let last = required(LAST_NAME)?;
        let phone = required(PHONE_NUMBER)?;
        let parent = required(PARENT_PHONE)?;
        let city = required(CITY)?;
        let photo = table.column(PHOTO);
        let subject_columns = marks::subject_columns(&table.headers);

        let mut records = Vec::with_capacity(table.rows.len());
        for (i, row) in table.rows.iter().enumerate() {
            if row.iter().all(CellValue::is_empty) {
                continue;
            }
            // Spreadsheet row number, counting the header as row 1
            let row_number = i + 2;
            let text = |index: usize| row.get(index).map(CellValue::to_text).unwrap_or_default();

            let roll_number = text(roll);
            if roll_number.is_empty() {
                return Err(LoadError::Malformed {
                    row: row_number,
                    message: format!("empty `{}`", ROLL_NUMBER),
                });
            }

            let mut record_marks = Vec::new();
            for column in &subject_columns {
                let cell = row.get(column.index).unwrap_or(&CellValue::Empty);
                let mark = cell.to_number().map_err(|value| LoadError::InvalidMark {
                    row: row_number,
                    column: table.headers[column.index].clone(),
                    value,
                })?;
                if let Some(mark) = mark {
                    marks::insert_mark(&mut record_marks, &column.subject, mark);
                }
            }

            records.push(StudentRecord {
                roll_number,
                hall_ticket: text(hall),
                first_name: text(first),
                last_name: text(last),
                phone_number: text(phone),
                parent_phone: text(parent),
                city: text(city),
                photo: photo.map(text).filter(|p| !p.is_empty()),
                marks: record_marks,
            });
        }

        Self::from_records(records)
    }

    /// Sort records by roll number, rejecting duplicates.
    pub fn from_records(mut records: Vec<StudentRecord>) -> Result<Self, LoadError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.roll_number.as_str()) {
                return Err(LoadError::DuplicateIdentifier(record.roll_number.clone()));
            }
        }

        records.sort_by(|a, b| a.roll_number.cmp(&b.roll_number));
        Ok(Roster { records })
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index of the record with exactly this roll number.
    pub fn position(&self, roll_number: &str) -> Option<usize> {
        self.records
            .binary_search_by(|r| r.roll_number.as_str().cmp(roll_number))
            .ok()
    }

    pub fn get(&self, roll_number: &str) -> Option<&StudentRecord> {
        self.position(roll_number).map(|i| &self.records[i])
    }

    pub fn at(&self, index: usize) -> Option<&StudentRecord> {
        self.records.get(index)
    }

    /// Records whose roll number lies in `[start, end]`, in roster order.
    pub fn range(&self, start: &str, end: &str, ordering: RangeOrdering) -> Vec<&StudentRecord> {
        self.records
            .iter()
            .filter(|r| ordering.contains(&r.roll_number, start, end))
            .collect()
    }
}
