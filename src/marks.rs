use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::roster::StudentRecord;

/// Subjects recognised by their exact column name, in display order.
pub const FIXED_SUBJECTS: [&str; 5] = [
    "Data Structures",
    "Algorithms",
    "Database Systems",
    "Operating Systems",
    "Computer Networks",
];

lazy_static! {
    /// Any other column named `sub_<Subject>` carries a mark for `<Subject>`.
    static ref SUBJECT_COLUMN_REGEX: Regex = Regex::new(r"^sub_(.+)$").unwrap();
}

/// One subject and the mark a student obtained in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectMark {
    pub subject: String,
    pub mark: f64,
}

/// A column of the input table that holds marks.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectColumn {
    pub index: usize,
    pub subject: String,
}

/// Work out which columns carry marks.
///
/// Fixed subjects come first in their canonical order, followed by
/// prefixed columns in the order they appear in the header row.
pub fn subject_columns(headers: &[String]) -> Vec<SubjectColumn> {
    let fixed = FIXED_SUBJECTS.iter().filter_map(|subject| {
        headers
            .iter()
            .position(|h| h == subject)
            .map(|index| SubjectColumn {
                index,
                subject: subject.to_string(),
            })
    });

    let prefixed = headers.iter().enumerate().filter_map(|(index, h)| {
        SUBJECT_COLUMN_REGEX.captures(h).map(|caps| SubjectColumn {
            index,
            subject: caps[1].to_string(),
        })
    });

    fixed.chain(prefixed).collect()
}

/// Add a mark, replacing any earlier mark for the same subject in place.
pub fn insert_mark(marks: &mut Vec<SubjectMark>, subject: &str, mark: f64) {
    match marks.iter_mut().find(|m| m.subject == subject) {
        Some(existing) => existing.mark = mark,
        None => marks.push(SubjectMark {
            subject: subject.to_string(),
            mark,
        }),
    }
}

/// Percentage score of a student: the mean of all marks, rounded half to even.
///
/// A student without any mark scores 0.
pub fn score(record: &StudentRecord) -> i64 {
    average(&record.marks)
}

fn average(marks: &[SubjectMark]) -> i64 {
    if marks.is_empty() {
        return 0;
    }
    let total: f64 = marks.iter().map(|m| m.mark).sum();
    (total / marks.len() as f64).round_ties_even() as i64
}
