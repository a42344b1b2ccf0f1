use serde::{Deserialize, Serialize};

use crate::files::DirectoryEntry;
use crate::marks::{self, SubjectMark};
use crate::roster::StudentRecord;

/// URL prefix under which student photos are served.
pub const PHOTO_URL_PREFIX: &str = "/static/photos/";

/// Everything shown about a single student.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub roll_number: String,
    pub hall_ticket: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub parent_phone: String,
    pub city: String,
    /// Photo URL, or empty when the student has no photo.
    pub photo: String,
    pub marks: Vec<SubjectMark>,
    pub percentage: i64,
}

impl From<&StudentRecord> for StudentProfile {
    fn from(record: &StudentRecord) -> Self {
        StudentProfile {
            roll_number: record.roll_number.clone(),
            hall_ticket: record.hall_ticket.clone(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            phone_number: record.phone_number.clone(),
            parent_phone: record.parent_phone.clone(),
            city: record.city.clone(),
            photo: record
                .photo
                .as_deref()
                .map(|p| format!("{}{}", PHOTO_URL_PREFIX, urlencoding::encode(p)))
                .unwrap_or_default(),
            marks: record.marks.clone(),
            percentage: marks::score(record),
        }
    }
}

/// One line of the roster table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub roll_number: String,
    pub first_name: String,
    pub last_name: String,
    pub percentage: i64,
}

impl From<&StudentRecord> for StudentSummary {
    fn from(record: &StudentRecord) -> Self {
        StudentSummary {
            roll_number: record.roll_number.clone(),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            percentage: marks::score(record),
        }
    }
}

/// The model every page is rendered from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalView {
    pub student: Option<StudentProfile>,
    pub students: Option<Vec<StudentSummary>>,
    pub directory_listing: Vec<DirectoryEntry>,
    pub current_path: String,
}

/// Search form posted to `/`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchForm {
    #[serde(default)]
    pub roll_number: Option<String>,
    #[serde(default)]
    pub start_roll_number: Option<String>,
    #[serde(default)]
    pub end_roll_number: Option<String>,
}

/// What a search form asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Search {
    All,
    Single(String),
    Range { start: String, end: String },
}

impl SearchForm {
    /// A roll number wins over a range; a range needs both bounds.
    pub fn search(&self) -> Search {
        fn field(value: &Option<String>) -> Option<&str> {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty())
        }

        if let Some(roll) = field(&self.roll_number) {
            return Search::Single(roll.to_string());
        }
        match (field(&self.start_roll_number), field(&self.end_roll_number)) {
            (Some(start), Some(end)) => Search::Range {
                start: start.to_string(),
                end: end.to_string(),
            },
            _ => Search::All,
        }
    }
}
