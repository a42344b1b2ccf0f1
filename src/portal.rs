use crate::cursor::SessionStore;
use crate::error::BrowseError;
use crate::files::{DirectoryEntry, FileLister};
use crate::roster::{RangeOrdering, Roster};
use crate::views::{PortalView, Search, StudentProfile, StudentSummary};

/// Path shown for the browse root.
pub const ROOT_PATH: &str = ".";

/// The roster, session cursors and file lister the handlers work against.
#[derive(Debug)]
pub struct Portal {
    roster: Roster,
    sessions: SessionStore,
    files: FileLister,
    range_ordering: RangeOrdering,
}

impl Portal {
    pub fn new(
        roster: Roster,
        sessions: SessionStore,
        files: FileLister,
        range_ordering: RangeOrdering,
    ) -> Self {
        Portal {
            roster,
            sessions,
            files,
            range_ordering,
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn files(&self) -> &FileLister {
        &self.files
    }

    /// The landing page, optionally narrowed by a search.
    ///
    /// A single-student search moves the session cursor to the searched roll
    /// number whether or not it exists; `session_id` must be present for it.
    pub fn index(&self, search: &Search, session_id: Option<&str>) -> PortalView {
        let mut student = None;
        let students = match search {
            Search::Single(roll) => {
                if let Some(session_id) = session_id {
                    self.sessions.set(session_id, roll);
                }
                student = self.roster.get(roll).map(StudentProfile::from);
                self.summary_of_all()
            }
            Search::Range { start, end } => self
                .roster
                .range(start, end, self.range_ordering)
                .into_iter()
                .map(StudentSummary::from)
                .collect(),
            Search::All => self.summary_of_all(),
        };

        PortalView {
            student,
            students: Some(students),
            directory_listing: self.root_listing(),
            current_path: ROOT_PATH.to_string(),
        }
    }

    /// The student after the session's cursor, advancing the cursor.
    pub fn next(&self, session_id: Option<&str>) -> PortalView {
        let student = session_id
            .and_then(|id| self.sessions.next(id, &self.roster))
            .map(StudentProfile::from);

        PortalView {
            student,
            students: None,
            directory_listing: self.root_listing(),
            current_path: ROOT_PATH.to_string(),
        }
    }

    /// A directory below the browse root.
    pub fn browse(&self, relative: &str) -> Result<PortalView, BrowseError> {
        let directory_listing = self.files.list(relative)?;
        Ok(PortalView {
            student: None,
            students: None,
            directory_listing,
            current_path: relative.to_string(),
        })
    }

    fn summary_of_all(&self) -> Vec<StudentSummary> {
        self.roster.records().iter().map(StudentSummary::from).collect()
    }

    fn root_listing(&self) -> Vec<DirectoryEntry> {
        // The root was readable at startup; if that changed, show an empty listing.
        self.files.list(ROOT_PATH).unwrap_or_else(|e| {
            log::warn!("failed to list browse root: {}", e);
            Vec::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::StudentRecord;
    use std::fs;

    fn record(id: &str, mark: f64) -> StudentRecord {
        StudentRecord {
            roll_number: id.to_string(),
            hall_ticket: format!("HT{id}"),
            first_name: format!("F{id}"),
            last_name: format!("L{id}"),
            phone_number: String::new(),
            parent_phone: String::new(),
            city: "Pune".into(),
            photo: None,
            marks: vec![crate::marks::SubjectMark {
                subject: "Algorithms".into(),
                mark,
            }],
        }
    }

    fn portal(ordering: RangeOrdering) -> (tempfile::TempDir, Portal) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("photos")).unwrap();
        fs::write(dir.path().join("students.csv"), "").unwrap();
        let roster = Roster::from_records(vec![
            record("103", 70.0),
            record("100", 40.0),
            record("1000", 90.0),
            record("105", 55.0),
        ])
        .unwrap();
        let files = FileLister::new(dir.path()).unwrap();
        (dir, Portal::new(roster, SessionStore::default(), files, ordering))
    }

    fn roll_numbers(view: &PortalView) -> Vec<&str> {
        view.students
            .as_ref()
            .unwrap()
            .iter()
            .map(|s| s.roll_number.as_str())
            .collect()
    }

    #[test]
    fn plain_view_lists_everything() {
        let (_dir, portal) = portal(RangeOrdering::Lexical);
        let view = portal.index(&Search::All, None);
        assert!(view.student.is_none());
        assert_eq!(roll_numbers(&view), vec!["100", "1000", "103", "105"]);
        assert_eq!(view.students.as_ref().unwrap()[1].percentage, 90);
        let names: Vec<_> = view.directory_listing.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["photos", "students.csv"]);
        assert_eq!(view.current_path, ".");
    }

    #[test]
    fn single_search_returns_profile_and_sets_cursor() {
        let (_dir, portal) = portal(RangeOrdering::Lexical);
        let view = portal.index(&Search::Single("103".into()), Some("s"));
        let student = view.student.unwrap();
        assert_eq!(student.roll_number, "103");
        assert_eq!(student.hall_ticket, "HT103");
        assert_eq!(student.percentage, 70);
        assert_eq!(portal.sessions().get("s").as_deref(), Some("103"));
    }

    #[test]
    fn single_search_miss_is_empty_profile() {
        let (_dir, portal) = portal(RangeOrdering::Lexical);
        let view = portal.index(&Search::Single("42".into()), Some("s"));
        assert!(view.student.is_none());
        assert_eq!(portal.sessions().get("s").as_deref(), Some("42"));
        assert!(portal.next(Some("s")).student.is_none());
    }

    #[test]
    fn range_search_filters_and_leaves_cursor_alone() {
        let (_dir, portal) = portal(RangeOrdering::Lexical);
        portal.sessions().set("s", "100");
        let range = Search::Range {
            start: "100".into(),
            end: "105".into(),
        };
        let view = portal.index(&range, Some("s"));
        assert!(view.student.is_none());
        assert_eq!(roll_numbers(&view), vec!["100", "1000", "103", "105"]);
        assert_eq!(portal.sessions().get("s").as_deref(), Some("100"));

        let narrow = Search::Range {
            start: "101".into(),
            end: "104".into(),
        };
        assert_eq!(roll_numbers(&portal.index(&narrow, None)), vec!["103"]);
    }

    #[test]
    fn numeric_range_ordering_is_honoured() {
        let (_dir, portal) = portal(RangeOrdering::Numeric);
        let range = Search::Range {
            start: "100".into(),
            end: "105".into(),
        };
        assert_eq!(
            roll_numbers(&portal.index(&range, None)),
            vec!["100", "103", "105"]
        );
    }

    #[test]
    fn empty_range_is_an_empty_summary() {
        let (_dir, portal) = portal(RangeOrdering::Lexical);
        let range = Search::Range {
            start: "2".into(),
            end: "3".into(),
        };
        assert!(portal.index(&range, None).students.unwrap().is_empty());
    }

    #[test]
    fn next_walks_forward_then_stops() {
        let (_dir, portal) = portal(RangeOrdering::Lexical);
        portal.index(&Search::Single("103".into()), Some("s"));

        let view = portal.next(Some("s"));
        assert_eq!(view.student.unwrap().roll_number, "105");
        assert!(view.students.is_none());
        assert_eq!(view.directory_listing.len(), 2);

        let view = portal.next(Some("s"));
        assert!(view.student.is_none());
        assert_eq!(portal.sessions().get("s").as_deref(), Some("105"));
    }

    #[test]
    fn next_without_session_is_empty() {
        let (_dir, portal) = portal(RangeOrdering::Lexical);
        let view = portal.next(None);
        assert!(view.student.is_none());
        assert!(view.students.is_none());
        assert_eq!(view.directory_listing.len(), 2);
    }

    #[test]
    fn browse_lists_subdirectory() {
        let (dir, portal) = portal(RangeOrdering::Lexical);
        fs::write(dir.path().join("photos/p.jpg"), "").unwrap();
        let view = portal.browse("photos").unwrap();
        assert_eq!(view.current_path, "photos");
        assert_eq!(view.directory_listing.len(), 1);
        assert_eq!(view.directory_listing[0].path, "photos/p.jpg");
        assert!(view.student.is_none() && view.students.is_none());
    }

    #[test]
    fn browse_missing_path_fails() {
        let (_dir, portal) = portal(RangeOrdering::Lexical);
        assert!(matches!(portal.browse("missing"), Err(BrowseError::NotFound(_))));
    }
}
