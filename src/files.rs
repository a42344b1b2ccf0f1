use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::BrowseError;

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub name: String,
    /// Path relative to the browse root, `/`-separated.
    pub path: String,
    pub is_dir: bool,
    /// Link to browse this entry.
    pub href: String,
}

/// Lists directories inside a single allow-listed root.
#[derive(Debug, Clone)]
pub struct FileLister {
    root: PathBuf,
}

impl FileLister {
    /// Create a lister confined to `root`. The root must exist.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = fs::canonicalize(root)?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", root.display()),
            ));
        }
        Ok(FileLister { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Immediate children of `relative`, sorted by name.
    ///
    /// `""` and `"."` both name the root. The resolved directory must stay
    /// inside the root after symlinks and `..` are resolved.
    pub fn list(&self, relative: &str) -> Result<Vec<DirectoryEntry>, BrowseError> {
        let relative = normalize(relative);
        let target = self.resolve(&relative)?;

        let io_err = |source| BrowseError::Io {
            path: relative.clone(),
            source,
        };

        let mut entries = Vec::new();
        for entry in fs::read_dir(&target).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            let name = entry.file_name().to_string_lossy().to_string();
            let is_dir = fs::metadata(entry.path())
                .map(|m| m.is_dir())
                .unwrap_or(false);
            let path = if relative.is_empty() {
                name.clone()
            } else {
                format!("{}/{}", relative, name)
            };
            entries.push(DirectoryEntry {
                href: browse_href(&path),
                name,
                path,
                is_dir,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf, BrowseError> {
        let joined = Path::new(relative)
            .components()
            .fold(self.root.clone(), |mut acc, component| {
                match component {
                    Component::Normal(part) => acc.push(part),
                    Component::ParentDir => acc.push(".."),
                    _ => {}
                }
                acc
            });

        let canonical = match fs::canonicalize(&joined) {
            Ok(path) => path,
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                return Err(BrowseError::NotFound(relative.to_string()));
            }
            Err(source) => {
                return Err(BrowseError::Io {
                    path: relative.to_string(),
                    source,
                });
            }
        };

        if !canonical.starts_with(&self.root) {
            return Err(BrowseError::OutsideRoot(relative.to_string()));
        }
        if !canonical.is_dir() {
            return Err(BrowseError::NotADirectory(relative.to_string()));
        }
        Ok(canonical)
    }
}

/// Turn a request path into the `/`-separated form used in entries.
fn normalize(relative: &str) -> String {
    relative
        .replace('\\', "/")
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>()
        .join("/")
}

fn browse_href(path: &str) -> String {
    let encoded: Vec<_> = path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("/browse/{}", encoded.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn fixture() -> (tempfile::TempDir, FileLister) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("root/photos/2024")).unwrap();
        fs::create_dir_all(dir.path().join("root/docs")).unwrap();
        File::create(dir.path().join("root/students.csv")).unwrap();
        File::create(dir.path().join("root/photos/a b.jpg")).unwrap();
        File::create(dir.path().join("secret.txt")).unwrap();
        let lister = FileLister::new(dir.path().join("root")).unwrap();
        (dir, lister)
    }

    fn names(entries: &[DirectoryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn root_lists_immediate_children_sorted() {
        let (_dir, lister) = fixture();
        let entries = lister.list(".").unwrap();
        assert_eq!(names(&entries), vec!["docs", "photos", "students.csv"]);
        assert!(entries[0].is_dir);
        assert!(!entries[2].is_dir);
        assert_eq!(entries[1].path, "photos");
        assert_eq!(entries[1].href, "/browse/photos");
        assert_eq!(lister.list("").unwrap(), entries);
    }

    #[test]
    fn subdirectory_is_not_recursive() {
        let (_dir, lister) = fixture();
        let entries = lister.list("photos").unwrap();
        assert_eq!(names(&entries), vec!["2024", "a b.jpg"]);
        assert_eq!(entries[1].path, "photos/a b.jpg");
        assert_eq!(entries[1].href, "/browse/photos/a%20b.jpg");
    }

    #[test]
    fn missing_path_is_not_found() {
        let (_dir, lister) = fixture();
        assert!(matches!(lister.list("nope"), Err(BrowseError::NotFound(_))));
    }

    #[test]
    fn file_is_not_a_directory() {
        let (_dir, lister) = fixture();
        assert!(matches!(
            lister.list("students.csv"),
            Err(BrowseError::NotADirectory(_))
        ));
    }

    #[test]
    fn parent_traversal_is_rejected() {
        let (_dir, lister) = fixture();
        assert!(matches!(lister.list(".."), Err(BrowseError::OutsideRoot(_))));
        assert!(matches!(
            lister.list("photos/../.."),
            Err(BrowseError::OutsideRoot(_))
        ));
        // Going up and back down inside the root is fine.
        assert_eq!(names(&lister.list("photos/../docs").unwrap()), Vec::<&str>::new());
    }

    #[test]
    fn absolute_paths_stay_under_root() {
        let (_dir, lister) = fixture();
        let entries = lister.list("/photos").unwrap();
        assert_eq!(entries[0].path, "photos/2024");
    }

    #[cfg(unix)]
    #[test]
    fn symlink_out_of_root_is_rejected() {
        let (dir, lister) = fixture();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("root/escape")).unwrap();
        assert!(matches!(
            lister.list("escape"),
            Err(BrowseError::OutsideRoot(_))
        ));
    }

    #[test]
    fn root_must_exist() {
        assert!(FileLister::new("/definitely/not/here").is_err());
    }

    #[test]
    fn normalize_strips_dots_and_slashes() {
        assert_eq!(normalize("./a//b/"), "a/b");
        assert_eq!(normalize("a\\b"), "a/b");
        assert_eq!(normalize("."), "");
    }
}
