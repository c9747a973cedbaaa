//! Input file discovery.
//!
//! Expands a glob pattern (or a directory) into the sorted list of files
//! handed to the synchronisation engine.

use crate::constants::DEFAULT_FILE_PATTERN;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// List files matching `pattern`, sorted and de-duplicated.
///
/// A pattern naming an existing directory is treated as `<dir>/*.txt`.
/// Entries that cannot be read are skipped with a warning; directories
/// matched by the pattern are ignored.
pub fn list_files(pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern = if Path::new(pattern).is_dir() {
        Path::new(pattern)
            .join(DEFAULT_FILE_PATTERN)
            .to_string_lossy()
            .into_owned()
    } else {
        pattern.to_string()
    };

    debug!("Searching for data files with pattern: {}", pattern);

    let mut files = Vec::new();
    for entry in glob::glob(&pattern)? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(path) => debug!("Ignoring non-file match {}", path.display()),
            Err(e) => warn!("Unreadable match for {}: {}", pattern, e),
        }
    }

    files.sort();
    files.dedup();

    debug!("Found {} data files", files.len());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_list_files_sorted() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["46026h2010.txt", "46026h1985.txt", "46026h1999.txt", "readme.md"] {
            fs::write(temp_dir.path().join(name), "YY MM DD hh\n").unwrap();
        }
        fs::create_dir(temp_dir.path().join("nested.txt")).unwrap();

        let pattern = temp_dir.path().join("*.txt");
        let files = list_files(&pattern.to_string_lossy()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["46026h1985.txt", "46026h1999.txt", "46026h2010.txt"]);
    }

    #[test]
    fn test_directory_expands_to_text_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "").unwrap();
        fs::write(temp_dir.path().join("b.csv"), "").unwrap();

        let files = list_files(&temp_dir.path().to_string_lossy()).unwrap();
        assert_eq!(files, vec![temp_dir.path().join("a.txt")]);
    }

    #[test]
    fn test_no_matches_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let pattern = temp_dir.path().join("*.txt");
        assert!(list_files(&pattern.to_string_lossy()).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_pattern() {
        let result = list_files("data/[");
        assert!(matches!(result, Err(SyncError::InvalidPattern(_))));
    }
}
