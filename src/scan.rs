use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{DescribeError, Result};
use crate::filename::has_supported_extension;

/// List the files directly inside `dir` whose names end in one of `extensions`.
///
/// Results are sorted by file name. Entries that cannot be read are skipped
/// with a warning; failing to open `dir` itself is an error.
pub fn collect_files(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(DescribeError::NotADirectory(dir.to_path_buf()));
    }

    let mut all_files = Vec::new();
    let mut files = Vec::new();

    for entry_result in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry_result {
            Ok(e) => e,
            // The directory itself could not be read
            Err(err) if err.depth() == 0 => {
                return Err(DescribeError::ReadDir {
                    path: dir.to_path_buf(),
                    source: err,
                });
            }
            Err(err) => {
                match err.path() {
                    Some(path) => warn!("Failed to access {}: {}", path.display(), err),
                    None => warn!("Directory listing error: {}", err),
                }
                continue;
            }
        };

        // Get filename for filtering
        let filename = entry.file_name().to_string_lossy().into_owned();
        all_files.push(filename.clone());

        // Follows symlinks, so a link to a photo still counts
        if !entry.path().is_file() {
            continue;
        }

        // Case-insensitive suffix match
        if has_supported_extension(&filename, extensions) {
            files.push(entry.into_path());
        }
    }

    debug!(?all_files, "directory listing");
    debug!(matched = ?files, "matched files");

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        for name in ["b.png", "a.jpg", "notes.txt", "C.JPG", "clip.mov"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let files = collect_files(dir.path(), &exts(&["jpg", "png"])).unwrap();
        assert_eq!(names(&files), vec!["C.JPG", "a.jpg", "b.png"]);
        assert!(files.iter().all(|p| p.starts_with(dir.path())));
    }

    #[test]
    fn test_skips_directories_and_nested_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("album.jpg")).unwrap();
        fs::write(dir.path().join("album.jpg").join("inner.jpg"), b"x").unwrap();
        fs::write(dir.path().join("top.jpg"), b"x").unwrap();

        let files = collect_files(dir.path(), &exts(&["jpg"])).unwrap();
        assert_eq!(names(&files), vec!["top.jpg"]);
    }

    #[test]
    fn test_no_matches_is_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("readme.md"), b"x").unwrap();

        let files = collect_files(dir.path(), &exts(&["jpg"])).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_not_a_directory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.jpg");
        fs::write(&file, b"x").unwrap();

        let err = collect_files(&file, &exts(&["jpg"])).unwrap_err();
        assert!(matches!(err, DescribeError::NotADirectory(_)));

        let missing = dir.path().join("missing");
        let err = collect_files(&missing, &exts(&["jpg"])).unwrap_err();
        assert!(matches!(err, DescribeError::NotADirectory(_)));
    }
}
