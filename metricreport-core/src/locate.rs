//! Result file discovery
//!
//! Only the immediate children of the result directory are considered.
//! Matches are returned sorted so identical inputs give identical reports.

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};
use std::path::{Path, PathBuf};

/// Compile a file-name pattern such as `*_metrics.xml`
pub fn compile_pattern(pattern: &str) -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid file pattern: {}", pattern))?;
    Ok(glob.compile_matcher())
}

/// List the files directly inside `dir` whose name matches `matcher`
///
/// A missing directory is an error; an existing directory with no matches
/// yields an empty list.
pub fn locate_reports(dir: &Path, matcher: &GlobMatcher) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("The directory does not exist: {}", dir.display());
    }

    let mut files = Vec::new();
    for entry_result in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let entry = entry_result
            .with_context(|| format!("Failed to read directory entry in: {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if matcher.is_match(entry.file_name()) {
            files.push(path);
        }
    }

    // Sort files for deterministic order
    files.sort();
    tracing::debug!(dir = %dir.display(), count = files.len(), "located result files");

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

    #[test]
    fn test_matches_pattern_sorted() {
        let temp = TempDir::new().unwrap();
        for name in ["b_metrics.xml", "a_metrics.xml", "notes.txt", "c_metrics.xml.bak"] {
            fs::write(temp.path().join(name), "").unwrap();
        }

        let matcher = compile_pattern("*_metrics.xml").unwrap();
        let files = locate_reports(temp.path(), &matcher).unwrap();
        assert_eq!(names(&files), vec!["a_metrics.xml", "b_metrics.xml"]);
    }

    #[test]
    fn test_is_not_recursive() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("nested").join("deep.xml"), "").unwrap();
        fs::write(temp.path().join("top.xml"), "").unwrap();

        let matcher = compile_pattern("*.xml").unwrap();
        let files = locate_reports(temp.path(), &matcher).unwrap();
        assert_eq!(names(&files), vec!["top.xml"]);
    }

    #[test]
    fn test_directories_are_not_matched() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("dir.xml")).unwrap();

        let matcher = compile_pattern("*.xml").unwrap();
        assert!(locate_reports(temp.path(), &matcher).unwrap().is_empty());
    }

    #[test]
    fn test_no_matches_is_empty_not_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("readme.md"), "").unwrap();

        let matcher = compile_pattern("*.xml").unwrap();
        assert!(locate_reports(temp.path(), &matcher).unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory_is_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("absent");

        let matcher = compile_pattern("*.xml").unwrap();
        let err = locate_reports(&missing, &matcher).unwrap_err();
        assert!(err.to_string().contains("absent"));
    }

    #[test]
    fn test_file_instead_of_directory_is_error() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("results.xml");
        fs::write(&file, "").unwrap();

        let matcher = compile_pattern("*.xml").unwrap();
        assert!(locate_reports(&file, &matcher).is_err());
    }

    #[test]
    fn test_single_character_wildcard() {
        let temp = TempDir::new().unwrap();
        for name in ["r1.xml", "r22.xml"] {
            fs::write(temp.path().join(name), "").unwrap();
        }

        let matcher = compile_pattern("r?.xml").unwrap();
        let files = locate_reports(temp.path(), &matcher).unwrap();
        assert_eq!(names(&files), vec!["r1.xml"]);
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        assert!(compile_pattern("[unclosed").is_err());
    }
}
