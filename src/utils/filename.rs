use chrono::NaiveDate;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ProcessingError, Result};

/// Extracts the calendar date encoded in a raw file name.
///
/// The pattern must contain exactly one capture group; the captured token is
/// parsed with the chrono `date_format`.
#[derive(Debug, Clone)]
pub struct FilenameDateRule {
    pattern: Regex,
    date_format: String,
}

impl FilenameDateRule {
    pub fn new(pattern: &str, date_format: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)?;

        // captures_len counts the implicit whole-match group
        if pattern.captures_len() != 2 {
            return Err(ProcessingError::Config(format!(
                "Date pattern '{}' must contain exactly one capture group",
                pattern.as_str()
            )));
        }

        Ok(Self {
            pattern,
            date_format: date_format.to_string(),
        })
    }

    pub fn extract_date(&self, path: &Path) -> Result<NaiveDate> {
        let filename = path
            .file_name()
            .and_then(|f| f.to_str())
            .ok_or_else(|| ProcessingError::InvalidFormat("Invalid file path".to_string()))?;

        let token = self
            .pattern
            .captures(filename)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| ProcessingError::FilenameDate {
                filename: filename.to_string(),
            })?;

        Ok(NaiveDate::parse_from_str(token, &self.date_format)?)
    }
}

/// File name of `path` for diagnostics, falling back to the full path
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// List files in `dir` named `{prefix}*.{extension}`, sorted by file name
pub fn discover_files(dir: &Path, prefix: &str, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }

        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|name| name.starts_with(prefix))
            .unwrap_or(false)
            && path.extension().map_or(false, |ext| ext == extension);

        if matches {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
