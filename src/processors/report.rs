use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::models::Granularity;

/// An input (raw file or daily table) left out of a run, and why
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SkippedInput {
    pub name: String,
    pub reason: String,
}

impl SkippedInput {
    pub fn new(name: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DailyReport {
    pub files_found: usize,
    pub files_processed: usize,
    pub skipped_files: Vec<SkippedInput>,
    pub tables_written: Vec<PathBuf>,
    pub failed_tables: Vec<SkippedInput>,
    pub elapsed: Duration,
}

impl DailyReport {
    pub fn new(files_found: usize) -> Self {
        Self {
            files_found,
            ..Default::default()
        }
    }

    pub fn skip(&mut self, name: impl Into<String>, reason: impl ToString) {
        self.skipped_files.push(SkippedInput::new(name, reason));
    }

    pub fn summary(&self) -> String {
        format!(
            "Daily: {} of {} files processed, {} skipped, {} tables generated in {:.2}s",
            self.files_processed,
            self.files_found,
            self.skipped_files.len(),
            self.tables_written.len(),
            self.elapsed.as_secs_f64()
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RollupReport {
    pub granularity: Granularity,
    pub tables_written: Vec<PathBuf>,
    pub missing_inputs: Vec<String>,
    pub failed_pairs: Vec<SkippedInput>,
    pub elapsed: Duration,
}

impl RollupReport {
    pub fn new(granularity: Granularity) -> Self {
        Self {
            granularity,
            tables_written: Vec::new(),
            missing_inputs: Vec::new(),
            failed_pairs: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn summary(&self) -> String {
        let label = match self.granularity {
            Granularity::Day => "Daily",
            Granularity::Month => "Monthly",
            Granularity::Year => "Yearly",
        };
        format!(
            "{}: {} tables generated, {} inputs missing, {} failed in {:.2}s",
            label,
            self.tables_written.len(),
            self.missing_inputs.len(),
            self.failed_pairs.len(),
            self.elapsed.as_secs_f64()
        )
    }
}
