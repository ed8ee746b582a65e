//! Pipeline configuration.
//!
//! Compiled-in defaults from [`crate::utils::constants`] are layered with an
//! optional configuration file and `AQ_`-prefixed environment variables.

use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::models::{Granularity, Statistic};
use crate::utils::constants::{
    DEFAULT_PROGRESS_INTERVAL, ENV_PREFIX, METADATA_COLUMNS, OUTPUT_DIR, POLLUTANTS,
    POLLUTANT_COLUMN, RAW_DATA_DIR, RAW_DATE_FORMAT, RAW_DATE_PATTERN, RAW_FILE_EXTENSION,
    RAW_FILE_PREFIX,
};
use crate::utils::filename::FilenameDateRule;

/// Settings that hold lists, split on commas when read from the environment
const LIST_SETTINGS: [&str; 3] = ["pollutants", "stats_types", "metadata_columns"];

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PipelineConfig {
    /// Source of the raw per-day files
    pub raw_data_dir: PathBuf,

    /// Destination of daily tables and source/destination of the roll-ups
    pub output_dir: PathBuf,

    #[validate(length(min = 1))]
    pub pollutants: Vec<String>,

    #[validate(length(min = 1))]
    pub stats_types: Vec<Statistic>,

    #[validate(length(min = 1))]
    pub file_prefix: String,

    #[validate(length(min = 1))]
    pub file_extension: String,

    pub date_pattern: String,

    #[validate(length(min = 1))]
    pub date_format: String,

    /// Raw columns that are never city measurements
    pub metadata_columns: Vec<String>,

    #[validate(length(min = 1))]
    pub pollutant_column: String,

    #[validate(range(min = 1))]
    pub progress_interval: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_data_dir: PathBuf::from(RAW_DATA_DIR),
            output_dir: PathBuf::from(OUTPUT_DIR),
            pollutants: POLLUTANTS.iter().map(|p| p.to_string()).collect(),
            stats_types: Statistic::ALL.to_vec(),
            file_prefix: RAW_FILE_PREFIX.to_string(),
            file_extension: RAW_FILE_EXTENSION.to_string(),
            date_pattern: RAW_DATE_PATTERN.to_string(),
            date_format: RAW_DATE_FORMAT.to_string(),
            metadata_columns: METADATA_COLUMNS.iter().map(|c| c.to_string()).collect(),
            pollutant_column: POLLUTANT_COLUMN.to_string(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl PipelineConfig {
    /// Load defaults, then `path` (if given), then `AQ_*` environment overrides.
    ///
    /// List settings accept comma-separated environment values, e.g.
    /// `AQ_POLLUTANTS=AQI,O3`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, ENV_PREFIX)
    }

    fn load_with_env(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let environment = LIST_SETTINGS.iter().fold(
            Environment::with_prefix(env_prefix)
                .try_parsing(true)
                .list_separator(","),
            |env, key| env.with_list_parse_key(key),
        );

        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: Self = builder
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        config.check()?;
        Ok(config)
    }

    /// Validate field constraints and the filename date rule
    pub fn check(&self) -> Result<()> {
        self.validate()?;
        self.date_rule()?;

        if let Some(pollutant) = first_duplicate(&self.pollutants) {
            return Err(ProcessingError::Config(format!(
                "Pollutant '{}' is listed more than once",
                pollutant
            )));
        }
        if let Some(statistic) = first_duplicate(&self.stats_types) {
            return Err(ProcessingError::Config(format!(
                "Statistic '{}' is listed more than once",
                statistic
            )));
        }

        if self.is_metadata_column(&self.pollutant_column) {
            Ok(())
        } else {
            Err(ProcessingError::Config(format!(
                "Pollutant column '{}' must be listed in metadata_columns",
                self.pollutant_column
            )))
        }
    }

    pub fn with_raw_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.raw_data_dir = dir.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_pollutants(mut self, pollutants: &[&str]) -> Self {
        self.pollutants = pollutants.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn date_rule(&self) -> Result<FilenameDateRule> {
        FilenameDateRule::new(&self.date_pattern, &self.date_format)
    }

    pub fn metadata_column_set(&self) -> HashSet<String> {
        self.metadata_columns.iter().cloned().collect()
    }

    pub fn is_metadata_column(&self, column: &str) -> bool {
        self.metadata_columns.iter().any(|c| c == column)
    }

    /// Glob-style description of the raw file naming, for diagnostics
    pub fn raw_file_pattern(&self) -> String {
        format!("{}*.{}", self.file_prefix, self.file_extension)
    }

    pub fn table_path(
        &self,
        granularity: Granularity,
        pollutant: &str,
        statistic: Statistic,
    ) -> PathBuf {
        self.output_dir
            .join(granularity.table_file_name(pollutant, statistic))
    }
}

fn first_duplicate<T: Eq + std::hash::Hash>(items: &[T]) -> Option<&T> {
    let mut seen = HashSet::new();
    items.iter().find(|item| !seen.insert(*item))
}
