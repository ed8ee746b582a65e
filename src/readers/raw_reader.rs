use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::warn;

use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{RawDailyRecord, RawRow};
use crate::readers::source::read_utf8;
use crate::utils::filename::display_name;
use crate::utils::format::parse_value;

/// Reads one raw per-day wide table.
///
/// Every column not named in the metadata set is a city measurement column.
pub struct RawFileReader {
    pollutant_column: String,
    metadata_columns: HashSet<String>,
}

impl RawFileReader {
    pub fn new(pollutant_column: &str, metadata_columns: HashSet<String>) -> Self {
        Self {
            pollutant_column: pollutant_column.to_string(),
            metadata_columns,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(&config.pollutant_column, config.metadata_column_set())
    }

    pub fn read_record(&self, path: &Path, date: NaiveDate) -> Result<RawDailyRecord> {
        let text = read_utf8(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();

        let pollutant_index = headers
            .iter()
            .position(|h| h.trim() == self.pollutant_column)
            .ok_or_else(|| ProcessingError::MissingColumn {
                column: self.pollutant_column.clone(),
                path: path.to_path_buf(),
            })?;

        let mut city_columns: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !self.metadata_columns.contains(h.trim()))
            .map(|(i, h)| (i, h.to_string()))
            .collect();

        let renamed = rename_duplicate_cities(&mut city_columns);
        if !renamed.is_empty() {
            warn!(
                "{}: duplicate city columns renamed to {}",
                display_name(path),
                renamed.join(", ")
            );
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;

            let pollutant = record.get(pollutant_index).unwrap_or("").trim().to_string();
            let values = city_columns
                .iter()
                .map(|(i, _)| record.get(*i).and_then(parse_value))
                .collect();

            rows.push(RawRow { pollutant, values });
        }

        let cities = city_columns.into_iter().map(|(_, name)| name).collect();
        Ok(RawDailyRecord::new(date, cities, rows))
    }
}

/// Give repeated city names a numeric suffix (`X`, `X.1`, `X.2`, ...) so
/// every column keeps its own values. Returns the new names.
fn rename_duplicate_cities(columns: &mut [(usize, String)]) -> Vec<String> {
    let mut taken: HashSet<String> = columns.iter().map(|(_, name)| name.clone()).collect();
    let mut seen = HashSet::new();
    let mut suffixes: HashMap<String, usize> = HashMap::new();
    let mut renamed = Vec::new();

    for (_, name) in columns.iter_mut() {
        if seen.insert(name.clone()) {
            continue;
        }

        let suffix = suffixes.entry(name.clone()).or_insert(0);
        let candidate = loop {
            *suffix += 1;
            let candidate = format!("{}.{}", name, suffix);
            if !taken.contains(&candidate) {
                break candidate;
            }
        };

        taken.insert(candidate.clone());
        seen.insert(candidate.clone());
        renamed.push(candidate.clone());
        *name = candidate;
    }

    renamed
}
