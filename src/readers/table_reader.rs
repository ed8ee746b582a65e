use std::path::Path;

use crate::error::{ProcessingError, Result};
use crate::models::{Granularity, StatisticTable};
use crate::readers::source::read_utf8;
use crate::utils::format::parse_value;

/// Reads a statistic table previously written by the pipeline.
///
/// The granularity is taken from the first header (`date`, `month` or `year`).
pub struct TableReader;

impl TableReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_table(&self, path: &Path) -> Result<StatisticTable> {
        let text = read_utf8(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let key_column = headers.get(0).unwrap_or("");
        let granularity = Granularity::from_key_column(key_column).ok_or_else(|| {
            ProcessingError::InvalidFormat(format!(
                "{}: first column '{}' is not a period column",
                path.display(),
                key_column
            ))
        })?;

        let cities: Vec<String> = headers.iter().skip(1).map(|h| h.to_string()).collect();
        let mut table = StatisticTable::with_cities(granularity, cities.clone());

        for record in reader.records() {
            let record = record?;
            let key = record.get(0).unwrap_or("").trim().to_string();
            let values: Vec<Option<f64>> = (1..record.len())
                .map(|i| record.get(i).and_then(parse_value))
                .collect();

            table.append(key, &cities, &values);
        }

        Ok(table)
    }
}

impl Default for TableReader {
    fn default() -> Self {
        Self::new()
    }
}
