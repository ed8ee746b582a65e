use serde::Serialize;
use std::path::Path;

use crate::error::Result;
use crate::models::{Granularity, Statistic, StatisticTable};
use crate::readers::TableReader;
use crate::utils::filename::display_name;
use crate::utils::format::format_value;

#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub file: String,
    pub pollutant: Option<String>,
    pub statistic: Option<Statistic>,
    pub granularity: Granularity,
    pub rows: usize,
    pub cities: usize,
    pub first_period: Option<String>,
    pub last_period: Option<String>,
    pub missing_cells: usize,
}

impl TableSummary {
    pub fn missing_percentage(&self) -> f64 {
        let cells = self.rows * self.cities;
        if cells == 0 {
            return 0.0;
        }
        (self.missing_cells as f64 / cells as f64) * 100.0
    }

    pub fn detailed_summary(&self) -> String {
        let mut lines = vec![format!("Table: {}", self.file)];

        if let (Some(pollutant), Some(statistic)) = (&self.pollutant, self.statistic) {
            lines.push(format!("Pollutant: {} ({})", pollutant, statistic));
        }
        lines.push(format!("Granularity: {}", self.granularity));
        lines.push(format!("Rows: {}", self.rows));
        lines.push(format!("Cities: {}", self.cities));

        match (&self.first_period, &self.last_period) {
            (Some(first), Some(last)) => lines.push(format!("Periods: {} to {}", first, last)),
            _ => lines.push("Periods: none".to_string()),
        }

        lines.push(format!(
            "Missing cells: {} ({:.1}%)",
            self.missing_cells,
            self.missing_percentage()
        ));

        lines.join("\n")
    }
}

pub struct TableAnalyzer {
    reader: TableReader,
}

impl TableAnalyzer {
    pub fn new() -> Self {
        Self {
            reader: TableReader::new(),
        }
    }

    pub fn load(&self, path: &Path) -> Result<StatisticTable> {
        self.reader.read_table(path)
    }

    pub fn analyze(&self, path: &Path) -> Result<(StatisticTable, TableSummary)> {
        let table = self.load(path)?;
        let summary = Self::summarize(&display_name(path), &table);
        Ok((table, summary))
    }

    pub fn summarize(file: &str, table: &StatisticTable) -> TableSummary {
        let parsed = Granularity::parse_table_file_name(file);

        TableSummary {
            file: file.to_string(),
            pollutant: parsed.as_ref().map(|(p, _, _)| p.clone()),
            statistic: parsed.map(|(_, _, s)| s),
            granularity: table.granularity(),
            rows: table.len(),
            cities: table.cities().len(),
            first_period: table.rows().iter().map(|r| r.key.clone()).min(),
            last_period: table.rows().iter().map(|r| r.key.clone()).max(),
            missing_cells: table.missing_cells(),
        }
    }

    /// First `count` rows rendered as `key: city=value, ...`, capped at `max_cities` cities
    pub fn sample_rows(table: &StatisticTable, count: usize, max_cities: usize) -> Vec<String> {
        table
            .rows()
            .iter()
            .take(count)
            .map(|row| {
                let cells: Vec<String> = table
                    .cities()
                    .iter()
                    .enumerate()
                    .take(max_cities)
                    .map(|(i, city)| {
                        let value = format_value(row.value(i));
                        format!("{}={}", city, if value.is_empty() { "-" } else { value.as_str() })
                    })
                    .collect();
                format!("{}: {}", row.key, cells.join(", "))
            })
            .collect()
    }
}

impl Default for TableAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatisticRow;

    fn table() -> StatisticTable {
        let mut table = StatisticTable::with_cities(
            Granularity::Year,
            vec!["Beijing".to_string(), "Lhasa".to_string()],
        );
        table.push_row(StatisticRow::new("2021".to_string(), vec![Some(80.5), None]));
        table.push_row(StatisticRow::new("2020".to_string(), vec![Some(90.0), Some(20.0)]));
        table
    }

    #[test]
    fn test_summarize() {
        let summary = TableAnalyzer::summarize("AQI_yearmean.csv", &table());

        assert_eq!(summary.pollutant.as_deref(), Some("AQI"));
        assert_eq!(summary.statistic, Some(Statistic::Mean));
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.first_period.as_deref(), Some("2020"));
        assert_eq!(summary.last_period.as_deref(), Some("2021"));
        assert_eq!(summary.missing_cells, 1);
        assert!((summary.missing_percentage() - 25.0).abs() < 1e-9);
        assert!(summary.detailed_summary().contains("Periods: 2020 to 2021"));
    }

    #[test]
    fn test_sample_rows() {
        let rows = TableAnalyzer::sample_rows(&table(), 1, 5);
        assert_eq!(rows, vec!["2021: Beijing=80.5, Lhasa=-".to_string()]);
    }
}
