use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{Granularity, Statistic, StatisticRow, StatisticTable};
use crate::processors::{RollupReport, SkippedInput};
use crate::readers::TableReader;
use crate::utils::constants::OUTPUT_DATE_FORMAT;
use crate::utils::filename::display_name;
use crate::utils::progress::ProgressReporter;
use crate::writers::TableWriter;

/// Re-aggregate a daily table into coarser periods.
///
/// Rows are grouped by `period_of(date)` and each city column is reduced with
/// the same `statistic` that produced the daily values. Output rows follow
/// ascending period key, one per period present in the input.
pub fn roll_up<F>(
    daily: &StatisticTable,
    statistic: Statistic,
    target: Granularity,
    period_of: F,
) -> Result<StatisticTable>
where
    F: Fn(NaiveDate) -> String,
{
    if daily.granularity() != Granularity::Day {
        return Err(ProcessingError::InvalidFormat(format!(
            "Roll-up expects a daily table, got {}",
            daily.granularity()
        )));
    }

    let mut periods: BTreeMap<String, Vec<&StatisticRow>> = BTreeMap::new();
    for row in daily.rows() {
        let date = NaiveDate::parse_from_str(row.key.trim(), OUTPUT_DATE_FORMAT).map_err(|_| {
            ProcessingError::InvalidFormat(format!("Invalid date in daily table: '{}'", row.key))
        })?;
        periods.entry(period_of(date)).or_default().push(row);
    }

    let width = daily.cities().len();
    let mut rolled = StatisticTable::with_cities(target, daily.cities().to_vec());

    for (key, rows) in periods {
        let values = (0..width)
            .map(|i| statistic.roll_up(rows.iter().filter_map(|row| row.value(i))))
            .collect();
        rolled.push_row(StatisticRow::new(key, values));
    }

    Ok(rolled)
}

/// Produces `{pollutant}_{month|year}{statistic}.csv` from the daily tables
pub struct RollupAggregator<'a> {
    config: &'a PipelineConfig,
    granularity: Granularity,
    reader: TableReader,
    writer: TableWriter,
}

impl<'a> RollupAggregator<'a> {
    pub fn new(config: &'a PipelineConfig, granularity: Granularity) -> Result<Self> {
        if granularity == Granularity::Day {
            return Err(ProcessingError::Config(
                "Daily tables are produced by the daily aggregator".to_string(),
            ));
        }

        Ok(Self::with_granularity(config, granularity))
    }

    pub fn monthly(config: &'a PipelineConfig) -> Self {
        Self::with_granularity(config, Granularity::Month)
    }

    pub fn yearly(config: &'a PipelineConfig) -> Self {
        Self::with_granularity(config, Granularity::Year)
    }

    fn with_granularity(config: &'a PipelineConfig, granularity: Granularity) -> Self {
        Self {
            config,
            granularity,
            reader: TableReader::new(),
            writer: TableWriter::new(),
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Roll up every configured (pollutant, statistic) pair.
    ///
    /// A missing or unreadable daily table skips that pair only.
    pub fn run(&self, progress: Option<&ProgressReporter>) -> RollupReport {
        let start = Instant::now();
        let mut report = RollupReport::new(self.granularity);

        info!("Generating {} tables", self.granularity);

        for pollutant in &self.config.pollutants {
            for &statistic in &self.config.stats_types {
                let input = self.config.table_path(Granularity::Day, pollutant, statistic);
                let output = self.config.table_path(self.granularity, pollutant, statistic);

                if let Some(p) = progress {
                    p.increment(1);
                }

                if !input.is_file() {
                    let name = display_name(&input);
                    warn!("Skipping: {} not found", name);
                    report.missing_inputs.push(name);
                    continue;
                }

                match self.process_pair(&input, statistic, &output) {
                    Ok(table) => {
                        info!("Generated {} ({} rows)", display_name(&output), table.len());
                        report.tables_written.push(output);
                    }
                    Err(e) => {
                        let name = display_name(&input);
                        error!("Processing {} failed: {}", name, e);
                        report.failed_pairs.push(SkippedInput::new(name, e));
                    }
                }
            }
        }

        report.elapsed = start.elapsed();
        report
    }

    /// Read one daily table, roll it up and write the result to `output`
    pub fn process_pair(
        &self,
        input: &Path,
        statistic: Statistic,
        output: &Path,
    ) -> Result<StatisticTable> {
        let daily = self.reader.read_table(input)?;
        let granularity = self.granularity;
        let rolled = roll_up(&daily, statistic, granularity, |date| {
            granularity.period_key(date)
        })?;
        self.writer.write_table(&rolled, output)?;
        Ok(rolled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn daily_table(rows: &[(&str, Option<f64>, Option<f64>)]) -> StatisticTable {
        let mut table = StatisticTable::with_cities(
            Granularity::Day,
            vec!["X".to_string(), "Y".to_string()],
        );
        for (date, x, y) in rows {
            table.push_row(StatisticRow::new(date.to_string(), vec![*x, *y]));
        }
        table
    }

    fn monthly(table: &StatisticTable, statistic: Statistic) -> StatisticTable {
        roll_up(table, statistic, Granularity::Month, |d| {
            Granularity::Month.period_key(d)
        })
        .unwrap()
    }

    #[test]
    fn test_monthly_mean_of_means() {
        let daily = daily_table(&[
            ("2021-01-01", Some(10.0), Some(1.0)),
            ("2021-01-02", Some(20.0), Some(2.0)),
            ("2021-01-03", None, Some(2.0)),
        ]);

        let rolled = monthly(&daily, Statistic::Mean);

        assert_eq!(rolled.len(), 1);
        assert_eq!(rolled.value("2021-01", "X"), Some(15.0));
        assert_eq!(rolled.value("2021-01", "Y"), Some(1.7));
    }

    #[test]
    fn test_extrema_are_not_rounded() {
        let daily = daily_table(&[
            ("2021-03-01", Some(1.234), Some(9.87)),
            ("2021-03-15", Some(5.678), Some(0.12)),
        ]);

        let max = monthly(&daily, Statistic::Max);
        let min = monthly(&daily, Statistic::Min);

        assert_eq!(max.value("2021-03", "X"), Some(5.678));
        assert_eq!(min.value("2021-03", "Y"), Some(0.12));
    }

    #[test]
    fn test_sparse_periods_in_ascending_order() {
        let daily = daily_table(&[
            ("2021-04-30", Some(1.0), None),
            ("2020-12-31", Some(2.0), None),
            ("2021-01-01", Some(3.0), None),
        ]);

        let rolled = monthly(&daily, Statistic::Max);
        let keys: Vec<_> = rolled.rows().iter().map(|r| r.key.as_str()).collect();

        assert_eq!(keys, vec!["2020-12", "2021-01", "2021-04"]);
        assert_eq!(rolled.granularity(), Granularity::Month);
        assert_eq!(rolled.value("2021-04", "Y"), None);
    }

    #[test]
    fn test_yearly_grouping() {
        let daily = daily_table(&[
            ("2020-06-01", Some(8.0), None),
            ("2020-12-31", Some(3.0), None),
            ("2021-01-01", Some(5.0), None),
        ]);

        let rolled = roll_up(&daily, Statistic::Min, Granularity::Year, |d| {
            Granularity::Year.period_key(d)
        })
        .unwrap();

        assert_eq!(rolled.value("2020", "X"), Some(3.0));
        assert_eq!(rolled.value("2021", "X"), Some(5.0));
    }

    #[test]
    fn test_invalid_date_rejected() {
        let daily = daily_table(&[("01/02/2021", Some(1.0), None)]);
        let result = roll_up(&daily, Statistic::Mean, Granularity::Month, |d| {
            Granularity::Month.period_key(d)
        });

        assert!(matches!(result, Err(ProcessingError::InvalidFormat(_))));
    }

    #[test]
    fn test_day_granularity_rejected() {
        let config = PipelineConfig::default();
        assert!(RollupAggregator::new(&config, Granularity::Day).is_err());
        assert_eq!(
            RollupAggregator::new(&config, Granularity::Year)
                .unwrap()
                .granularity(),
            Granularity::Year
        );
    }

    #[test]
    fn test_shorthand_constructors() {
        let config = PipelineConfig::default();
        assert_eq!(RollupAggregator::monthly(&config).granularity(), Granularity::Month);
        assert_eq!(RollupAggregator::yearly(&config).granularity(), Granularity::Year);
    }

    #[test]
    fn test_run_skips_missing_pairs() -> Result<()> {
        let dir = TempDir::new()?;
        let config = PipelineConfig::default()
            .with_output_dir(dir.path())
            .with_pollutants(&["AQI", "SO2"]);

        fs::write(
            dir.path().join("AQI_daymax.csv"),
            "date,X\n2021-01-01,4.0\n2021-01-02,9.0\n",
        )?;
        fs::write(dir.path().join("AQI_daymin.csv"), "week,X\n1,4.0\n")?;

        let report = RollupAggregator::monthly(&config).run(None);

        assert_eq!(report.tables_written, vec![dir.path().join("AQI_monthmax.csv")]);
        assert_eq!(report.failed_pairs.len(), 1);
        assert_eq!(report.failed_pairs[0].name, "AQI_daymin.csv");
        // AQI mean plus all three SO2 tables
        assert_eq!(report.missing_inputs.len(), 4);

        let contents = fs::read_to_string(dir.path().join("AQI_monthmax.csv"))?;
        assert_eq!(contents, "month,X\n2021-01,9.0\n");
        Ok(())
    }
}
