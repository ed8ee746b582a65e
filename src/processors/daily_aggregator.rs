use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{Granularity, RawDailyRecord, Statistic, StatisticTable};
use crate::processors::{DailyReport, SkippedInput};
use crate::readers::RawFileReader;
use crate::utils::filename::{discover_files, display_name, FilenameDateRule};
use crate::utils::progress::ProgressReporter;
use crate::writers::TableWriter;

/// Accumulated daily tables keyed by (pollutant, statistic)
pub type DailyTables = HashMap<(String, Statistic), StatisticTable>;

/// Reduces raw per-day files into `{pollutant}_day{statistic}.csv` tables.
pub struct DailyAggregator<'a> {
    config: &'a PipelineConfig,
    date_rule: FilenameDateRule,
    reader: RawFileReader,
    writer: TableWriter,
}

impl<'a> DailyAggregator<'a> {
    pub fn new(config: &'a PipelineConfig) -> Result<Self> {
        Ok(Self {
            config,
            date_rule: config.date_rule()?,
            reader: RawFileReader::from_config(config),
            writer: TableWriter::new(),
        })
    }

    /// Process every raw file and write the daily tables.
    ///
    /// Fails only when no raw file is found; unreadable files are skipped and
    /// recorded in the report.
    pub fn run(&self, progress: Option<&ProgressReporter>) -> Result<DailyReport> {
        let start = Instant::now();
        fs::create_dir_all(&self.config.output_dir)?;

        let files = discover_files(
            &self.config.raw_data_dir,
            &self.config.file_prefix,
            &self.config.file_extension,
        )?;

        if files.is_empty() {
            return Err(ProcessingError::NoInputFiles {
                dir: self.config.raw_data_dir.clone(),
                pattern: self.config.raw_file_pattern(),
            });
        }

        info!(
            "Found {} files, computing [{}] for {} pollutants",
            files.len(),
            self.config
                .stats_types
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            self.config.pollutants.len()
        );

        let mut report = DailyReport::new(files.len());
        let dated_files = self.resolve_dates(files, &mut report);
        let tables = self.aggregate(&dated_files, &mut report, progress);
        self.write_tables(&tables, &mut report);

        report.elapsed = start.elapsed();
        Ok(report)
    }

    /// Attach the filename date to each file, ordered chronologically.
    ///
    /// Files without a usable date token are skipped, as is any file whose
    /// date was already claimed by an earlier file name.
    pub fn resolve_dates(
        &self,
        files: Vec<PathBuf>,
        report: &mut DailyReport,
    ) -> Vec<(NaiveDate, PathBuf)> {
        let mut dated = Vec::with_capacity(files.len());

        for path in files {
            match self.date_rule.extract_date(&path) {
                Ok(date) => dated.push((date, path)),
                Err(e) => {
                    let name = display_name(&path);
                    error!("File {} skipped: {}", name, e);
                    report.skip(name, e);
                }
            }
        }

        // Stable: equal dates keep filename order
        dated.sort_by_key(|(date, _)| *date);

        let mut seen = HashSet::new();
        dated.retain(|(date, path)| {
            if seen.insert(*date) {
                return true;
            }
            let name = display_name(path);
            warn!("File {} skipped: date {} already processed", name, date);
            report.skip(name, format!("Duplicate date {}", date));
            false
        });

        dated
    }

    /// Read each file in order and accumulate its per-pollutant reductions
    pub fn aggregate(
        &self,
        files: &[(NaiveDate, PathBuf)],
        report: &mut DailyReport,
        progress: Option<&ProgressReporter>,
    ) -> DailyTables {
        let mut tables = DailyTables::new();
        let total = files.len();

        for (i, (date, path)) in files.iter().enumerate() {
            match self.reader.read_record(path, *date) {
                Ok(record) => {
                    self.accumulate(&record, &mut tables);
                    report.files_processed += 1;
                }
                Err(e) => {
                    let name = display_name(path);
                    error!("File {} failed: {}", name, e);
                    report.skip(name, e);
                }
            }

            if let Some(p) = progress {
                p.increment(1);
            }
            if (i + 1) % self.config.progress_interval == 0 {
                info!("Processed {} / {} files", i + 1, total);
            }
        }

        tables
    }

    /// Append one row per (pollutant, statistic) for the pollutants present
    /// in `record`. Absent pollutants contribute nothing for that day.
    pub fn accumulate(&self, record: &RawDailyRecord, tables: &mut DailyTables) {
        let key = Granularity::Day.period_key(record.date);

        for pollutant in &self.config.pollutants {
            if !record.has_pollutant(pollutant) {
                debug!("{}: no {} rows", key, pollutant);
                continue;
            }

            for &statistic in &self.config.stats_types {
                if let Some(values) = record.reduce(pollutant, statistic) {
                    tables
                        .entry((pollutant.clone(), statistic))
                        .or_insert_with(|| StatisticTable::new(Granularity::Day))
                        .append(key.clone(), &record.cities, &values);
                }
            }
        }
    }

    fn write_tables(&self, tables: &DailyTables, report: &mut DailyReport) {
        for pollutant in &self.config.pollutants {
            for &statistic in &self.config.stats_types {
                let Some(table) = tables.get(&(pollutant.clone(), statistic)) else {
                    continue;
                };
                if table.is_empty() {
                    continue;
                }

                let path = self.config.table_path(Granularity::Day, pollutant, statistic);
                match self.writer.write_table(table, &path) {
                    Ok(()) => {
                        info!("Generated {} ({} rows)", display_name(&path), table.len());
                        report.tables_written.push(path);
                    }
                    Err(e) => {
                        let name = display_name(&path);
                        error!("Writing {} failed: {}", name, e);
                        report.failed_tables.push(SkippedInput::new(name, e));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readers::TableReader;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_raw(dir: &Path, name: &str, lines: &[&str]) {
        fs::write(dir.join(name), lines.join("\n") + "\n").unwrap();
    }

    fn setup() -> (TempDir, PipelineConfig) {
        let dir = TempDir::new().unwrap();
        let raw = dir.path().join("raw");
        fs::create_dir_all(&raw).unwrap();
        let config = PipelineConfig::default()
            .with_raw_data_dir(&raw)
            .with_output_dir(dir.path().join("out"));
        (dir, config)
    }

    #[test]
    fn test_daily_tables_from_raw_files() -> Result<()> {
        let (_dir, config) = setup();
        write_raw(
            &config.raw_data_dir,
            "china_cities_20210102.csv",
            &[
                "date,hour,type,Beijing,Shanghai",
                "20210102,0,AQI,40,10",
                "20210102,1,AQI,60,",
            ],
        );
        write_raw(
            &config.raw_data_dir,
            "china_cities_20210101.csv",
            &[
                "date,hour,type,Beijing,Shanghai",
                "20210101,0,AQI,10,20",
                "20210101,0,CO,1.5,0.5",
            ],
        );

        let report = DailyAggregator::new(&config)?.run(None)?;

        assert_eq!(report.files_processed, 2);
        assert!(report.skipped_files.is_empty());
        // AQI and CO, three statistics each
        assert_eq!(report.tables_written.len(), 6);

        let reader = TableReader::new();
        let mean = reader.read_table(&config.output_dir.join("AQI_daymean.csv"))?;
        let keys: Vec<_> = mean.rows().iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["2021-01-01", "2021-01-02"]);
        assert_eq!(mean.value("2021-01-02", "Beijing"), Some(50.0));
        assert_eq!(mean.value("2021-01-02", "Shanghai"), Some(10.0));

        let co_max = reader.read_table(&config.output_dir.join("CO_daymax.csv"))?;
        assert_eq!(co_max.len(), 1);
        assert!(!config.output_dir.join("O3_daymean.csv").exists());
        Ok(())
    }

    #[test]
    fn test_no_raw_files_aborts() {
        let (_dir, config) = setup();

        let err = DailyAggregator::new(&config).unwrap().run(None).unwrap_err();

        assert!(matches!(err, ProcessingError::NoInputFiles { .. }));
        assert!(config.output_dir.is_dir());
    }

    #[test]
    fn test_duplicate_dates_keep_first_file() {
        let (_dir, config) = setup();
        let aggregator = DailyAggregator::new(&config).unwrap();
        let mut report = DailyReport::new(3);

        let files = vec![
            PathBuf::from("china_cities_20210102.csv"),
            PathBuf::from("china_cities_20210101.csv"),
            PathBuf::from("china_cities_20210101_v2.csv"),
            PathBuf::from("china_cities_latest.csv"),
        ];
        let dated = aggregator.resolve_dates(files, &mut report);

        let names: Vec<_> = dated.iter().map(|(_, p)| display_name(p)).collect();
        assert_eq!(
            names,
            vec!["china_cities_20210101.csv", "china_cities_20210102.csv"]
        );
        assert_eq!(report.skipped_files.len(), 2);
    }

    #[test]
    fn test_pollutant_filter_respected() {
        let (_dir, config) = setup();
        let config = config.with_pollutants(&["PM10"]);
        let aggregator = DailyAggregator::new(&config).unwrap();

        let record = RawDailyRecord::new(
            NaiveDate::from_ymd_opt(2021, 5, 1).unwrap(),
            vec!["Wuhan".to_string()],
            vec![
                crate::models::RawRow {
                    pollutant: "AQI".to_string(),
                    values: vec![Some(80.0)],
                },
                crate::models::RawRow {
                    pollutant: "PM10".to_string(),
                    values: vec![None],
                },
            ],
        );

        let mut tables = DailyTables::new();
        aggregator.accumulate(&record, &mut tables);

        assert_eq!(tables.len(), 3);
        let mean = &tables[&("PM10".to_string(), Statistic::Mean)];
        assert_eq!(mean.len(), 1);
        assert_eq!(mean.value("2021-05-01", "Wuhan"), None);
    }
}
