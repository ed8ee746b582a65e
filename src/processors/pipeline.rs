use serde::Serialize;
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::Granularity;
use crate::processors::{DailyAggregator, DailyReport, RollupAggregator, RollupReport};
use crate::utils::progress::ProgressReporter;

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub daily: DailyReport,
    pub monthly: RollupReport,
    pub yearly: RollupReport,
}

/// Daily stage followed by the two independent roll-ups.
///
/// The roll-ups start only after every daily table has been written.
pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    silent: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self {
            config,
            silent: false,
        }
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn run(&self) -> Result<PipelineReport> {
        let daily = self.run_daily()?;
        info!("{}", daily.summary());

        let monthly = self.run_rollup(Granularity::Month)?;
        info!("{}", monthly.summary());

        let yearly = self.run_rollup(Granularity::Year)?;
        info!("{}", yearly.summary());

        Ok(PipelineReport {
            daily,
            monthly,
            yearly,
        })
    }

    pub fn run_daily(&self) -> Result<DailyReport> {
        let aggregator = DailyAggregator::new(self.config)?;
        let progress = ProgressReporter::new_spinner("Reading raw files...", self.silent);

        let report = aggregator.run(Some(&progress))?;
        progress.finish_with_message(&format!("Processed {} files", report.files_processed));
        Ok(report)
    }

    pub fn run_rollup(&self, granularity: Granularity) -> Result<RollupReport> {
        let aggregator = RollupAggregator::new(self.config, granularity)?;
        let pairs = (self.config.pollutants.len() * self.config.stats_types.len()) as u64;
        let progress = ProgressReporter::new(
            pairs,
            &format!("Generating {} tables...", granularity),
            self.silent,
        );

        let report = aggregator.run(Some(&progress));
        progress.finish();
        Ok(report)
    }
}
