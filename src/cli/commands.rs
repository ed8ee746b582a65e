use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::analyzers::TableAnalyzer;
use crate::cli::args::{Cli, Commands};
use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::models::Granularity;
use crate::processors::Pipeline;

/// Install the stdout log subscriber. `--verbose` forces debug output,
/// otherwise `RUST_LOG` applies with an `info` default.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .compact()
        .with_env_filter(filter)
        .try_init();
}

pub fn run(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(Commands::Run);

    match command {
        Commands::Info { file, sample, json } => show_info(&file, sample, json),
        stage => {
            let config = PipelineConfig::load(cli.config.as_deref())?;
            run_stage(stage, &config, cli.quiet)
        }
    }
}

fn run_stage(command: Commands, config: &PipelineConfig, quiet: bool) -> Result<()> {
    info!("Raw data directory: {}", config.raw_data_dir.display());
    info!("Output directory: {}", config.output_dir.display());

    let pipeline = Pipeline::new(config).with_silent(quiet);

    match command {
        Commands::Run => {
            if let Some(report) = tolerate_empty_input(pipeline.run())? {
                info!(
                    "Pipeline complete: {} tables generated",
                    report.daily.tables_written.len()
                        + report.monthly.tables_written.len()
                        + report.yearly.tables_written.len()
                );
            }
        }
        Commands::Daily => {
            if let Some(report) = tolerate_empty_input(pipeline.run_daily())? {
                info!("{}", report.summary());
            }
        }
        Commands::Monthly => {
            let report = pipeline.run_rollup(Granularity::Month)?;
            info!("{}", report.summary());
        }
        Commands::Yearly => {
            let report = pipeline.run_rollup(Granularity::Year)?;
            info!("{}", report.summary());
        }
        Commands::Info { .. } => unreachable!("info is handled before loading configuration"),
    }

    Ok(())
}

/// An empty raw input set ends the run with a diagnostic, not a failure
fn tolerate_empty_input<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e @ ProcessingError::NoInputFiles { .. }) => {
            error!("{}", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn show_info(file: &Path, sample: usize, json: bool) -> Result<()> {
    let analyzer = TableAnalyzer::new();
    let (table, summary) = analyzer.analyze(file)?;

    if json {
        let rendered = serde_json::to_string_pretty(&summary)
            .map_err(|e| ProcessingError::InvalidFormat(e.to_string()))?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("{}", summary.detailed_summary());

    if sample > 0 {
        println!("\nSample rows (showing up to {}):", sample);
        for (i, line) in TableAnalyzer::sample_rows(&table, sample, 8).iter().enumerate() {
            println!("{}. {}", i + 1, line);
        }
    }

    Ok(())
}
