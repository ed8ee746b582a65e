use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aq-processor")]
#[command(about = "Daily, monthly and yearly air-quality aggregation pipeline")]
#[command(version)]
pub struct Cli {
    /// Stage to run [default: run]
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(
        short,
        long,
        global = true,
        help = "Configuration file (TOML, YAML or JSON) overriding built-in defaults"
    )]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Hide progress bars")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Run the daily stage, then the monthly and yearly roll-ups
    Run,

    /// Build {pollutant}_day{stat}.csv tables from the raw daily files
    Daily,

    /// Roll the daily tables up into {pollutant}_month{stat}.csv
    Monthly,

    /// Roll the daily tables up into {pollutant}_year{stat}.csv
    Yearly,

    /// Display information about a generated table
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "5")]
        sample: usize,

        #[arg(long, help = "Print the summary as JSON")]
        json: bool,
    },
}
