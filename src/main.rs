use aq_processor::cli::{init_logging, run, Cli};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli)?;
    Ok(())
}
