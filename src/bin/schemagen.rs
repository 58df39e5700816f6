use clap::Parser;
use schemagen::cli::{run, Cli};
use schemagen::logging::init_logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;
    run(cli)
}
