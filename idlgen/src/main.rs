mod commands;
mod config;
mod reports;

use clap::Parser;
use eyre::Result;

use crate::commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    config::init_logging(cli.verbose);
    cli.run()
}
