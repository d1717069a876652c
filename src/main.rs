use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use precinctor::cli::{Cli, Commands};
use precinctor::commands::prorate;

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .init();

    match &cli.command {
        Commands::Prorate(args) => prorate::run(&cli, args),
    }
}
