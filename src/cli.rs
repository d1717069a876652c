use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

/// Precinct reapportionment CLI (argument schema only)
#[derive(Parser, Debug)]
#[command(name = "precinctor", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reapportion demographic data onto precincts per a run configuration
    Prorate(ProrateArgs),
}

#[derive(Args, Debug)]
pub struct ProrateArgs {
    /// Run configuration file (JSON)
    #[arg(value_hint = ValueHint::FilePath)]
    pub config: PathBuf,

    /// Output directory for the precinct GeoJSON and reconciliation CSVs
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    pub out: PathBuf,

    /// Overwrite outputs if they already exist
    #[arg(long)]
    pub force: bool,
}
