// ABOUTME: Command-line arguments for the dockyard demo shell
// ABOUTME: Overrides config directory, initial layout and logging verbosity

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "dockyard", version, about = "Dockable desktop shell core")]
pub struct Args {
    /// Directory containing dockyard.toml and stored preferences
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Layout kind to start with, overriding the stored preference
    #[arg(long, value_name = "KIND")]
    pub layout: Option<String>,

    /// Populate the shell with every window of a factory category
    #[arg(long, value_name = "CATEGORY")]
    pub populate: Vec<String>,

    /// Shell commands to run in order, e.g. "change-layout Full"
    #[arg(long = "command", short = 'c', value_name = "COMMAND")]
    pub commands: Vec<String>,

    /// Units of simulated background work reporting progress
    #[arg(long, default_value_t = 5)]
    pub work_units: usize,

    /// List registered window factories and exit
    #[arg(long)]
    pub list_factories: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

pub fn parse_args() -> Args {
    Args::parse()
}
