use std::path::PathBuf;

use clap::Parser;

use crate::Commands;

/// Main CLI application arguments and command structure
#[derive(Parser, Debug)]
#[clap(
    name = "promptex",
    version,
    about = "Prompt and idea manager with markdown storage"
)]
pub struct Cli {
    /// Path to the configuration file
    #[clap(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Directory holding the prompt documents and the metadata index
    #[clap(long, value_parser)]
    pub data_dir: Option<PathBuf>,

    /// Directory receiving the simplified copies
    #[clap(long, value_parser)]
    pub resources_dir: Option<PathBuf>,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands for the promptex application
    #[clap(subcommand)]
    pub command: Commands,
}
