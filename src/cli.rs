use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vulnrelay::report::OutputFormat;

#[derive(Parser)]
#[command(
    name = "vulnrelay",
    version,
    about = "Report security-scan findings to issue trackers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report a findings batch to the configured trackers
    Report {
        /// Path to the findings JSON document
        findings: PathBuf,

        /// Custom config file path (default: vulnrelay.toml)
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Output format for the run outcome
        #[arg(long, short, default_value = "pretty", value_enum)]
        format: OutputFormat,

        /// Write the outcome to file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Validate the configuration and exit
    #[command(name = "check-config")]
    CheckConfig {
        /// Custom config file path (default: vulnrelay.toml)
        #[arg(long, short)]
        config: Option<PathBuf>,
    },

    /// Print a commented sample configuration
    #[command(name = "sample-config")]
    SampleConfig,
}
