mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;
use vulnrelay::{config, finding, report};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            findings,
            config: config_path,
            format,
            output: output_path,
        } => {
            if !findings.exists() {
                eprintln!("Error: findings file does not exist: {}", findings.display());
                std::process::exit(2);
            }

            let config = config::Config::load(config_path.as_deref()).unwrap_or_else(|e| {
                eprintln!("Error: {e}");
                std::process::exit(2);
            });

            let batch = finding::load_findings(&findings).unwrap_or_else(|e| {
                eprintln!("Error reading findings: {e}");
                std::process::exit(2);
            });

            // No email service is wired from the CLI; library consumers
            // supply their own transport.
            let outcome = report::run_report(batch, &config, None, &[]).unwrap_or_else(|e| {
                eprintln!("Error: {e}");
                std::process::exit(2);
            });

            let formatted = report::format_outcome(&outcome, &format);
            if let Some(out_path) = output_path {
                std::fs::write(&out_path, &formatted).unwrap_or_else(|e| {
                    eprintln!("Error writing output: {e}");
                    std::process::exit(2);
                });
                eprintln!("Output written to {}", out_path.display());
            } else {
                print!("{formatted}");
            }

            std::process::exit(if outcome.error_count() == 0 { 0 } else { 1 });
        }

        Commands::CheckConfig {
            config: config_path,
        } => {
            let config = config::Config::load(config_path.as_deref()).unwrap_or_else(|e| {
                eprintln!("Error: {e}");
                std::process::exit(2);
            });
            match config.validate() {
                Ok(()) => println!("Configuration is valid."),
                Err(e) => {
                    eprintln!("Error: {e}");
                    std::process::exit(2);
                }
            }
        }

        Commands::SampleConfig => {
            print!("{}", config::SAMPLE_CONFIG);
        }
    }
}
