//! Command-line wrapper around the extraction harness.
//!
//! Usage:
//!   sheet-harvest                          # run with ./sheet-harvest.toml or defaults
//!   sheet-harvest --config run.toml        # run with a configuration file
//!   sheet-harvest --out out a.js b.js      # run the given files, in order

use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

use clap::Parser;
use sheet_harvest::config::HarnessConfig;
use sheet_harvest::harness::error::HarnessError;
use sheet_harvest::harness::output::write_documents;
use sheet_harvest::harness::run::{load_scripts, script_paths, Harness};
use sheet_harvest::harness::TracingObserver;
use tracing_subscriber::EnvFilter;

/// Stack for the worker thread; content definitions nest deeply.
const WORKER_STACK_SIZE: usize = 256 * 1024 * 1024;

const DEFAULT_CONFIG_FILE: &str = "sheet-harvest.toml";

/// Run content definition scripts and write their registries as JSON.
#[derive(Parser, Debug)]
#[command(name = "sheet-harvest")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory, overriding the configuration
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Script files to run in order, overriding the configured list
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let worker = thread::Builder::new()
        .name("harness".to_string())
        .stack_size(WORKER_STACK_SIZE)
        .spawn(move || run(cli));

    let outcome = match worker {
        Ok(handle) => handle.join(),
        Err(e) => {
            tracing::error!(error = %e, "failed to start worker thread");
            return ExitCode::FAILURE;
        }
    };
    match outcome {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(e)) => {
            tracing::error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
        Err(_) => {
            tracing::error!("worker thread panicked");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<HarnessConfig, HarnessError> {
    let mut config = match &cli.config {
        Some(path) => HarnessConfig::load(path)?,
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_path.is_file() {
                HarnessConfig::load(&default_path)?
            } else {
                HarnessConfig::default()
            }
        }
    };
    if let Some(out) = &cli.out {
        config.output_dir = out.clone();
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<(), HarnessError> {
    let config = load_config(&cli)?;
    let paths = if cli.files.is_empty() {
        script_paths(&config)?
    } else {
        cli.files.clone()
    };
    let scripts = load_scripts(&paths)?;
    tracing::info!(files = scripts.len(), "starting run");

    let output = Harness::new(&config).run(scripts, &mut TracingObserver)?;
    write_documents(&config.output_dir, &output.documents, &output.manifest)?;

    for (label, message) in output.manifest.failed_files() {
        eprintln!("{}: {}", label, message);
    }
    Ok(())
}
