//! fiwgan CLI
//!
//! # Usage
//!
//! ```bash
//! # Train from config
//! fiwgan train config.yaml
//!
//! # Train with overrides
//! fiwgan train config.yaml --job-id speech01 --epochs 20 --loss wgan-gp
//!
//! # Validate config
//! fiwgan validate config.yaml --detailed
//!
//! # Show the resolved config
//! fiwgan info config.yaml --format yaml
//!
//! # Render clips from a trained generator
//! fiwgan generate --run-dir train/speech01 --output samples -n 8
//! ```
//!
//! Library diagnostics go through `tracing`; set `RUST_LOG` (for example
//! `RUST_LOG=fiwgan=debug`) to see them.

use clap::Parser;
use fiwgan::cli::{run_command, Cli};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "fiwgan=info" } else { "fiwgan=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
