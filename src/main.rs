// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "luxmeter")]
#[command(about = "Camera luminance metering tool")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Meter average luminance from a camera (default command)
    Meter(cli::MeterArgs),

    /// List available capture devices
    List,

    /// Compute mean luminance for image files
    Analyze {
        /// Image files to analyze
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=luxmeter=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Meter(args)) => cli::run_meter(args),
        Some(Commands::List) => cli::list_devices(),
        Some(Commands::Analyze { images }) => cli::analyze_images(images),
        None => cli::run_meter(cli::MeterArgs::default()),
    }
}
