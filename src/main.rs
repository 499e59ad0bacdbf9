//! jac-assets - Copy and serve the static client assets of a Jac project.

mod asset;
mod cli;
mod config;
mod core;
mod logger;
mod utils;

use anyhow::Result;
use asset::BuildContext;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::ProjectConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = ProjectConfig::load(&cli)?;
    let ctx = BuildContext::new(&config);

    match &cli.command {
        Commands::Build { .. } => cli::build::build_assets(&ctx, false).map(|_| ()),
        Commands::Serve { no_build, .. } => cli::serve::serve_assets(&ctx, *no_build),
    }
}
