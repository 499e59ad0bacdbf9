//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Copy and serve static client assets of a Jac project
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Project manifest path, searched upward from the current directory
    #[arg(short = 'C', long, default_value = "jac.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Copy assets into the build output
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Build, then serve the output under /assets/
    #[command(visible_aliases = ["run", "s"])]
    Serve {
        #[command(flatten)]
        build_args: BuildArgs,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Serve the existing output without building first
        #[arg(long)]
        no_build: bool,
    },
}

/// Shared build arguments for Build and Serve commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Remove the output asset directory before copying
    #[arg(short, long)]
    pub clean: bool,

    /// Print what would be copied without touching the filesystem
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("jac-assets").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_build_flags() {
        let cli = parse(&["build", "--clean", "-V"]);
        let Commands::Build { build_args } = cli.command else {
            panic!("expected build");
        };
        assert!(build_args.clean);
        assert!(build_args.verbose);
        assert!(!build_args.dry_run);
        assert_eq!(cli.config, PathBuf::from("jac.toml"));
    }

    #[test]
    fn test_aliases() {
        assert!(matches!(parse(&["b"]).command, Commands::Build { .. }));
        assert!(matches!(parse(&["s"]).command, Commands::Serve { .. }));
        assert!(matches!(parse(&["run"]).command, Commands::Serve { .. }));
    }

    #[test]
    fn test_serve_overrides() {
        let cli = parse(&["-C", "app/jac.toml", "serve", "-i", "0.0.0.0", "-p", "9000", "--no-build"]);
        let Commands::Serve {
            interface,
            port,
            no_build,
            ..
        } = cli.command
        else {
            panic!("expected serve");
        };
        assert_eq!(interface, Some("0.0.0.0".parse().unwrap()));
        assert_eq!(port, Some(9000));
        assert!(no_build);
        assert_eq!(cli.config, PathBuf::from("app/jac.toml"));
    }

    #[test]
    fn test_missing_subcommand_rejected() {
        assert!(Cli::try_parse_from(["jac-assets"]).is_err());
    }
}
