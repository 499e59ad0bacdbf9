//! Project configuration management for `jac.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build      # [build]
//! │   ├── plugins    # [plugins.client.assets]
//! │   └── serve      # [serve]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! ├── util.rs        # Config file discovery
//! └── mod.rs         # ProjectConfig (this file)
//! ```
//!
//! `jac.toml` is a whole-project manifest. Only the sections listed above are
//! read; any other section is left to the tools that own it.
//!
//! The loaded [`ProjectConfig`] is a plain value: it is built once in `main`
//! and handed to the pipeline through [`crate::asset::BuildContext`].

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{BuildSectionConfig, PluginsConfig, ServeConfig, StalePolicy};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{BuildArgs, Cli, Commands},
    debug, log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Source directory for assets, relative to the project root.
/// Also the first segment of the output path and of the serving route.
pub const ASSETS_DIR: &str = "assets";

/// Name of the build output directory inside `build_dir`.
const BUILD_SUBDIR: &str = "build";

/// Record of files copied by the last successful build, inside the build output.
const RECORD_FILE: &str = ".assets.json";

/// Top-level keys whose unknown children are reported as warnings.
const OWNED_SECTIONS: &[&str] = &["build.", "serve.", "plugins.client.assets."];

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing the parts of `jac.toml` this
/// tool reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Build settings
    #[serde(default)]
    pub build: BuildSectionConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Plugin settings (only `plugins.client.assets` is used)
    #[serde(default)]
    pub plugins: PluginsConfig,
}

impl ProjectConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file; the project root is
    /// the config file's parent directory. A missing config file is not an
    /// error: defaults apply and cwd becomes the root.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let (mut config, mut diag, config_path) = match find_config_file(&cwd, &cli.config) {
            Some(path) => {
                let (config, diag) = Self::from_path(&path)?;
                (config, diag, path)
            }
            None => {
                log!(
                    "warning";
                    "config file '{}' not found, using defaults",
                    cli.config.display()
                );
                (Self::default(), ConfigDiagnostics::new(), cwd.join(&cli.config))
            }
        };

        // Validate raw paths before they are joined with the root
        config.build.validate_paths(&mut diag);

        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.clone());
        config.config_path = crate::utils::path::normalize_path(&config_path);
        config.set_root(&crate::utils::path::normalize_path(&root));
        config.apply_command_options(cli);

        config.validate(diag)?;
        debug!("config"; "root: {}", config.get_root().display());
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path, collecting unknown fields of the
    /// sections this tool owns.
    fn from_path(path: &Path) -> Result<(Self, ConfigDiagnostics)> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        let mut diag = ConfigDiagnostics::new();
        for field in ignored.into_iter().filter(|f| is_owned_field(f)) {
            diag.unknown_field(field);
        }

        Ok((config, diag))
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.root = path.to_path_buf();
    }

    /// Join a path with the root directory.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Get path relative to the project root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// Custom extensions from `plugins.client.assets.custom_extensions`,
    /// in declaration order. Empty when the key is absent.
    pub fn custom_extensions(&self) -> &[String] {
        &self.plugins.client.assets.custom_extensions
    }

    // ========================================================================
    // layout
    // ========================================================================

    /// `<root>/assets`
    pub fn asset_source_dir(&self) -> PathBuf {
        self.root_join(ASSETS_DIR)
    }

    /// `<root>/<build_dir>/build`
    pub fn output_dir(&self) -> PathBuf {
        self.root_join(&self.build.build_dir).join(BUILD_SUBDIR)
    }

    /// `<root>/<build_dir>/build/assets`
    pub fn asset_output_dir(&self) -> PathBuf {
        self.output_dir().join(ASSETS_DIR)
    }

    /// `<root>/<build_dir>/build/.assets.json`
    pub fn record_path(&self) -> PathBuf {
        self.output_dir().join(RECORD_FILE)
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Build { build_args } => {
                self.apply_build_args(build_args);
            }
            Commands::Serve {
                build_args,
                interface,
                port,
                ..
            } => {
                self.apply_build_args(build_args);
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
            }
        }
    }

    /// Apply build arguments from CLI.
    fn apply_build_args(&mut self, args: &BuildArgs) {
        crate::logger::set_verbose(args.verbose);
        self.build.clean = args.clean;
        self.build.dry_run = args.dry_run;
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Run section validation, print hints and warnings, fail on errors.
    fn validate(&self, mut diag: ConfigDiagnostics) -> Result<()> {
        self.plugins.client.assets.validate(&mut diag);

        diag.print_hints_and_warnings();

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

fn is_owned_field(path: &str) -> bool {
    OWNED_SECTIONS.iter().any(|prefix| path.starts_with(prefix))
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields in owned sections
/// (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> ProjectConfig {
    let (parsed, ignored) = ProjectConfig::parse_with_ignored(content).unwrap();
    let owned: Vec<_> = ignored.iter().filter(|f| is_owned_field(f)).collect();
    assert!(owned.is_empty(), "test config has unknown fields: {owned:?}");
    parsed
}

/// Config rooted at `root` with the given `jac.toml` content.
#[cfg(test)]
pub fn test_config_at(root: &Path, content: &str) -> ProjectConfig {
    let mut config = test_parse_config(content);
    config.config_path = root.join("jac.toml");
    config.set_root(root);
    config
}

// ============================================================================
// tests
// ============================================================================
