//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! build_dir = ".jac"   # assets land in .jac/build/assets/
//! stale = "prune"      # prune | keep | clean
//! ```

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ASSETS_DIR, ConfigDiagnostics, FieldPath};

/// What happens to output files that the current build no longer produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StalePolicy {
    /// Delete files recorded by the previous build that are not in the
    /// current manifest. Files this tool never wrote are left alone.
    #[default]
    Prune,
    /// Never delete anything from the output tree.
    Keep,
    /// Remove the whole output asset directory before copying.
    Clean,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Build directory, relative to the project root.
    pub build_dir: PathBuf,

    /// Stale output handling.
    pub stale: StalePolicy,

    /// Set by `--clean`; forces [`StalePolicy::Clean`] for this run.
    #[serde(skip)]
    pub clean: bool,

    /// Set by `--dry-run`; print the manifest without writing.
    #[serde(skip)]
    pub dry_run: bool,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            build_dir: PathBuf::from(".jac"),
            stale: StalePolicy::default(),
            clean: false,
            dry_run: false,
        }
    }
}

impl BuildSectionConfig {
    pub const BUILD_DIR: FieldPath = FieldPath::new("build.build_dir");

    /// Policy in effect for this run (`--clean` wins over the config).
    pub fn effective_stale(&self) -> StalePolicy {
        if self.clean {
            StalePolicy::Clean
        } else {
            self.stale
        }
    }

    /// Check `build_dir` for unsafe components (`..` or absolute) and for
    /// placement inside the scanned asset directory.
    ///
    /// Must run before the path is joined with the project root.
    pub fn validate_paths(&self, diag: &mut ConfigDiagnostics) {
        validate_relative(&self.build_dir, Self::BUILD_DIR, diag);
        validate_outside_assets(&self.build_dir, Self::BUILD_DIR, diag);
    }
}

/// Output under `assets/` would be scanned and copied again on every build.
fn validate_outside_assets(path: &Path, field: FieldPath, diag: &mut ConfigDiagnostics) {
    let first = path
        .components()
        .find(|c| !matches!(c, Component::CurDir));
    if let Some(Component::Normal(name)) = first
        && name == ASSETS_DIR
    {
        diag.error_with_hint(
            field,
            format!(
                "path '{}': build output may not be inside '{ASSETS_DIR}/'",
                path.display()
            ),
            "use a directory next to it, e.g. \".jac\"",
        );
    }
}

fn validate_relative(path: &Path, field: FieldPath, diag: &mut ConfigDiagnostics) {
    for comp in path.components() {
        let reason = match comp {
            Component::ParentDir => "parent directory '..' not allowed",
            Component::Prefix(_) | Component::RootDir => "absolute paths not allowed",
            _ => continue,
        };
        diag.error_with_hint(
            field,
            format!("path '{}': {reason}", path.display()),
            "use a directory inside the project root, e.g. \".jac\"",
        );
        return;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_build_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.build.build_dir, PathBuf::from(".jac"));
        assert_eq!(config.build.stale, StalePolicy::Prune);
        assert!(!config.build.clean);
    }

    #[test]
    fn test_stale_policy_parse() {
        let config = test_parse_config("[build]\nstale = \"keep\"");
        assert_eq!(config.build.stale, StalePolicy::Keep);

        let config = test_parse_config("[build]\nstale = \"clean\"\nbuild_dir = \"out\"");
        assert_eq!(config.build.stale, StalePolicy::Clean);
        assert_eq!(config.build.build_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_clean_flag_overrides_policy() {
        let mut build = BuildSectionConfig::default();
        assert_eq!(build.effective_stale(), StalePolicy::Prune);
        build.clean = true;
        assert_eq!(build.effective_stale(), StalePolicy::Clean);
    }

    #[test]
    fn test_build_dir_must_be_relative() {
        let mut diag = ConfigDiagnostics::new();
        let build = BuildSectionConfig {
            build_dir: PathBuf::from("../outside"),
            ..Default::default()
        };
        build.validate_paths(&mut diag);
        assert_eq!(diag.len(), 1);

        let mut diag = ConfigDiagnostics::new();
        BuildSectionConfig::default().validate_paths(&mut diag);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_build_dir_inside_assets_rejected() {
        for dir in ["assets", "./assets", "assets/out"] {
            let mut diag = ConfigDiagnostics::new();
            let build = BuildSectionConfig {
                build_dir: PathBuf::from(dir),
                ..Default::default()
            };
            build.validate_paths(&mut diag);
            assert!(diag.has_errors(), "{dir} should be rejected");
        }

        for dir in ["assets-out", "out/assets", "."] {
            let mut diag = ConfigDiagnostics::new();
            let build = BuildSectionConfig {
                build_dir: PathBuf::from(dir),
                ..Default::default()
            };
            build.validate_paths(&mut diag);
            assert!(diag.is_empty(), "{dir} should be accepted");
        }
    }
}
