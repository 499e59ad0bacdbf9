//! Per-invocation build context.

use std::path::PathBuf;

use crate::config::{ProjectConfig, StalePolicy};
use crate::utils::mime::MimeTable;

use super::ExtensionSet;

/// Everything one build (or serve) invocation needs, resolved once from the
/// loaded [`ProjectConfig`] and passed by reference to each pipeline stage.
#[derive(Debug, Clone)]
pub struct BuildContext<'a> {
    pub config: &'a ProjectConfig,
    /// Built-in ∪ `custom_extensions`
    pub extensions: ExtensionSet,
    /// `<root>/assets`
    pub source_root: PathBuf,
    /// `<root>/<build_dir>/build/assets`
    pub output_root: PathBuf,
    /// `<root>/<build_dir>/build/.assets.json`
    pub record_path: PathBuf,
}

impl<'a> BuildContext<'a> {
    pub fn new(config: &'a ProjectConfig) -> Self {
        Self {
            config,
            extensions: ExtensionSet::with_custom(config.custom_extensions()),
            source_root: config.asset_source_dir(),
            output_root: config.asset_output_dir(),
            record_path: config.record_path(),
        }
    }

    /// Stale-file policy for this run.
    pub fn stale_policy(&self) -> StalePolicy {
        self.config.build.effective_stale()
    }

    /// Ignore freshness and rewrite every destination.
    pub fn force_copy(&self) -> bool {
        self.stale_policy() == StalePolicy::Clean
    }

    pub fn dry_run(&self) -> bool {
        self.config.build.dry_run
    }

    /// MIME table for serving, with the user's `mime_types` overrides.
    pub fn mime_table(&self) -> MimeTable {
        MimeTable::new(&self.config.plugins.client.assets.mime_types)
    }
}
