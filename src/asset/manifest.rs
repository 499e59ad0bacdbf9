//! Copy manifest: which files get copied, and where.

use std::path::{Component, Path, PathBuf};

use super::{AssetError, AssetWalker, BuildContext, ExtensionSet};
use crate::utils::path::file_extension;

/// One discovered asset file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFile {
    /// Absolute source path
    pub source: PathBuf,
    /// Path relative to the asset root
    pub relative: PathBuf,
    /// Extension with leading `.`, case preserved
    pub extension: String,
}

/// An accepted asset paired with its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub asset: AssetFile,
    /// `output_root / relative`
    pub destination: PathBuf,
}

impl ManifestEntry {
    /// Relative path with `/` separators, as used in URLs and the build record.
    pub fn url_path(&self) -> String {
        to_slash(&self.asset.relative)
    }
}

/// Assets that passed the extension filter, sorted by relative path.
///
/// Every destination mirrors its source: `assets/a/b/c.png` maps to
/// `<output_root>/a/b/c.png`. No relative path contains `..` or a root.
#[derive(Debug, Clone, Default)]
pub struct CopyManifest {
    entries: Vec<ManifestEntry>,
}

impl CopyManifest {
    /// Scan `ctx.source_root` and filter with `ctx.extensions`.
    pub fn collect(ctx: &BuildContext) -> Result<Self, AssetError> {
        Self::from_files(
            AssetWalker::new(&ctx.source_root),
            &ctx.source_root,
            &ctx.output_root,
            &ctx.extensions,
        )
    }

    /// Build a manifest from candidate files under `source_root`.
    pub fn from_files(
        files: impl IntoIterator<Item = PathBuf>,
        source_root: &Path,
        output_root: &Path,
        extensions: &ExtensionSet,
    ) -> Result<Self, AssetError> {
        let mut entries = Vec::new();

        for source in files {
            if !extensions.is_asset(&source) {
                continue;
            }

            let relative = source
                .strip_prefix(source_root)
                .ok()
                .filter(|rel| is_contained(rel))
                .map(Path::to_path_buf)
                .ok_or_else(|| AssetError::OutsideRoot {
                    path: source.clone(),
                    root: source_root.to_path_buf(),
                })?;

            // is_asset guarantees an extension
            let extension = file_extension(&source).unwrap_or_default().to_string();
            let destination = output_root.join(&relative);

            entries.push(ManifestEntry {
                asset: AssetFile {
                    source,
                    relative,
                    extension,
                },
                destination,
            });
        }

        entries.sort_by(|a, b| a.asset.relative.cmp(&b.asset.relative));
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Relative paths (`/`-separated) in manifest order.
    pub fn url_paths(&self) -> Vec<String> {
        self.entries.iter().map(ManifestEntry::url_path).collect()
    }
}

/// A non-empty relative path made only of normal components.
pub(crate) fn is_contained(rel: &Path) -> bool {
    rel.components().next().is_some()
        && rel
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

pub(crate) fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
