//! Asset resolution and copy pipeline.
//!
//! ```text
//! jac.toml ──► ExtensionSet (built-in ∪ custom)
//!                    │
//! assets/ ──► AssetWalker ──► CopyManifest ──► copy_manifest ──► <build_dir>/build/assets/
//!                                                    │
//!                                              BuildRecord (stale pruning)
//! ```
//!
//! Scanning and manifest construction only read the filesystem; all writes
//! happen in `process` and `record`.

mod context;
mod error;
mod extension;
mod manifest;
mod process;
mod record;
mod scan;

pub use context::BuildContext;
pub use error::AssetError;
pub use extension::ExtensionSet;
pub use manifest::{CopyManifest, ManifestEntry};
pub use process::{clean_output, copy_manifest};
pub use record::BuildRecord;
pub use scan::AssetWalker;

#[cfg(test)]
pub use extension::BUILT_IN;
