//! Build record: which output files the last build wrote.
//!
//! Stored as JSON next to (not inside) the served asset directory:
//!
//! ```text
//! .jac/build/
//! ├── .assets.json     {"files": ["logo.png", "wasm/module.wasm"]}
//! └── assets/
//!     ├── logo.png
//!     └── wasm/module.wasm
//! ```
//!
//! Only files listed here are ever pruned, so anything else placed in the
//! output directory survives rebuilds.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::manifest::is_contained;
use super::{AssetError, CopyManifest};
use crate::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecord {
    /// `/`-separated paths relative to the output asset root, sorted.
    pub files: BTreeSet<String>,
}

impl BuildRecord {
    pub fn from_manifest(manifest: &CopyManifest) -> Self {
        Self {
            files: manifest.url_paths().into_iter().collect(),
        }
    }

    /// Load the record. A missing file is `None`.
    pub fn load(path: &Path) -> Result<Option<Self>, AssetError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(AssetError::RecordIo {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| AssetError::RecordParse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Write the record (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<(), AssetError> {
        let io_err = |source| AssetError::RecordIo {
            path: path.to_path_buf(),
            source,
        };

        let json = serde_json::to_string_pretty(self).map_err(|source| AssetError::RecordParse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)
    }

    /// Files in `self` that `current` no longer contains.
    pub fn stale<'a>(&'a self, current: &'a BuildRecord) -> impl Iterator<Item = &'a str> {
        self.files
            .difference(&current.files)
            .map(String::as_str)
    }

    /// `self ∪ other`
    pub fn merged(mut self, other: &BuildRecord) -> Self {
        self.files.extend(other.files.iter().cloned());
        self
    }

    /// Delete files of `self` missing from `current` under `output_root`,
    /// then any directories left empty. Returns the number of files removed.
    ///
    /// Entries that are not plain relative paths are skipped.
    pub fn prune(&self, current: &BuildRecord, output_root: &Path) -> Result<usize, AssetError> {
        let mut removed = 0;

        for rel in self.stale(current) {
            let rel_path = Path::new(rel);
            if !is_contained(rel_path) {
                debug!("assets"; "ignoring record entry {rel}");
                continue;
            }

            let path = output_root.join(rel_path);
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!("assets"; "pruned {rel}");
                    removed += 1;
                    remove_empty_parents(&path, output_root);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => return Err(AssetError::Prune { path, source }),
            }
        }

        Ok(removed)
    }
}

/// Remove empty ancestors of `path`, stopping at (and keeping) `root`.
fn remove_empty_parents(path: &Path, root: &Path) {
    let mut current: Option<PathBuf> = path.parent().map(Path::to_path_buf);
    while let Some(dir) = current {
        if dir == root || !dir.starts_with(root) {
            break;
        }
        // fails on non-empty directories, which ends the walk
        if fs::remove_dir(&dir).is_err() {
            break;
        }
        current = dir.parent().map(Path::to_path_buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(files: &[&str]) -> BuildRecord {
        BuildRecord {
            files: files.iter().map(|f| (*f).to_string()).collect(),
        }
    }

    #[test]
    fn test_load_missing() {
        let dir = TempDir::new().unwrap();
        assert_eq!(BuildRecord::load(&dir.path().join(".assets.json")).unwrap(), None);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("build/.assets.json");
        let rec = record(&["wasm/module.wasm", "logo.png"]);

        rec.save(&path).unwrap();
        assert_eq!(BuildRecord::load(&path).unwrap(), Some(rec));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_load_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".assets.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            BuildRecord::load(&path),
            Err(AssetError::RecordParse { .. })
        ));
    }

    #[test]
    fn test_stale_and_merged() {
        let old = record(&["a.png", "b.css", "c.ttf"]);
        let new = record(&["b.css", "d.wasm"]);

        let stale: Vec<_> = old.stale(&new).collect();
        assert_eq!(stale, ["a.png", "c.ttf"]);

        let merged = old.merged(&new);
        assert_eq!(merged, record(&["a.png", "b.css", "c.ttf", "d.wasm"]));
    }

    #[test]
    fn test_prune_removes_only_recorded() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("assets");
        fs::create_dir_all(out.join("old/nested")).unwrap();
        fs::create_dir_all(out.join("keep")).unwrap();
        fs::write(out.join("old/nested/gone.png"), "x").unwrap();
        fs::write(out.join("keep/still.css"), "x").unwrap();
        fs::write(out.join("keep/manual.txt"), "not ours").unwrap();

        let old = record(&["old/nested/gone.png", "keep/still.css", "already-deleted.png"]);
        let new = record(&["keep/still.css"]);

        let removed = old.prune(&new, &out).unwrap();
        assert_eq!(removed, 1);
        assert!(!out.join("old").exists());
        assert!(out.join("keep/still.css").exists());
        assert!(out.join("keep/manual.txt").exists());
        assert!(out.exists());
    }

    #[test]
    fn test_prune_ignores_escaping_entries() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("assets");
        fs::create_dir_all(&out).unwrap();
        fs::write(dir.path().join("victim.txt"), "x").unwrap();

        let old = record(&["../victim.txt", "/etc/passwd"]);
        let removed = old.prune(&BuildRecord::default(), &out).unwrap();

        assert_eq!(removed, 0);
        assert!(dir.path().join("victim.txt").exists());
    }
}
