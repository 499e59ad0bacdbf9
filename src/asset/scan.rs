//! Asset directory scanning (pure, no side effects).
//!
//! ```text
//! assets/
//! ├── logo.png                 -> yielded
//! ├── workers/
//! │   └── data-worker.js       -> yielded
//! ├── current -> v2            -> descended (alias, yields current/...)
//! ├── v2/                      -> descended (yields v2/...)
//! └── loop -> .                -> skipped (points at an ancestor)
//! ```
//!
//! Symlinks are followed. A directory is skipped only when its canonical
//! path is already on the chain of directories leading to it, so link
//! cycles terminate while aliased directories are walked under every name.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::debug;

/// A directory waiting to be read.
struct PendingDir {
    path: PathBuf,
    /// Canonical paths from the root down to (and including) this directory.
    ancestors: Rc<Vec<PathBuf>>,
}

/// Lazy depth-first walk yielding every regular file under a root.
///
/// Yielded paths are the root joined with the names walked, not canonical
/// paths, so `path.strip_prefix(root)` always succeeds. Within a directory,
/// entries are visited in name order; a directory's files are yielded before
/// its subdirectories are entered.
///
/// A missing root yields nothing.
pub struct AssetWalker {
    /// Directories still to read, popped from the back.
    dirs: Vec<PendingDir>,
    /// Files of the most recently read directory.
    files: VecDeque<PathBuf>,
}

impl AssetWalker {
    pub fn new(root: &Path) -> Self {
        let mut walker = Self {
            dirs: Vec::new(),
            files: VecDeque::new(),
        };

        if let Ok(canonical) = root.canonicalize()
            && canonical.is_dir()
        {
            walker.dirs.push(PendingDir {
                path: root.to_path_buf(),
                ancestors: Rc::new(vec![canonical]),
            });
        }

        walker
    }

    /// Read one directory: queue its files, push its subdirectories that do
    /// not loop back to an ancestor.
    fn read_dir(&mut self, dir: PendingDir) {
        let entries = match fs::read_dir(&dir.path) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("scan"; "skipping unreadable {}: {}", dir.path.display(), e);
                return;
            }
        };

        let mut paths: Vec<_> = entries.flatten().map(|e| e.path()).collect();
        paths.sort();

        let mut subdirs = Vec::new();
        for path in paths {
            // Follows symlinks
            let meta = match fs::metadata(&path) {
                Ok(meta) => meta,
                Err(e) => {
                    debug!("scan"; "skipping {}: {}", path.display(), e);
                    continue;
                }
            };

            if meta.is_file() {
                self.files.push_back(path);
            } else if meta.is_dir() {
                let canonical = match path.canonicalize() {
                    Ok(canonical) => canonical,
                    Err(e) => {
                        debug!("scan"; "skipping {}: {}", path.display(), e);
                        continue;
                    }
                };
                if dir.ancestors.contains(&canonical) {
                    debug!("scan"; "skipping link cycle at {}", path.display());
                    continue;
                }

                let mut ancestors = Vec::with_capacity(dir.ancestors.len() + 1);
                ancestors.extend(dir.ancestors.iter().cloned());
                ancestors.push(canonical);
                subdirs.push(PendingDir {
                    path,
                    ancestors: Rc::new(ancestors),
                });
            }
        }

        // Reverse so the first subdirectory is popped first
        self.dirs.extend(subdirs.into_iter().rev());
    }
}

impl Iterator for AssetWalker {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            if let Some(file) = self.files.pop_front() {
                return Some(file);
            }
            let dir = self.dirs.pop()?;
            self.read_dir(dir);
        }
    }
}
