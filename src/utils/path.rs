//! Path helpers.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `file_extension` - extension as written in the file name, leading dot included

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Extension of the file name: from the last `.` to the end, case preserved.
///
/// Unlike [`Path::extension`], the leading dot is kept and a dotfile such as
/// `.gitignore` has the extension `.gitignore`. Names without a `.` (or
/// ending in one) have no extension.
///
/// ```ignore
/// file_extension(Path::new("a/module.wasm"))  // Some(".wasm")
/// file_extension(Path::new("archive.tar.GZ")) // Some(".GZ")
/// file_extension(Path::new("LICENSE"))        // None
/// ```
pub fn file_extension(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    let idx = name.rfind('.')?;
    let ext = &name[idx..];
    (ext.len() > 1).then_some(ext)
}
