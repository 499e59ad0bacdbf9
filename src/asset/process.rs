//! Asset copying with side effects.
//!
//! Copies are verbatim and atomic: bytes are written to a hidden sibling
//! (`.<name>.<pid>.tmp`) and renamed over the destination, so a reader never
//! sees a half-written asset.
//!
//! Freshness compares content (blake3), not timestamps: tools like `cp -p`
//! or `rsync -a` can produce a changed source with an older mtime.

use std::fs::{self, File};
use std::io::{self, BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use rayon::prelude::*;

use super::{AssetError, CopyManifest, ManifestEntry};
use crate::core::is_shutdown;
use crate::debug;
use crate::logger::ProgressLine;

/// Outcome of copying a manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    /// Files written this run
    pub copied: usize,
    /// Files whose destination was already up to date
    pub fresh: usize,
}

/// Copy one manifest entry.
///
/// Unless `force` is set, an existing destination whose bytes already equal
/// the source's is left alone.
/// Returns whether the file was written.
pub fn copy_asset(entry: &ManifestEntry, force: bool) -> Result<bool, AssetError> {
    let src = &entry.asset.source;
    let dest = &entry.destination;

    if !force && is_fresh(src, dest) {
        return Ok(false);
    }

    let copy_err = |source| AssetError::Copy {
        src: src.clone(),
        dest: dest.clone(),
        source,
    };

    // An existing directory is fine (parallel copies race here)
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(copy_err)?;
    }

    let tmp = temp_path(dest);
    if let Err(e) = fs::copy(src, &tmp).and_then(|_| fs::rename(&tmp, dest)) {
        let _ = fs::remove_file(&tmp);
        return Err(copy_err(e));
    }

    Ok(true)
}

/// Copy every manifest entry on the rayon pool.
///
/// Fails fast: after the first error no further copies start, and that first
/// error is returned. Shutdown (Ctrl+C) is checked before each copy.
pub fn copy_manifest(
    manifest: &CopyManifest,
    force: bool,
    progress: Option<&ProgressLine>,
) -> Result<CopyStats, AssetError> {
    let failed = AtomicBool::new(false);
    let first_error: Mutex<Option<AssetError>> = Mutex::new(None);
    let copied = AtomicUsize::new(0);
    let fresh = AtomicUsize::new(0);

    let result = manifest.entries().par_iter().try_for_each(|entry| {
        if is_shutdown() || failed.load(Ordering::Relaxed) {
            return Err(());
        }

        match copy_asset(entry, force) {
            Ok(written) => {
                let counter = if written { &copied } else { &fresh };
                counter.fetch_add(1, Ordering::Relaxed);
                if written {
                    debug!("assets"; "{}", entry.url_path());
                }
                if let Some(p) = progress {
                    p.inc("assets");
                }
                Ok(())
            }
            Err(e) => {
                if !failed.swap(true, Ordering::Relaxed) {
                    *first_error.lock() = Some(e);
                }
                Err(())
            }
        }
    });

    if let Some(e) = first_error.into_inner() {
        return Err(e);
    }
    if result.is_err() {
        return Err(AssetError::Aborted);
    }

    Ok(CopyStats {
        copied: copied.into_inner(),
        fresh: fresh.into_inner(),
    })
}

/// Remove the output asset directory (and the record describing it).
pub fn clean_output(output_root: &Path, record_path: &Path) -> Result<(), AssetError> {
    for (path, result) in [
        (output_root, fs::remove_dir_all(output_root)),
        (record_path, fs::remove_file(record_path)),
    ] {
        match result {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                return Err(AssetError::Clean {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
    }
    Ok(())
}

fn is_fresh(src: &Path, dest: &Path) -> bool {
    let (Ok(src_meta), Ok(dest_meta)) = (fs::metadata(src), fs::metadata(dest)) else {
        return false;
    };
    if !dest_meta.is_file() || src_meta.len() != dest_meta.len() {
        return false;
    }
    match (file_hash(src), file_hash(dest)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// blake3 hash of a file's contents.
fn file_hash(path: &Path) -> io::Result<blake3::Hash> {
    let mut reader = BufReader::with_capacity(64 * 1024, File::open(path)?);
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; 64 * 1024];

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                hasher.update(&buffer[..n]);
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(hasher.finalize())
}

fn temp_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::ExtensionSet;
    use crate::asset::manifest::AssetFile;
    use tempfile::TempDir;

    fn entry(src: PathBuf, dest: PathBuf) -> ManifestEntry {
        ManifestEntry {
            asset: AssetFile {
                relative: PathBuf::from(src.file_name().unwrap()),
                extension: ".png".into(),
                source: src,
            },
            destination: dest,
        }
    }

    #[test]
    fn test_copy_creates_dirs_and_copies_bytes() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("logo.png");
        fs::write(&src, [0u8, 1, 2, 255]).unwrap();
        let dest = dir.path().join("out/a/b/logo.png");

        assert!(copy_asset(&entry(src, dest.clone()), false).unwrap());
        assert_eq!(fs::read(&dest).unwrap(), [0u8, 1, 2, 255]);

        // No temp files left behind
        let names: Vec<_> = fs::read_dir(dest.parent().unwrap())
            .unwrap()
            .flatten()
            .map(|e| e.file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn test_fresh_destination_skipped() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("logo.png");
        fs::write(&src, "png").unwrap();
        let dest = dir.path().join("out/logo.png");
        let e = entry(src, dest);

        assert!(copy_asset(&e, false).unwrap());
        assert!(!copy_asset(&e, false).unwrap());
        assert!(copy_asset(&e, true).unwrap());
    }

    #[test]
    fn test_changed_length_recopied() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("logo.png");
        fs::write(&src, "png").unwrap();
        let dest = dir.path().join("out/logo.png");
        let e = entry(src.clone(), dest.clone());

        copy_asset(&e, false).unwrap();
        fs::write(&src, "a longer png").unwrap();
        assert!(copy_asset(&e, false).unwrap());
        assert_eq!(fs::read_to_string(dest).unwrap(), "a longer png");
    }

    #[test]
    fn test_same_length_older_mtime_recopied() {
        use std::time::{Duration, SystemTime};

        let dir = TempDir::new().unwrap();
        let src = dir.path().join("logo.png");
        fs::write(&src, "AAAA").unwrap();
        let dest = dir.path().join("out/logo.png");
        let e = entry(src.clone(), dest.clone());
        copy_asset(&e, false).unwrap();

        // Same length, content changed, mtime pushed into the past (cp -p)
        fs::write(&src, "BBBB").unwrap();
        let hour_ago = SystemTime::now() - Duration::from_secs(3600);
        File::options()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(hour_ago)
            .unwrap();

        assert!(copy_asset(&e, false).unwrap());
        assert_eq!(fs::read_to_string(dest).unwrap(), "BBBB");
    }

    #[test]
    fn test_file_hash_matches_content() {
        let dir = TempDir::new().unwrap();
        let (a, b, c) = (dir.path().join("a"), dir.path().join("b"), dir.path().join("c"));
        fs::write(&a, "same").unwrap();
        fs::write(&b, "same").unwrap();
        fs::write(&c, "diff").unwrap();

        assert_eq!(file_hash(&a).unwrap(), file_hash(&b).unwrap());
        assert_ne!(file_hash(&a).unwrap(), file_hash(&c).unwrap());
        assert!(file_hash(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_missing_source_reports_paths() {
        let dir = TempDir::new().unwrap();
        let e = entry(dir.path().join("gone.png"), dir.path().join("out/gone.png"));

        let err = copy_asset(&e, false).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("gone.png"));
        assert!(matches!(err, AssetError::Copy { .. }));
    }

    #[test]
    fn test_copy_manifest_parallel() {
        let dir = TempDir::new().unwrap();
        let src_root = dir.path().join("assets");
        let out_root = dir.path().join("out");
        for i in 0..32 {
            let path = src_root.join(format!("d{}/f{i}.css", i % 4));
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, format!("body{{}}/*{i}*/")).unwrap();
        }

        let files = crate::asset::AssetWalker::new(&src_root);
        let manifest =
            CopyManifest::from_files(files, &src_root, &out_root, &ExtensionSet::built_in())
                .unwrap();

        let stats = copy_manifest(&manifest, false, None).unwrap();
        assert_eq!(stats, CopyStats { copied: 32, fresh: 0 });

        let stats = copy_manifest(&manifest, false, None).unwrap();
        assert_eq!(stats, CopyStats { copied: 0, fresh: 32 });
        assert_eq!(
            fs::read_to_string(out_root.join("d3/f7.css")).unwrap(),
            "body{}/*7*/"
        );
    }

    #[test]
    fn test_copy_manifest_fails_fast_with_copy_error() {
        let dir = TempDir::new().unwrap();
        let src_root = dir.path().join("assets");
        fs::create_dir_all(&src_root).unwrap();
        fs::write(src_root.join("ok.png"), "x").unwrap();

        // A file where a directory is needed makes create_dir_all fail
        let out_root = dir.path().join("out");
        fs::write(&out_root, "blocker").unwrap();

        let manifest = CopyManifest::from_files(
            [src_root.join("ok.png")],
            &src_root,
            &out_root,
            &ExtensionSet::built_in(),
        )
        .unwrap();

        let err = copy_manifest(&manifest, false, None).unwrap_err();
        assert!(matches!(err, AssetError::Copy { .. }));
    }

    #[test]
    fn test_clean_output() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("build/assets");
        let record = dir.path().join("build/.assets.json");
        fs::create_dir_all(out.join("x")).unwrap();
        fs::write(out.join("x/a.png"), "").unwrap();
        fs::write(&record, "{}").unwrap();

        clean_output(&out, &record).unwrap();
        assert!(!out.exists());
        assert!(!record.exists());

        // Idempotent
        clean_output(&out, &record).unwrap();
    }

    #[test]
    fn test_temp_path_is_hidden_sibling() {
        let tmp = temp_path(Path::new("/out/wasm/module.wasm"));
        assert_eq!(tmp.parent(), Some(Path::new("/out/wasm")));
        let name = tmp.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".module.wasm."));
        assert!(name.ends_with(".tmp"));
    }
}
