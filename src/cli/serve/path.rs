//! URL to filesystem path resolution.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

/// URL prefix under which the output asset directory is served.
pub const ROUTE_PREFIX: &str = "/assets/";

/// Resolve an `/assets/<rel>` URL to a regular file beneath `serve_root`.
///
/// `None` for URLs outside the route, directories, missing files, and
/// anything that would resolve outside `serve_root`.
pub fn resolve_asset(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url)?;
    let rel = clean.strip_prefix(ROUTE_PREFIX)?.trim_matches('/');

    // Reject traversal early
    if rel.is_empty() || rel.split(['/', '\\']).any(|seg| seg == "..") {
        return None;
    }

    let local = serve_root.join(rel);

    // Canonicalize to resolve symlinks and verify path is under serve_root
    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;

    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    canonical.is_file().then_some(canonical)
}

/// Strip query and fragment, then percent-decode.
///
/// The query is split off first so an encoded `%3F` stays part of the name.
fn normalize_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    percent_decode_str(path)
        .decode_utf8()
        .ok()
        .map(Cow::into_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("build/assets");
        fs::create_dir_all(root.join("wasm")).unwrap();
        fs::write(root.join("wasm/module.wasm"), "ABCDEFGHIJ").unwrap();
        fs::write(root.join("my logo.png"), "png").unwrap();
        fs::write(root.join("what?.css"), "css").unwrap();
        fs::write(dir.path().join("build/secret.png"), "secret").unwrap();
        (dir, root)
    }

    fn resolved(url: &str, root: &Path) -> Option<String> {
        let root = root.canonicalize().unwrap();
        resolve_asset(url, &root).map(|p| {
            p.strip_prefix(&root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
    }

    #[test]
    fn test_resolves_files() {
        let (_dir, root) = setup();
        assert_eq!(resolved("/assets/wasm/module.wasm", &root).as_deref(), Some("wasm/module.wasm"));
        assert_eq!(resolved("/assets/wasm/module.wasm?v=3", &root).as_deref(), Some("wasm/module.wasm"));
        assert_eq!(resolved("/assets/my%20logo.png", &root).as_deref(), Some("my logo.png"));
        assert_eq!(resolved("/assets/what%3F.css", &root).as_deref(), Some("what?.css"));
    }

    #[test]
    fn test_outside_route() {
        let (_dir, root) = setup();
        assert_eq!(resolved("/wasm/module.wasm", &root), None);
        assert_eq!(resolved("/assets", &root), None);
        assert_eq!(resolved("/assets/", &root), None);
        assert_eq!(resolved("/assetswasm/module.wasm", &root), None);
    }

    #[test]
    fn test_rejects_traversal() {
        let (_dir, root) = setup();
        assert_eq!(resolved("/assets/../secret.png", &root), None);
        assert_eq!(resolved("/assets/%2e%2e/secret.png", &root), None);
        assert_eq!(resolved("/assets/wasm/..%2F..%2Fsecret.png", &root), None);
        assert_eq!(resolved("/assets//etc/passwd", &root), None);
    }

    #[test]
    fn test_directories_and_missing() {
        let (_dir, root) = setup();
        assert_eq!(resolved("/assets/wasm", &root), None);
        assert_eq!(resolved("/assets/wasm/", &root), None);
        assert_eq!(resolved("/assets/nope.png", &root), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let (dir, root) = setup();
        std::os::unix::fs::symlink(dir.path().join("build/secret.png"), root.join("link.png"))
            .unwrap();
        assert_eq!(resolved("/assets/link.png", &root), None);
    }
}
