//! MIME type detection for served assets.
//!
//! Lookup order for a file:
//! 1. user mappings from `[plugins.client.assets.mime_types]`, keyed by the
//!    exact extension string (`.wasm`, case-sensitive)
//! 2. the built-in table below, matched on the lowercased extension
//! 3. [`types::OCTET_STREAM`]

use std::path::Path;

use rustc_hash::FxHashMap;

use super::path::file_extension;

/// Common MIME type constants.
pub mod types {
    // Text
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const CSS: &str = "text/css; charset=utf-8";
    pub const JAVASCRIPT: &str = "text/javascript; charset=utf-8";
    pub const JSON: &str = "application/json";
    pub const XML: &str = "application/xml";
    pub const CSV: &str = "text/csv; charset=utf-8";

    // Binary
    pub const OCTET_STREAM: &str = "application/octet-stream";
    pub const WASM: &str = "application/wasm";
    pub const PDF: &str = "application/pdf";
    pub const ZIP: &str = "application/zip";

    // Images
    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const GIF: &str = "image/gif";
    pub const WEBP: &str = "image/webp";
    pub const AVIF: &str = "image/avif";
    pub const SVG: &str = "image/svg+xml";
    pub const ICO: &str = "image/x-icon";

    // Audio
    pub const MP3: &str = "audio/mpeg";
    pub const WAV: &str = "audio/wav";
    pub const OGG_AUDIO: &str = "audio/ogg";
    pub const FLAC: &str = "audio/flac";

    // Video
    pub const MP4: &str = "video/mp4";
    pub const WEBM: &str = "video/webm";
    pub const OGG_VIDEO: &str = "video/ogg";

    // Fonts
    pub const WOFF: &str = "font/woff";
    pub const WOFF2: &str = "font/woff2";
    pub const TTF: &str = "font/ttf";
    pub const OTF: &str = "font/otf";
    pub const EOT: &str = "application/vnd.ms-fontobject";
}

/// Guess MIME type from a bare extension (no leading dot, lowercase).
pub fn from_extension(ext: Option<&str>) -> &'static str {
    match ext {
        // Web / Text
        Some("html" | "htm") => types::HTML,
        Some("css") => types::CSS,
        Some("js" | "mjs" | "cjs") => types::JAVASCRIPT,
        Some("json" | "map") => types::JSON,
        Some("xml") => types::XML,
        Some("csv") => types::CSV,
        Some("txt") => types::PLAIN,

        // Images
        Some("svg") => types::SVG,
        Some("png") => types::PNG,
        Some("jpg" | "jpeg") => types::JPEG,
        Some("gif") => types::GIF,
        Some("webp") => types::WEBP,
        Some("avif") => types::AVIF,
        Some("ico") => types::ICO,

        // Audio
        Some("mp3") => types::MP3,
        Some("wav") => types::WAV,
        Some("ogg" | "oga") => types::OGG_AUDIO,
        Some("flac") => types::FLAC,

        // Video
        Some("mp4" | "m4v") => types::MP4,
        Some("webm") => types::WEBM,
        Some("ogv") => types::OGG_VIDEO,

        // Fonts
        Some("woff") => types::WOFF,
        Some("woff2") => types::WOFF2,
        Some("ttf") => types::TTF,
        Some("otf") => types::OTF,
        Some("eot") => types::EOT,

        // Binary
        Some("wasm") => types::WASM,
        Some("pdf") => types::PDF,
        Some("zip") => types::ZIP,

        _ => types::OCTET_STREAM,
    }
}

/// Extension → content-type table with user overrides.
#[derive(Debug, Clone, Default)]
pub struct MimeTable {
    overrides: FxHashMap<String, String>,
}

impl MimeTable {
    pub fn new(overrides: &FxHashMap<String, String>) -> Self {
        Self {
            overrides: overrides.clone(),
        }
    }

    /// Content type for a file path.
    pub fn for_path(&self, path: &Path) -> &str {
        let Some(ext) = file_extension(path) else {
            return types::OCTET_STREAM;
        };

        if let Some(mime) = self.overrides.get(ext) {
            return mime;
        }

        let bare = ext[1..].to_ascii_lowercase();
        from_extension(Some(&bare))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn table(pairs: &[(&str, &str)]) -> MimeTable {
        let overrides = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        MimeTable::new(&overrides)
    }

    #[test]
    fn test_builtin_lookup() {
        let mime = MimeTable::default();
        assert_eq!(mime.for_path(&PathBuf::from("style.css")), types::CSS);
        assert_eq!(mime.for_path(&PathBuf::from("a/logo.png")), types::PNG);
        assert_eq!(mime.for_path(&PathBuf::from("photo.jpeg")), types::JPEG);
        assert_eq!(mime.for_path(&PathBuf::from("font.woff2")), types::WOFF2);
        assert_eq!(mime.for_path(&PathBuf::from("clip.mp4")), types::MP4);
        assert_eq!(mime.for_path(&PathBuf::from("module.wasm")), types::WASM);
        assert_eq!(mime.for_path(&PathBuf::from("worker.js")), types::JAVASCRIPT);
    }

    #[test]
    fn test_builtin_lookup_ignores_case() {
        let mime = MimeTable::default();
        assert_eq!(mime.for_path(&PathBuf::from("worker.JS")), types::JAVASCRIPT);
        assert_eq!(mime.for_path(&PathBuf::from("LOGO.PNG")), types::PNG);
    }

    #[test]
    fn test_fallback() {
        let mime = MimeTable::default();
        assert_eq!(mime.for_path(&PathBuf::from("model.glb")), types::OCTET_STREAM);
        assert_eq!(mime.for_path(&PathBuf::from("LICENSE")), types::OCTET_STREAM);
    }

    #[test]
    fn test_overrides_win() {
        let mime = table(&[(".glb", "model/gltf-binary"), (".css", "text/x-custom")]);
        assert_eq!(mime.for_path(&PathBuf::from("a/scene.glb")), "model/gltf-binary");
        assert_eq!(mime.for_path(&PathBuf::from("site.css")), "text/x-custom");
    }

    #[test]
    fn test_overrides_are_case_sensitive() {
        let mime = table(&[(".glb", "model/gltf-binary")]);
        assert_eq!(mime.for_path(&PathBuf::from("scene.GLB")), types::OCTET_STREAM);
    }
}
