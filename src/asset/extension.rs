//! Extension matching.
//!
//! An asset is any file whose extension (from the last `.` of the file name,
//! case preserved) is an exact member of the effective [`ExtensionSet`].
//! Matching is purely syntactic: file contents are never inspected.

use std::path::Path;

use rustc_hash::FxHashSet;

use crate::utils::path::file_extension;

const IMAGES: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg", ".ico"];
const FONTS: &[&str] = &[".woff", ".woff2", ".ttf", ".otf", ".eot"];
const MEDIA: &[&str] = &[".mp4", ".webm", ".mp3", ".wav"];
const STYLES: &[&str] = &[".css"];

/// Extensions that are always copied, grouped by kind.
pub const BUILT_IN: &[(&str, &[&str])] = &[
    ("images", IMAGES),
    ("fonts", FONTS),
    ("media", MEDIA),
    ("styles", STYLES),
];

/// Immutable set of case-sensitive extension strings (leading `.` included).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionSet {
    exts: FxHashSet<String>,
}

impl ExtensionSet {
    /// The built-in table only.
    pub fn built_in() -> Self {
        BUILT_IN
            .iter()
            .flat_map(|(_, exts)| exts.iter().copied())
            .collect()
    }

    /// Built-in table ∪ `custom`. Duplicates are absorbed.
    pub fn with_custom<I, S>(custom: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::built_in();
        set.exts
            .extend(custom.into_iter().map(|e| e.as_ref().to_string()));
        set
    }

    /// Exact, case-sensitive membership.
    #[inline]
    pub fn contains(&self, ext: &str) -> bool {
        self.exts.contains(ext)
    }

    /// Whether the file at `path` should be copied.
    pub fn is_asset(&self, path: &Path) -> bool {
        file_extension(path).is_some_and(|ext| self.contains(ext))
    }

    pub fn len(&self) -> usize {
        self.exts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exts.is_empty()
    }

    /// Members in sorted order (for display).
    pub fn sorted(&self) -> Vec<&str> {
        let mut exts: Vec<_> = self.exts.iter().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }
}

impl<S: AsRef<str>> FromIterator<S> for ExtensionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            exts: iter.into_iter().map(|e| e.as_ref().to_string()).collect(),
        }
    }
}
