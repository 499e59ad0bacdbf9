//! Dotted config field paths used in diagnostics.

use owo_colors::OwoColorize;
use std::fmt;

/// A dotted path to a field in `jac.toml`, e.g.
/// `plugins.client.assets.custom_extensions`.
///
/// Sections declare their field paths as constants so diagnostics never
/// spell a key by hand:
///
/// ```ignore
/// diag.hint(AssetsConfig::CUSTOM_EXTENSIONS, "entry 'wasm' has no leading '.'");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(pub &'static str);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_args!("`{}`", self.0).bright_blue())
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        self.0
    }
}
