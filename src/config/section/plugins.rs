//! `[plugins.client.assets]` section configuration.
//!
//! The project manifest is shared with other tooling, so only the
//! `plugins.client.assets` table is read here; everything else under
//! `[plugins]` belongs to someone else.
//!
//! # Example
//!
//! ```toml
//! [plugins.client.assets]
//! custom_extensions = [".wasm", ".js", ".json"]
//!
//! [plugins.client.assets.mime_types]
//! ".wasm" = "application/wasm"
//! ```
//!
//! Missing tables at any level mean "no customization": every struct here is
//! `#[serde(default)]`.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    pub client: ClientPluginConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientPluginConfig {
    pub assets: AssetsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Extensions copied in addition to the built-in table.
    /// Each entry is expected to start with `.`; entries that don't are kept
    /// as-is and never match a file.
    pub custom_extensions: Vec<String>,

    /// Extra `extension -> content-type` mappings for the dev server.
    /// Keys are matched exactly (case-sensitive, with the leading `.`).
    pub mime_types: FxHashMap<String, String>,
}

impl AssetsConfig {
    pub const CUSTOM_EXTENSIONS: FieldPath =
        FieldPath::new("plugins.client.assets.custom_extensions");
    pub const MIME_TYPES: FieldPath = FieldPath::new("plugins.client.assets.mime_types");

    /// Report extension strings that can never match a file.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for ext in &self.custom_extensions {
            if let Some(reason) = inert_reason(ext) {
                diag.hint(
                    Self::CUSTOM_EXTENSIONS,
                    format!("'{ext}' {reason}, no file will match it"),
                );
            }
        }

        let mut keys: Vec<_> = self.mime_types.keys().collect();
        keys.sort();
        for ext in keys {
            if let Some(reason) = inert_reason(ext) {
                diag.hint(
                    Self::MIME_TYPES,
                    format!("'{ext}' {reason}, the mapping is never used"),
                );
            }
        }
    }
}

fn inert_reason(ext: &str) -> Option<&'static str> {
    if !ext.starts_with('.') {
        Some("has no leading '.'")
    } else if ext.len() == 1 {
        Some("is empty after the '.'")
    } else if ext[1..].contains('.') {
        // extension is taken from the last '.', so ".tar.gz" is never produced
        Some("contains more than one '.'")
    } else {
        None
    }
}
