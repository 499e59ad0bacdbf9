//! Configuration section definitions.
//!
//! Each module corresponds to a section in `jac.toml`:
//!
//! | Module    | TOML Section              | Purpose                          |
//! |-----------|---------------------------|----------------------------------|
//! | `build`   | `[build]`                 | Build directory, stale policy    |
//! | `serve`   | `[serve]`                 | Development server               |
//! | `plugins` | `[plugins.client.assets]` | Custom extensions, MIME types    |

pub mod build;
pub mod plugins;
mod serve;

pub use build::{BuildSectionConfig, StalePolicy};
pub use plugins::PluginsConfig;
pub use serve::ServeConfig;
