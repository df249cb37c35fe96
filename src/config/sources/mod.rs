//! File-based config sources.
//!
//! Provides [`FileSource`](file_source::FileSource) and the
//! [`parse_config_str`] helper for format-specific deserialization.
//! Each format is gated by its feature flag (`yaml` is on by default).

pub mod file_source;

use crate::config::model::Config;
use crate::error::WebguardError;

/// Whether [`parse_config_str`] understands `ext` in this build.
#[must_use]
pub fn is_supported_extension(ext: &str) -> bool {
    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => true,

        #[cfg(feature = "json")]
        "json" => true,

        #[cfg(feature = "toml")]
        "toml" => true,

        _ => false,
    }
}

/// Parse a config string based on file extension.
pub fn parse_config_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<Config, WebguardError> {
    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| WebguardError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "json")]
        "json" => serde_json::from_str(content).map_err(|e| WebguardError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "toml")]
        "toml" => toml::from_str(content).map_err(|e| WebguardError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        other => Err(WebguardError::UnsupportedFormat(other.to_string())),
    }
}
