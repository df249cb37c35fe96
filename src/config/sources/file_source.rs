//! Async file-based config source.
//!
//! [`FileSource`] picks its format from the file extension, reads the file
//! via Tokio, and validates the parsed [`Config`] before handing it back.

use std::path::{Path, PathBuf};

use super::{is_supported_extension, parse_config_str};
use crate::config::model::Config;
use crate::config::validation::validate;
use crate::error::WebguardError;

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    ext: String,
}

impl FileSource {
    /// Fails with [`WebguardError::UnsupportedFormat`] when the extension is
    /// not one this build can parse.
    pub fn new(path: PathBuf) -> Result<Self, WebguardError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        if !is_supported_extension(&ext) {
            return Err(WebguardError::UnsupportedFormat(ext));
        }
        Ok(Self { path, ext })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_content(&self) -> Result<String, WebguardError> {
        tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                WebguardError::ConfigFileNotFound {
                    path: self.path.clone(),
                }
            } else {
                WebguardError::Io(e)
            }
        })
    }

    pub async fn load(&self) -> Result<Config, WebguardError> {
        let content = self.read_content().await?;
        let config = parse_config_str(&self.ext, &content, &self.path.display().to_string())?;

        if let Err(errors) = validate(&config) {
            return Err(WebguardError::ConfigValidation { errors });
        }

        Ok(config)
    }
}
