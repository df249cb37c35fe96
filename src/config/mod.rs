//! Configuration loading and validation.
//!
//! [`load`] resolves the config file (explicit path, or auto-detected
//! `webguard.*` in the working directory) and falls back to built-in
//! defaults when none exists. Submodules provide the data model,
//! validation logic, and the file source.

pub mod model;
pub mod sources;
pub mod validation;

use std::path::{Path, PathBuf};

use crate::error::WebguardError;
use model::Config;
use sources::file_source::FileSource;

const CANDIDATES: [&str; 4] = [
    "webguard.yaml",
    "webguard.yml",
    "webguard.json",
    "webguard.toml",
];

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    File(PathBuf),
    Defaults,
}

impl std::fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Defaults => f.write_str("built-in defaults"),
        }
    }
}

pub async fn load(explicit: Option<&Path>) -> Result<(Config, ConfigOrigin), WebguardError> {
    let Some(source) = resolve_file_source(explicit).await? else {
        return Ok((Config::default(), ConfigOrigin::Defaults));
    };
    let config = source.load().await?;
    Ok((config, ConfigOrigin::File(source.path().to_path_buf())))
}

async fn resolve_file_source(explicit: Option<&Path>) -> Result<Option<FileSource>, WebguardError> {
    if let Some(path) = explicit {
        return FileSource::new(path.to_path_buf()).map(Some);
    }

    for name in &CANDIDATES {
        let path = PathBuf::from(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(path = %path.display(), "auto-detected config file");
            return FileSource::new(path).map(Some);
        }
    }

    Ok(None)
}
