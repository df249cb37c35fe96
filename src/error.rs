//! Unified error types for webguard.
//!
//! Defines [`WebguardError`] (the application-level error enum),
//! [`ValidationError`] for config validation failures, and the
//! per-request error types: [`RequestError`] (the reason handed to a
//! request's error handler), [`FormError`] for URL-encoded parse
//! failures, and [`RespondError`] for responder misuse. All use
//! `thiserror` for `Display` and `Error` derives.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  {}: {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            buf.push('\n');
        }
        // write! to String is infallible (only fails on OOM which is unrecoverable)
        let _ = write!(buf, "{e}");
    }
    buf
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WebguardError {
    #[error("Config file not found: {}", path.display())]
    ConfigFileNotFound { path: PathBuf },

    #[error("Config parse error in {path}:\n  {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Config validation failed:\n{}", format_errors(.errors))]
    ConfigValidation { errors: Vec<ValidationError> },

    #[error("Unsupported config format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Failure to decode an `application/x-www-form-urlencoded` payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("invalid percent escape at byte {offset}")]
    BadEscape { offset: usize },

    #[error("form data is not valid UTF-8")]
    InvalidUtf8,
}

/// Why a request was short-circuited. Passed to the request's error handler
/// alongside the status code.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RequestError {
    #[error("request entity too large ({length} bytes, limit {limit})")]
    EntityTooLarge { length: u64, limit: u64 },

    #[error("error reading or parsing form: {0}")]
    MalformedForm(#[from] FormError),

    #[error("bad xsrf token")]
    BadXsrfToken,

    #[error("{0}")]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RespondError {
    #[error("response already started for this request")]
    AlreadyResponded,
}
