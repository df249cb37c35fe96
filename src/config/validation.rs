//! Configuration validation with detailed error reporting.
//!
//! The [`validate`] function checks a parsed [`Config`] for a usable listen
//! address and a sane body size limit, returning every problem found as a
//! [`ValidationError`] with a suggestion where one helps.

use std::net::IpAddr;

use super::model::Config;
use crate::error::ValidationError;

/// Upper bound on `max_request_body_len`. Bodies are buffered in memory.
pub const MAX_BODY_LIMIT: u64 = 1 << 30;

/// Validate a listen host. Returns `Ok(())` or a human-readable error.
pub fn validate_host(host: &str) -> Result<(), String> {
    if host.is_empty() {
        return Err("host cannot be empty".into());
    }
    host.parse::<IpAddr>()
        .map(|_| ())
        .map_err(|_| format!("'{host}' is not an IP address"))
}

pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(msg) = validate_host(&config.server.host) {
        let suggestion = (config.server.host == "localhost").then(|| "did you mean '127.0.0.1'?".to_string());
        errors.push(ValidationError {
            field: "server.host".into(),
            message: msg,
            suggestion,
        });
    }

    if config.server.port == 0 {
        errors.push(ValidationError {
            field: "server.port".into(),
            message: "port cannot be 0".into(),
            suggestion: None,
        });
    }

    if config.max_request_body_len > MAX_BODY_LIMIT {
        errors.push(ValidationError {
            field: "max_request_body_len".into(),
            message: format!(
                "{} bytes exceeds the {MAX_BODY_LIMIT} byte ceiling",
                config.max_request_body_len
            ),
            suggestion: Some("request bodies are buffered in memory; keep the limit small".into()),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[must_use]
pub fn format_validation_report(path: &str, config: &Config) -> String {
    let on_off = |b: bool| if b { "on" } else { "off" };
    let lines = [
        format!("  listen:        {}:{}", config.server.host, config.server.port),
        format!("  max body:      {} bytes", config.max_request_body_len),
        format!("  xsrf check:    {}", on_off(config.check_xsrf)),
        format!("  debug logging: {}", on_off(config.debug_logging)),
    ];
    format!("{} is valid\n{}", path, lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn hostname_suggests_loopback() {
        let mut config = Config::default();
        config.server.host = "localhost".into();
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].suggestion.as_deref(), Some("did you mean '127.0.0.1'?"));
    }

    #[test]
    fn collects_every_error() {
        let mut config = Config::default();
        config.server.host = String::new();
        config.server.port = 0;
        config.max_request_body_len = MAX_BODY_LIMIT + 1;
        let errors = validate(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["server.host", "server.port", "max_request_body_len"]);
    }

    #[test]
    fn report_summarises_settings() {
        let report = format_validation_report("webguard.yaml", &Config::default());
        assert!(report.starts_with("webguard.yaml is valid\n"));
        assert!(report.contains("xsrf check:    on"));
        assert!(report.contains("max body:      1048576 bytes"));
    }
}
