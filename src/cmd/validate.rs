//! `webguard validate`: check a configuration file for errors.
//!
//! Besides the validation findings, a valid file is summarised as the
//! pipeline it would build, stage by stage, so a reader can see which
//! guards are active without starting the server.

use std::path::Path;

use serde::Serialize;

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::model::Config;
use crate::config::sources::parse_config_str;
use crate::config::validation;
use crate::error::{ValidationError, WebguardError};
use crate::server::pipeline_stages;

#[derive(Serialize)]
struct Finding<'a> {
    field: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<&'a str>,
}

impl<'a> From<&'a ValidationError> for Finding<'a> {
    fn from(e: &'a ValidationError) -> Self {
        Self {
            field: &e.field,
            message: &e.message,
            suggestion: e.suggestion.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    path: String,
    valid: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<Finding<'a>>,
    /// Stage names, outermost first. Only present for a valid config.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pipeline: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<&'a Config>,
}

fn read_config(path: &Path) -> Result<Config, WebguardError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => WebguardError::ConfigFileNotFound {
            path: path.to_path_buf(),
        },
        _ => WebguardError::Io(e),
    })?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    parse_config_str(&ext, &content, &path.display().to_string())
}

pub fn execute(args: &ValidateArgs) -> Result<(), WebguardError> {
    let config = read_config(&args.config)?;
    let errors = validation::validate(&config).err().unwrap_or_default();

    let report = Report {
        path: args.config.display().to_string(),
        valid: errors.is_empty(),
        errors: errors.iter().map(Finding::from).collect(),
        pipeline: if errors.is_empty() {
            pipeline_stages(&config)
        } else {
            Vec::new()
        },
        config: errors.is_empty().then_some(&config),
    };

    match args.format {
        ValidateFormat::Text => print_text(&report, &config),
        ValidateFormat::Json => println!("{}", serde_json::json!(report)),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(WebguardError::ConfigValidation { errors })
    }
}

fn print_text(report: &Report<'_>, config: &Config) {
    if report.valid {
        println!(
            "\u{2713} {}\n  pipeline:      {}",
            validation::format_validation_report(&report.path, config),
            report.pipeline.join(" -> ")
        );
        return;
    }

    eprintln!("\u{2717} {} has {} errors\n", report.path, report.errors.len());
    for finding in &report.errors {
        match finding.suggestion {
            Some(hint) => eprintln!("  {}: {} ({hint})", finding.field, finding.message),
            None => eprintln!("  {}: {}", finding.field, finding.message),
        }
    }
}
