//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, validate), and their associated argument structs.
//! Every `run` flag has an environment variable equivalent for container
//! deployments, and overrides the matching config file value when set.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::model::Config;

#[derive(Parser)]
#[command(
    name = "webguard",
    version,
    about = "HTTP request pipeline with XSRF protection and form gating",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        webguard run                         Start with ./webguard.yaml or defaults\n  \
        webguard run -c webguard.yaml        Start with a specific config\n  \
        webguard validate webguard.yaml      Check a config file"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the demo server behind the pipeline
    Run(Box<RunArgs>),

    /// Validate a config file without starting
    Validate(ValidateArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        webguard run                                   Auto-detect config\n  \
        webguard run -c webguard.yaml                  Specific config file\n  \
        webguard run -p 8080 --pretty --debug-log      Local dev mode\n  \
        webguard run --check-xsrf false                Disable the XSRF guard")]
pub struct RunArgs {
    /// Config file path (.yaml, .json, .toml)
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Listen port
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Listen address
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    /// Log every request and response through the debug logger
    #[arg(long, env = "DEBUG_LOG")]
    pub debug_log: bool,

    // -- Pipeline --
    /// Max request body size in bytes
    #[arg(long, env = "MAX_BODY_SIZE", help_heading = "Pipeline")]
    pub max_body: Option<u64>,

    /// Require a matching XSRF token on POST and PUT
    #[arg(long, env = "CHECK_XSRF", help_heading = "Pipeline")]
    pub check_xsrf: Option<bool>,
}

impl RunArgs {
    /// Apply every flag that was given on top of `config`.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(ref host) = self.host {
            config.server.host.clone_from(host);
        }
        if let Some(max_body) = self.max_body {
            config.max_request_body_len = max_body;
        }
        if let Some(check_xsrf) = self.check_xsrf {
            config.check_xsrf = check_xsrf;
        }
        if self.debug_log {
            config.debug_logging = true;
        }
    }
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Config file to validate
    #[arg(default_value = "webguard.yaml")]
    pub config: PathBuf,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ValidateFormat,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ValidateFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "webguard",
            "run",
            "-p",
            "8080",
            "--max-body",
            "64",
            "--check-xsrf",
            "false",
            "--debug-log",
        ])
        .unwrap();
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run");
        };

        let mut config = Config::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.max_request_body_len, 64);
        assert!(!config.check_xsrf);
        assert!(config.debug_logging);
    }

    #[test]
    fn absent_flags_leave_config_alone() {
        let cli = Cli::try_parse_from(["webguard", "run"]).unwrap();
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run");
        };
        let mut config = Config::default();
        config.check_xsrf = false;
        args.apply_overrides(&mut config);
        assert!(!config.check_xsrf);
    }
}
