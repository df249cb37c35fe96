//! Serde data structures for the webguard configuration file.
//!
//! Contains [`Config`] (the root) and [`ServerConfig`]. Both derive
//! `Serialize` and `Deserialize` with `deny_unknown_fields` for strict
//! parsing, and every field has a default so an empty file is valid.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_REQUEST_BODY_LEN: u64 = 1_048_576;

const fn default_max_request_body_len() -> u64 {
    DEFAULT_MAX_REQUEST_BODY_LEN
}

const fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

fn is_default_max_request_body_len(v: &u64) -> bool {
    *v == DEFAULT_MAX_REQUEST_BODY_LEN
}

fn is_true(v: &bool) -> bool {
    *v
}

fn is_false(v: &bool) -> bool {
    !*v
}

fn is_default_server(v: &ServerConfig) -> bool {
    v.host == default_host() && v.port == default_port()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default, skip_serializing_if = "is_default_server")]
    pub server: ServerConfig,

    /// Largest request body, in bytes, the form gate accepts.
    #[serde(
        default = "default_max_request_body_len",
        skip_serializing_if = "is_default_max_request_body_len"
    )]
    pub max_request_body_len: u64,

    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub check_xsrf: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub debug_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            max_request_body_len: default_max_request_body_len(),
            check_xsrf: default_true(),
            debug_logging: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}
