//! Webguard is a small, composable HTTP request pipeline.
//!
//! Every stage is a [`Handler`](handler::Handler) decorator that takes the
//! next handler and a per-request [`Request`](request::Request) context. A
//! stage may inspect or rewrite the request, install a response filter that
//! sees the eventual status and headers, and then either delegate or
//! short-circuit through the request's error handler.
//!
//! # Architecture
//!
//! - [`strings_map`] -- Ordered multi-valued map for headers, params, cookies.
//! - [`respond`] -- The [`Responder`](respond::Responder) capability and the
//!   onion-style response filter chain.
//! - [`request`] -- Per-request context: metadata, maps, current responder,
//!   current error handler.
//! - [`handler`] -- The handler trait and closure adapter.
//! - [`middleware`] -- Form gate, XSRF guard, debug logger, and error handler
//!   injection.
//! - [`server`] -- Axum bridge running the pipeline for live HTTP traffic.
//! - [`demo`] -- Form page used by `webguard run`.
//! - [`cli`] / [`cmd`] -- Command-line parsing and subcommand execution.
//! - [`config`] -- Configuration model, loading, and validation.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML config file support _(enabled by default)_ |
//! | `json` | JSON config file support |
//! | `toml` | TOML config file support |
//! | `file-backends` | All file format backends |
//! | `full` | All features |

// Binary crate: public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod demo;
pub mod error;
pub mod handler;
pub mod logging;
pub mod middleware;
pub mod request;
pub mod respond;
pub mod server;
pub mod strings_map;
