//! Handler decorators making up the request pipeline.
//!
//! Each decorator takes the next [`BoxHandler`](crate::handler::BoxHandler)
//! and returns a new one:
//!
//! - [`form`] -- body size gate and URL-encoded form parsing.
//! - [`xsrf`] -- anti-forgery token issuance and validation.
//! - [`debug`] -- request/response diagnostic logging.
//! - [`error_handler`] -- request-scoped error callback injection.
//!
//! [`process_form`] chains the form gate in front of the XSRF guard, the
//! usual stage to put before handlers that accept submissions.

pub mod debug;
pub mod error_handler;
pub mod form;
pub mod xsrf;

use std::sync::Arc;

use crate::handler::BoxHandler;

pub use debug::{debug_logger, debug_logger_with, LogSink, TracingSink};
pub use error_handler::set_error_handler;
pub use form::form_gate;
pub use xsrf::{xsrf_guard, EntropySource, OsEntropy, XSRF_COOKIE_NAME, XSRF_PARAM_NAME};

/// Check the body length, parse the form, then (optionally) check the XSRF
/// token before handing off to `next`.
#[must_use]
pub fn process_form(
    max_request_body_len: u64,
    check_xsrf: bool,
    entropy: Arc<dyn EntropySource>,
    next: BoxHandler,
) -> BoxHandler {
    form_gate(max_request_body_len, xsrf_guard(check_xsrf, entropy, next))
}
