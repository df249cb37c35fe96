//! Cross-site request forgery protection.
//!
//! The guard binds a token held in the `xsrf` cookie to the `xsrf` request
//! parameter:
//!
//! - No cookie, or a cookie that is not [`TOKEN_LEN`] characters: a fresh
//!   token is drawn from the [`EntropySource`] and a response filter appends
//!   `Set-Cookie: xsrf=<token>; Path=/; HttpOnly` to whatever response the
//!   request ends up producing.
//! - Parameter matches the token: delegate unchanged.
//! - Mismatch: the parameter is overwritten with the token so a rendered
//!   form carries a valid one. `POST` and `PUT` are then rejected with
//!   404, the same status a missing resource gets, so probing reveals
//!   nothing. Other methods are let through.
//!
//! A failing entropy source is fatal. The guard panics rather than hand
//! out a predictable token.

use std::sync::Arc;

use http::{header, Method, StatusCode};
use rand::RngCore;

use crate::error::RequestError;
use crate::handler::{BoxHandler, Handler};
use crate::request::Request;

pub const XSRF_COOKIE_NAME: &str = "xsrf";
pub const XSRF_PARAM_NAME: &str = "xsrf";

/// Length of a token in hex characters.
pub const TOKEN_LEN: usize = 8;

/// Source of cryptographically secure random bytes. Shared across
/// concurrent requests without external locking.
pub trait EntropySource: Send + Sync {
    fn fill(&self, dest: &mut [u8]) -> Result<(), rand::Error>;
}

/// The operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<(), rand::Error> {
        rand::rngs::OsRng.try_fill_bytes(dest)
    }
}

/// Draw a new lowercase hex token of [`TOKEN_LEN`] characters.
pub fn issue_token(entropy: &dyn EntropySource) -> Result<String, rand::Error> {
    let mut bytes = [0u8; TOKEN_LEN / 2];
    entropy.fill(&mut bytes)?;
    Ok(hex::encode(bytes))
}

struct XsrfGuard {
    entropy: Arc<dyn EntropySource>,
    next: BoxHandler,
}

impl XsrfGuard {
    fn new_token(&self, req: &mut Request) -> String {
        let token = match issue_token(self.entropy.as_ref()) {
            Ok(token) => token,
            Err(e) => {
                tracing::error!(error = %e, "secure random source failed, aborting");
                panic!("xsrf: secure random source failed: {e}");
            }
        };

        let cookie = format!("{XSRF_COOKIE_NAME}={token}; Path=/; HttpOnly");
        req.filter_respond(move |status, mut headers| {
            headers.append(header::SET_COOKIE.as_str(), cookie);
            (status, headers)
        });
        token
    }
}

impl Handler for XsrfGuard {
    fn serve(&self, req: &mut Request) {
        let existing = req
            .cookie
            .get(XSRF_COOKIE_NAME)
            .filter(|t| t.len() == TOKEN_LEN)
            .map(str::to_string);

        let token = match existing {
            Some(token) => token,
            None => self.new_token(req),
        };

        if req.param.get_or(XSRF_PARAM_NAME, "") != token {
            req.param.set(XSRF_PARAM_NAME, token);
            if req.method == Method::POST || req.method == Method::PUT {
                tracing::debug!(method = %req.method, url = %req.url, "xsrf token mismatch");
                req.error(StatusCode::NOT_FOUND, RequestError::BadXsrfToken);
                return;
            }
        }

        self.next.serve(req);
    }
}

/// Returns a handler that validates the XSRF token before delegating to
/// `next`. When `check_xsrf` is false, `next` is returned as is.
#[must_use]
pub fn xsrf_guard(check_xsrf: bool, entropy: Arc<dyn EntropySource>, next: BoxHandler) -> BoxHandler {
    if !check_xsrf {
        return next;
    }
    Arc::new(XsrfGuard { entropy, next })
}
