//! Request body size gate and URL-encoded form parsing.
//!
//! [`form_gate`] rejects requests whose body exceeds the configured limit
//! (417 when the client sent `Expect`, 413 otherwise), then decodes the
//! query string and any `application/x-www-form-urlencoded` body into
//! [`Request::param`]. Decoding is strict: a malformed percent escape or a
//! payload that is not UTF-8 fails with 400. Parameters are collected into
//! a scratch map and merged only once everything parsed, so a rejected
//! request keeps the parameter map it arrived with.

use std::sync::Arc;

use http::{header, StatusCode};

use crate::error::{FormError, RequestError};
use crate::handler::{BoxHandler, Handler};
use crate::request::Request;
use crate::strings_map::StringsMap;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

struct FormGate {
    max_request_body_len: u64,
    next: BoxHandler,
}

impl Handler for FormGate {
    fn serve(&self, req: &mut Request) {
        let length = req
            .content_length
            .unwrap_or_else(|| u64::try_from(req.body.len()).unwrap_or(u64::MAX));

        if length > self.max_request_body_len {
            let status = if req.header.contains_key(header::EXPECT.as_str()) {
                StatusCode::EXPECTATION_FAILED
            } else {
                StatusCode::PAYLOAD_TOO_LARGE
            };
            req.error(
                status,
                RequestError::EntityTooLarge {
                    length,
                    limit: self.max_request_body_len,
                },
            );
            return;
        }

        match parse_form(req) {
            Ok(params) => req.param.extend(params),
            Err(e) => {
                req.error(StatusCode::BAD_REQUEST, e.into());
                return;
            }
        }

        self.next.serve(req);
    }
}

/// Returns a handler that enforces `max_request_body_len` and parses the
/// form before delegating to `next`.
#[must_use]
pub fn form_gate(max_request_body_len: u64, next: BoxHandler) -> BoxHandler {
    Arc::new(FormGate {
        max_request_body_len,
        next,
    })
}

fn parse_form(req: &Request) -> Result<StringsMap, FormError> {
    let mut params = StringsMap::new();
    if let Some(query) = req.url.query() {
        decode_into(query.as_bytes(), &mut params)?;
    }
    if is_form_content_type(&req.content_type) {
        decode_into(&req.body, &mut params)?;
    }
    Ok(params)
}

fn is_form_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|media| media.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

fn decode_into(input: &[u8], params: &mut StringsMap) -> Result<(), FormError> {
    validate_urlencoded(input)?;
    for (key, value) in url::form_urlencoded::parse(input) {
        params.append(&key, value.into_owned());
    }
    Ok(())
}

/// Reject input that `form_urlencoded` would otherwise decode lossily:
/// truncated or non-hex `%` escapes and byte sequences that are not UTF-8.
pub fn validate_urlencoded(input: &[u8]) -> Result<(), FormError> {
    let mut decoded = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        if input[i] == b'%' {
            let hi = input.get(i + 1).and_then(|b| hex_digit(*b));
            let lo = input.get(i + 2).and_then(|b| hex_digit(*b));
            let (Some(hi), Some(lo)) = (hi, lo) else {
                return Err(FormError::BadEscape { offset: i });
            };
            decoded.push(hi << 4 | lo);
            i += 3;
        } else {
            decoded.push(input[i]);
            i += 1;
        }
    }
    std::str::from_utf8(&decoded)
        .map(|_| ())
        .map_err(|_| FormError::InvalidUtf8)
}

fn hex_digit(b: u8) -> Option<u8> {
    char::from(b)
        .to_digit(16)
        .and_then(|d| u8::try_from(d).ok())
}
