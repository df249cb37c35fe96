//! Per-request context threaded through every handler.
//!
//! [`Request`] owns the inbound metadata, the header/parameter/cookie maps,
//! the buffered body, and two pieces of mutable per-request state: the
//! current [`Responder`] (replaced whenever a response filter is installed)
//! and the current [`ErrorHandler`]. Nothing here outlives the request.

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use cookie::Cookie;
use http::{header, Method, StatusCode, Uri, Version};

use crate::error::{RequestError, RespondError};
use crate::respond::{FilterResponder, Responder, ResponseBody};
use crate::strings_map::StringsMap;

/// Callback invoked by [`Request::error`].
pub type ErrorHandler = Arc<dyn Fn(&mut Request, StatusCode, &RequestError) + Send + Sync>;

pub struct Request {
    pub method: Method,
    pub url: Uri,
    pub version: Version,
    pub remote_addr: Option<SocketAddr>,
    pub content_type: String,
    /// Declared `Content-Length`, if the client sent one.
    pub content_length: Option<u64>,
    pub header: StringsMap,
    pub param: StringsMap,
    pub cookie: StringsMap,
    pub body: Bytes,
    pub error_handler: ErrorHandler,
    responder: Option<Box<dyn Responder>>,
}

impl Request {
    #[must_use]
    pub fn new(method: Method, url: Uri, responder: Box<dyn Responder>) -> Self {
        Self {
            method,
            url,
            version: Version::HTTP_11,
            remote_addr: None,
            content_type: String::new(),
            content_length: None,
            header: StringsMap::headers(),
            param: StringsMap::new(),
            cookie: StringsMap::new(),
            body: Bytes::new(),
            error_handler: default_error_handler(),
            responder: Some(responder),
        }
    }

    /// Build a request from transport-level parts. Headers are copied into
    /// the header map (non-UTF-8 values are skipped), and the `Content-Type`,
    /// `Content-Length`, and `Cookie` headers are decoded into their fields.
    #[must_use]
    pub fn from_parts(parts: &http::request::Parts, body: Bytes, responder: Box<dyn Responder>) -> Self {
        let mut req = Self::new(parts.method.clone(), parts.uri.clone(), responder);
        req.version = parts.version;
        req.body = body;

        for (name, value) in &parts.headers {
            match value.to_str() {
                Ok(v) => req.header.append(name.as_str(), v),
                Err(_) => tracing::debug!(header = %name, "skipping non-UTF-8 header value"),
            }
        }

        req.content_type = req
            .header
            .get(header::CONTENT_TYPE.as_str())
            .unwrap_or_default()
            .to_string();
        req.content_length = req
            .header
            .get(header::CONTENT_LENGTH.as_str())
            .and_then(|v| v.trim().parse().ok());

        for line in req.header.get_all(header::COOKIE.as_str()) {
            parse_cookie_header(line, &mut req.cookie);
        }

        req
    }

    /// Replace the current responder with one that passes `(status, header)`
    /// through `filter` first. Filters installed later run earlier.
    pub fn filter_respond<F>(&mut self, filter: F)
    where
        F: FnOnce(StatusCode, StringsMap) -> (StatusCode, StringsMap) + Send + 'static,
    {
        match self.responder.take() {
            Some(inner) => {
                self.responder = Some(Box::new(FilterResponder::new(inner, Box::new(filter))));
            }
            None => tracing::warn!("response filter installed after response started, ignoring"),
        }
    }

    /// Emit the status and headers through the current responder chain.
    pub fn respond(
        &mut self,
        status: StatusCode,
        header: StringsMap,
    ) -> Result<ResponseBody, RespondError> {
        let responder = self.responder.take().ok_or(RespondError::AlreadyResponded)?;
        Ok(responder.respond(status, header))
    }

    #[must_use]
    pub const fn has_responded(&self) -> bool {
        self.responder.is_none()
    }

    /// Short-circuit the request: hand `status` and `reason` to the current
    /// error handler.
    pub fn error(&mut self, status: StatusCode, reason: RequestError) {
        let handler = Arc::clone(&self.error_handler);
        handler(self, status, &reason);
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("version", &self.version)
            .field("remote_addr", &self.remote_addr)
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .field("header", &self.header)
            .field("param", &self.param)
            .field("cookie", &self.cookie)
            .field("responded", &self.has_responded())
            .finish_non_exhaustive()
    }
}

/// Decode one `Cookie` header line (`a=1; b=2`) into `cookies`. Pairs the
/// codec rejects (no `=`, empty name) are skipped; surrounding quotes are
/// dropped from values.
pub fn parse_cookie_header(line: &str, cookies: &mut StringsMap) {
    for parsed in Cookie::split_parse(line) {
        match parsed {
            Ok(cookie) => cookies.append(cookie.name(), cookie.value_trimmed()),
            Err(e) => tracing::debug!(error = %e, "skipping malformed cookie pair"),
        }
    }
}

/// The handler every request starts with: responds with the status and its
/// canonical reason as plain text. The reason itself is only logged.
#[must_use]
pub fn default_error_handler() -> ErrorHandler {
    Arc::new(|req: &mut Request, status: StatusCode, reason: &RequestError| {
        tracing::debug!(
            method = %req.method,
            url = %req.url,
            status = status.as_u16(),
            reason = %reason,
            "request rejected"
        );

        let mut reply_header = StringsMap::headers();
        reply_header.set(header::CONTENT_TYPE.as_str(), "text/plain; charset=utf-8");
        match req.respond(status, reply_header) {
            Ok(mut body) => {
                let text = format!(
                    "{} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or_default()
                );
                if let Err(e) = body.write_all(text.as_bytes()) {
                    tracing::debug!(error = %e, "failed to write error body");
                }
            }
            Err(e) => tracing::warn!(error = %e, status = status.as_u16(), "cannot report error"),
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default, Clone)]
    struct Captured(Arc<Mutex<Vec<(StatusCode, StringsMap)>>>);

    impl Responder for Captured {
        fn respond(self: Box<Self>, status: StatusCode, header: StringsMap) -> ResponseBody {
            self.0.lock().unwrap().push((status, header));
            Box::new(std::io::sink())
        }
    }

    #[test]
    fn second_respond_is_rejected() {
        let captured = Captured::default();
        let mut req = Request::new(Method::GET, Uri::from_static("/"), Box::new(captured.clone()));
        assert!(req.respond(StatusCode::OK, StringsMap::headers()).is_ok());
        assert!(req.has_responded());
        assert_eq!(
            req.respond(StatusCode::OK, StringsMap::headers()).err(),
            Some(RespondError::AlreadyResponded)
        );
        assert_eq!(captured.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn error_uses_current_handler() {
        let captured = Captured::default();
        let mut req = Request::new(Method::POST, Uri::from_static("/"), Box::new(captured.clone()));
        req.error(StatusCode::NOT_FOUND, RequestError::BadXsrfToken);

        let calls = captured.0.lock().unwrap();
        assert_eq!(calls[0].0, StatusCode::NOT_FOUND);
        assert_eq!(calls[0].1.get("content-type"), Some("text/plain; charset=utf-8"));
    }

    #[test]
    fn from_parts_decodes_headers_and_cookies() {
        let (parts, ()) = http::Request::builder()
            .method(Method::POST)
            .uri("/submit?a=1")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Content-Length", "7")
            .header("Cookie", "xsrf=deadbeef; theme=\"dark\"")
            .body(())
            .unwrap()
            .into_parts();

        let req = Request::from_parts(&parts, Bytes::from_static(b"b=2&c=3"), Box::new(Captured::default()));

        assert_eq!(req.content_type, "application/x-www-form-urlencoded");
        assert_eq!(req.content_length, Some(7));
        assert_eq!(req.cookie.get("xsrf"), Some("deadbeef"));
        assert_eq!(req.cookie.get("theme"), Some("dark"));
        assert_eq!(req.header.get("CONTENT-LENGTH"), Some("7"));
    }

    #[test]
    fn cookie_parser_skips_malformed_pairs() {
        let mut cookies = StringsMap::new();
        parse_cookie_header("novalue; =orphan; ok=1", &mut cookies);
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies.get("ok"), Some("1"));
    }
}
