//! Axum bridge between the transport and the synchronous pipeline.
//!
//! [`build_pipeline`] stacks the configured decorators in front of an
//! application handler. [`build_router`] wraps that pipeline in an Axum
//! fallback: each request's body is buffered (up to the configured limit),
//! converted into a [`Request`], served on Tokio's blocking pool, and
//! whatever the pipeline emitted through its [`Responder`] becomes the
//! HTTP response. [`shutdown_signal`] handles SIGTERM / Ctrl+C.

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::model::Config;
use crate::handler::BoxHandler;
use crate::middleware::{debug_logger, process_form, EntropySource};
use crate::request::Request;
use crate::respond::{Responder, ResponseBody};
use crate::strings_map::StringsMap;

pub struct AppState {
    pub pipeline: BoxHandler,
    pub max_request_body_len: u64,
}

/// Debug logger (outermost), then form gate, then XSRF guard, then `app`.
#[must_use]
pub fn build_pipeline(config: &Config, entropy: Arc<dyn EntropySource>, app: BoxHandler) -> BoxHandler {
    debug_logger(
        config.debug_logging,
        process_form(config.max_request_body_len, config.check_xsrf, entropy, app),
    )
}

/// Names of the stages [`build_pipeline`] assembles, outermost first.
#[must_use]
pub fn pipeline_stages(config: &Config) -> Vec<&'static str> {
    let mut stages = Vec::with_capacity(4);
    if config.debug_logging {
        stages.push("debug_logger");
    }
    stages.push("form_gate");
    if config.check_xsrf {
        stages.push("xsrf_guard");
    }
    stages.push("app");
    stages
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(pipeline_handler)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

#[derive(Default)]
struct Captured {
    status: Option<StatusCode>,
    header: StringsMap,
    body: Vec<u8>,
}

type Slot = Arc<Mutex<Captured>>;

fn lock(slot: &Slot) -> MutexGuard<'_, Captured> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Records the pipeline's response so the async side can build the real one.
struct BufferedResponder(Slot);

impl Responder for BufferedResponder {
    fn respond(self: Box<Self>, status: StatusCode, header: StringsMap) -> ResponseBody {
        let Self(slot) = *self;
        {
            let mut captured = lock(&slot);
            captured.status = Some(status);
            captured.header = header;
        }
        Box::new(BodyWriter(slot))
    }
}

struct BodyWriter(Slot);

impl io::Write for BodyWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.0).body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub async fn pipeline_handler(
    State(state): State<Arc<AppState>>,
    request: axum::extract::Request,
) -> Response {
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let (parts, body) = request.into_parts();

    let correlation_id = parts
        .headers
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);

    let limit = state.max_request_body_len;
    let buffered = match read_body(&parts, body, limit).await {
        Ok(buffered) => buffered,
        Err(status) => {
            tracing::warn!(
                correlation_id = %correlation_id,
                status = status.as_u16(),
                "failed to buffer request body"
            );
            return status.into_response();
        }
    };

    tracing::debug!(
        correlation_id = %correlation_id,
        method = %parts.method,
        path = %parts.uri.path(),
        "request received"
    );

    let slot = Slot::default();
    let responder = BufferedResponder(Arc::clone(&slot));
    let pipeline = Arc::clone(&state.pipeline);
    let outcome = tokio::task::spawn_blocking(move || {
        let mut req = Request::from_parts(&parts, buffered.bytes(), Box::new(responder));
        req.remote_addr = remote_addr;
        if matches!(buffered, Buffered::Overflowed) {
            // Length unknown past the limit; enough for the form gate to reject.
            req.content_length = Some(limit.saturating_add(1));
        }
        pipeline.serve(&mut req);
    })
    .await;

    if let Err(e) = outcome {
        tracing::error!(correlation_id = %correlation_id, error = %e, "pipeline task failed");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let captured = std::mem::take(&mut *lock(&slot));
    into_response(captured, &correlation_id)
}

enum Buffered {
    Complete(Bytes),
    /// Declared `Content-Length` is over the limit; the body was not read.
    Skipped,
    /// Undeclared length, and the stream ran past the limit.
    Overflowed,
}

impl Buffered {
    fn bytes(&self) -> Bytes {
        match self {
            Self::Complete(bytes) => bytes.clone(),
            Self::Skipped | Self::Overflowed => Bytes::new(),
        }
    }
}

/// Buffer the body up to `limit`. Oversized bodies are not an error here:
/// the form gate rejects them inside the pipeline, so the request's error
/// handler, response filters, and debug logger all see the rejection.
async fn read_body(
    parts: &http::request::Parts,
    body: Body,
    limit: u64,
) -> Result<Buffered, StatusCode> {
    let declared = parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Ok(Buffered::Skipped);
    }

    let max = usize::try_from(limit).unwrap_or(usize::MAX);
    match Limited::new(body, max).collect().await {
        Ok(collected) => Ok(Buffered::Complete(collected.to_bytes())),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => Ok(Buffered::Overflowed),
        Err(e) => {
            tracing::debug!(error = %e, "error reading request body");
            Err(StatusCode::BAD_REQUEST)
        }
    }
}

fn into_response(captured: Captured, correlation_id: &str) -> Response {
    let Some(status) = captured.status else {
        tracing::warn!(correlation_id = %correlation_id, "pipeline finished without responding");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    let mut builder = Response::builder().status(status);
    for (key, value) in captured.header.iter() {
        builder = builder.header(key, value);
    }
    builder
        .header("x-correlation-id", correlation_id)
        .body(Body::from(captured.body))
        .unwrap_or_else(|e| {
            tracing::error!(
                correlation_id = %correlation_id,
                error = %e,
                "failed to build response"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn buffered_responder_captures_status_headers_and_body() {
        let slot = Slot::default();
        let mut header = StringsMap::headers();
        header.append("Set-Cookie", "a=1");
        header.append("Set-Cookie", "b=2");

        let mut body = Box::new(BufferedResponder(Arc::clone(&slot))).respond(StatusCode::CREATED, header);
        body.write_all(b"hello ").unwrap();
        body.write_all(b"world").unwrap();

        let captured = std::mem::take(&mut *lock(&slot));
        let response = into_response(captured, "cid");
        assert_eq!(response.status(), StatusCode::CREATED);
        let cookies: Vec<_> = response.headers().get_all("set-cookie").iter().collect();
        assert_eq!(cookies, ["a=1", "b=2"]);
        assert_eq!(response.headers().get("x-correlation-id").unwrap(), "cid");
    }

    fn parts(content_length: Option<&str>) -> http::request::Parts {
        let mut builder = http::Request::builder().method("POST").uri("/submit");
        if let Some(len) = content_length {
            builder = builder.header(header::CONTENT_LENGTH, len);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn body_within_limit_is_buffered() {
        let buffered = read_body(&parts(None), Body::from("a=1"), 16).await.unwrap();
        assert_eq!(buffered.bytes(), Bytes::from_static(b"a=1"));
    }

    #[tokio::test]
    async fn undeclared_overflow_is_handed_to_the_pipeline() {
        let buffered = read_body(&parts(None), Body::from("x".repeat(64)), 16).await.unwrap();
        assert!(matches!(buffered, Buffered::Overflowed));
        assert!(buffered.bytes().is_empty());
    }

    #[tokio::test]
    async fn declared_overflow_is_not_read() {
        let buffered = read_body(&parts(Some("64")), Body::from("x".repeat(64)), 16).await.unwrap();
        assert!(matches!(buffered, Buffered::Skipped));
    }

    #[test]
    fn stages_follow_config() {
        let mut config = Config::default();
        assert_eq!(pipeline_stages(&config), ["form_gate", "xsrf_guard", "app"]);
        config.debug_logging = true;
        config.check_xsrf = false;
        assert_eq!(pipeline_stages(&config), ["debug_logger", "form_gate", "app"]);
    }

    #[test]
    fn missing_response_is_500() {
        let response = into_response(Captured::default(), "cid");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
