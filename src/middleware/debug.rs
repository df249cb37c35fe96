//! Request and response diagnostic logging.
//!
//! When enabled, [`debug_logger`] writes a text snapshot of each inbound
//! request before delegating, and installs a response filter that writes
//! the outgoing status and headers once the response is emitted. The
//! filter hands its inputs back untouched. When disabled, the wrapped
//! handler is returned as is.

use std::fmt::Write;
use std::sync::Arc;

use http::StatusCode;

use crate::handler::{BoxHandler, Handler};
use crate::logging::DEBUG_TARGET;
use crate::request::Request;
use crate::strings_map::StringsMap;

/// Destination for preformatted log text.
pub trait LogSink: Send + Sync {
    fn write(&self, text: &str);
}

/// Emits each entry as one `tracing` event under target `webguard::debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write(&self, text: &str) {
        tracing::info!(target: DEBUG_TARGET, "{text}");
    }
}

struct DebugLogger {
    sink: Arc<dyn LogSink>,
    next: BoxHandler,
}

impl Handler for DebugLogger {
    fn serve(&self, req: &mut Request) {
        self.sink.write(&format_request(req));

        let sink = Arc::clone(&self.sink);
        req.filter_respond(move |status, header| {
            sink.write(&format_response(status, &header));
            (status, header)
        });

        self.next.serve(req);
    }
}

#[must_use]
pub fn debug_logger(enabled: bool, next: BoxHandler) -> BoxHandler {
    debug_logger_with(enabled, Arc::new(TracingSink), next)
}

/// Like [`debug_logger`], writing to `sink` instead of `tracing`.
#[must_use]
pub fn debug_logger_with(enabled: bool, sink: Arc<dyn LogSink>, next: BoxHandler) -> BoxHandler {
    if !enabled {
        return next;
    }
    Arc::new(DebugLogger { sink, next })
}

// write! to String is infallible; results below are discarded for that reason.

fn write_strings_map(buf: &mut String, title: &str, map: &StringsMap) {
    if map.is_empty() {
        return;
    }
    let _ = writeln!(buf, "  {title}:");
    for (key, value) in map.iter() {
        let _ = writeln!(buf, "    {key}: {value}");
    }
}

#[must_use]
pub fn format_request(req: &Request) -> String {
    let mut buf = String::from("REQUEST\n");
    let _ = writeln!(buf, "  {} {:?} {}", req.method, req.version, req.url);
    match req.remote_addr {
        Some(addr) => {
            let _ = writeln!(buf, "  RemoteAddr:  {addr}");
        }
        None => buf.push_str("  RemoteAddr:  -\n"),
    }
    let _ = writeln!(buf, "  ContentType:  {}", req.content_type);
    match req.content_length {
        Some(len) => {
            let _ = writeln!(buf, "  ContentLength:  {len}");
        }
        None => buf.push_str("  ContentLength:  -1\n"),
    }
    write_strings_map(&mut buf, "Header", &req.header);
    write_strings_map(&mut buf, "Param", &req.param);
    write_strings_map(&mut buf, "Cookie", &req.cookie);
    buf
}

#[must_use]
pub fn format_response(status: StatusCode, header: &StringsMap) -> String {
    let mut buf = String::from("RESPONSE\n");
    let _ = writeln!(buf, "  Status: {}", status.as_u16());
    write_strings_map(&mut buf, "Header", header);
    buf
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use http::{Method, Uri};

    use super::*;
    use crate::handler::handler_fn;
    use crate::respond::{Responder, ResponseBody};

    #[derive(Default)]
    struct Collect(Mutex<Vec<String>>);

    impl LogSink for Collect {
        fn write(&self, text: &str) {
            self.0.lock().unwrap().push(text.to_string());
        }
    }

    struct Discard;

    impl Responder for Discard {
        fn respond(self: Box<Self>, _: StatusCode, _: StringsMap) -> ResponseBody {
            Box::new(std::io::sink())
        }
    }

    type Seen = Arc<Mutex<Option<(StatusCode, StringsMap)>>>;

    struct Recording(Seen);

    impl Responder for Recording {
        fn respond(self: Box<Self>, status: StatusCode, header: StringsMap) -> ResponseBody {
            *self.0.lock().unwrap() = Some((status, header));
            Box::new(std::io::sink())
        }
    }

    #[test]
    fn request_snapshot_lists_every_map() {
        let mut req = Request::new(Method::POST, Uri::from_static("/a?b=1"), Box::new(Discard));
        req.remote_addr = Some("127.0.0.1:5000".parse().unwrap());
        req.content_type = "text/plain".into();
        req.content_length = Some(12);
        req.header.append("Host", "example.com");
        req.param.append("b", "1");
        req.cookie.append("xsrf", "deadbeef");

        let text = format_request(&req);
        assert_eq!(
            text,
            "REQUEST\n  POST HTTP/1.1 /a?b=1\n  RemoteAddr:  127.0.0.1:5000\n  \
             ContentType:  text/plain\n  ContentLength:  12\n  Header:\n    host: example.com\n  \
             Param:\n    b: 1\n  Cookie:\n    xsrf: deadbeef\n"
        );
    }

    #[test]
    fn request_snapshot_marks_unknowns_and_skips_empty_maps() {
        let req = Request::new(Method::GET, Uri::from_static("/"), Box::new(Discard));
        let text = format_request(&req);
        assert!(text.contains("RemoteAddr:  -\n"));
        assert!(text.contains("ContentLength:  -1\n"));
        assert!(!text.contains("Header:"));
    }

    #[test]
    fn logs_request_then_response_unchanged() {
        let sink = Arc::new(Collect::default());
        let seen = Seen::default();
        let app = handler_fn(|req| {
            let mut header = StringsMap::headers();
            header.append("Content-Type", "text/html");
            let _ = req.respond(StatusCode::CREATED, header);
        });
        let handler = debug_logger_with(true, sink.clone(), app);

        let mut req = Request::new(Method::GET, Uri::from_static("/x"), Box::new(Recording(seen.clone())));
        handler.serve(&mut req);

        let entries = sink.0.lock().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].starts_with("REQUEST\n  GET HTTP/1.1 /x\n"));
        assert_eq!(
            entries[1],
            "RESPONSE\n  Status: 201\n  Header:\n    content-type: text/html\n"
        );

        let (status, header) = seen.lock().unwrap().take().unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(header.get_all("content-type"), ["text/html"]);
    }

    #[test]
    fn disabled_logger_returns_wrapped_handler() {
        let sink = Arc::new(Collect::default());
        let app = handler_fn(|_| {});
        let handler = debug_logger_with(false, sink.clone(), app.clone());
        assert!(Arc::ptr_eq(&app, &handler));

        let mut req = Request::new(Method::GET, Uri::from_static("/"), Box::new(Discard));
        handler.serve(&mut req);
        assert!(sink.0.lock().unwrap().is_empty());
    }
}
