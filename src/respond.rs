//! Response emission and the response filter chain.
//!
//! A [`Responder`] is consumed by its single call to
//! [`respond`](Responder::respond), which emits the status and headers and
//! hands back a [`ResponseBody`] for the payload. [`FilterResponder`] wraps
//! another responder with a transform on the `(status, header)` pair;
//! wrapping repeatedly builds an onion where the newest filter runs first
//! and its output feeds every older filter down to the real responder.

use http::StatusCode;

use crate::strings_map::StringsMap;

/// Writer for the response payload, returned once headers are emitted.
pub type ResponseBody = Box<dyn std::io::Write + Send>;

/// Transform applied to the outgoing status and headers.
pub type RespondFilter = Box<dyn FnOnce(StatusCode, StringsMap) -> (StatusCode, StringsMap) + Send>;

pub trait Responder: Send {
    fn respond(self: Box<Self>, status: StatusCode, header: StringsMap) -> ResponseBody;
}

pub struct FilterResponder {
    inner: Box<dyn Responder>,
    filter: RespondFilter,
}

impl FilterResponder {
    #[must_use]
    pub fn new(inner: Box<dyn Responder>, filter: RespondFilter) -> Self {
        Self { inner, filter }
    }
}

impl Responder for FilterResponder {
    fn respond(self: Box<Self>, status: StatusCode, header: StringsMap) -> ResponseBody {
        let Self { inner, filter } = *self;
        let (status, header) = filter(status, header);
        inner.respond(status, header)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    type Seen = Arc<Mutex<Option<(StatusCode, StringsMap)>>>;

    struct Recording(Seen);

    impl Responder for Recording {
        fn respond(self: Box<Self>, status: StatusCode, header: StringsMap) -> ResponseBody {
            *self.0.lock().unwrap() = Some((status, header));
            Box::new(std::io::sink())
        }
    }

    #[test]
    fn filter_transforms_before_delegating() {
        let seen = Seen::default();
        let responder = FilterResponder::new(
            Box::new(Recording(seen.clone())),
            Box::new(|_, mut header| {
                header.append("x-filtered", "yes");
                (StatusCode::ACCEPTED, header)
            }),
        );

        let _ = Box::new(responder).respond(StatusCode::OK, StringsMap::headers());

        let (status, header) = seen.lock().unwrap().take().unwrap();
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(header.get("x-filtered"), Some("yes"));
    }

    #[test]
    fn newest_filter_runs_first() {
        let seen = Seen::default();
        let inner = FilterResponder::new(
            Box::new(Recording(seen.clone())),
            Box::new(|status, mut header| {
                header.append("order", "first-installed");
                (status, header)
            }),
        );
        let outer = FilterResponder::new(
            Box::new(inner),
            Box::new(|status, mut header| {
                header.append("order", "second-installed");
                (status, header)
            }),
        );

        let _ = Box::new(outer).respond(StatusCode::OK, StringsMap::headers());

        let (_, header) = seen.lock().unwrap().take().unwrap();
        assert_eq!(header.get_all("order"), ["second-installed", "first-installed"]);
    }
}
