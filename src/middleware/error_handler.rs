//! Request-scoped error handler injection.

use std::sync::Arc;

use crate::handler::{BoxHandler, Handler};
use crate::request::{ErrorHandler, Request};

struct SetErrorHandler {
    error_handler: ErrorHandler,
    next: BoxHandler,
}

impl Handler for SetErrorHandler {
    fn serve(&self, req: &mut Request) {
        req.error_handler = Arc::clone(&self.error_handler);
        self.next.serve(req);
    }
}

/// Returns a handler that installs `error_handler` on the request, then
/// delegates to `next`. Handlers nested deeper can install their own.
#[must_use]
pub fn set_error_handler(error_handler: ErrorHandler, next: BoxHandler) -> BoxHandler {
    Arc::new(SetErrorHandler {
        error_handler,
        next,
    })
}
