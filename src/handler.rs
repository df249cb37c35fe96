//! The handler abstraction every pipeline stage implements.
//!
//! A [`Handler`] serves one [`Request`] synchronously, either responding
//! itself or delegating to the next handler it wraps. Decorators take a
//! [`BoxHandler`] and return another one, so stages compose by nesting.

use std::sync::Arc;

use crate::request::Request;

pub trait Handler: Send + Sync {
    fn serve(&self, req: &mut Request);
}

/// Shared, type-erased handler.
pub type BoxHandler = Arc<dyn Handler>;

/// Adapter turning a closure into a [`Handler`].
pub struct HandlerFn<F>(F);

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&mut Request) + Send + Sync,
{
    fn serve(&self, req: &mut Request) {
        (self.0)(req);
    }
}

#[must_use]
pub fn handler_fn<F>(f: F) -> BoxHandler
where
    F: Fn(&mut Request) + Send + Sync + 'static,
{
    Arc::new(HandlerFn(f))
}
