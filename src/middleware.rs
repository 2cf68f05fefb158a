//! Middleware: handler-wrapping request transforms.
//!
//! A middleware wraps the next stage of the pipeline. It may inspect or
//! modify the request on the way in, the response on the way out, or
//! short-circuit entirely by returning a response without delegating.
//!
//! Order is semantically significant: middlewares registered earlier wrap
//! the ones registered later, so they run first on the way in and last on
//! the way out. Routes flagged
//! [`bypass_middleware`](crate::Route::bypass_middleware) — and the built-in
//! `/health` route — never pass through the chain.
//!
//! ```rust,no_run
//! use plinth::{HandlerError, Next, Request, Response};
//!
//! async fn require_auth(req: Request, next: Next) -> Result<Response, HandlerError> {
//!     if req.header("authorization").is_none() {
//!         return Ok(Response::status(401));
//!     }
//!     next.call(req).await
//! }
//! ```

use std::sync::Arc;

use tracing::info;

use crate::error::HandlerError;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::request::Request;
use crate::response::Response;

/// The next stage of the pipeline: either the following middleware or the
/// route handler itself. Invoke with `next.call(req).await`; skip the call
/// to short-circuit.
pub struct Next {
    handler: BoxedHandler,
}

impl Next {
    pub(crate) fn new(handler: BoxedHandler) -> Self {
        Self { handler }
    }

    /// Delegates the request to the rest of the pipeline.
    pub async fn call(self, req: Request) -> Result<Response, HandlerError> {
        ErasedHandler::call(self.handler.as_ref(), req).await
    }
}

/// A request-intercepting transform applied around route handlers.
///
/// Automatically satisfied for any `async fn` with the signature:
///
/// ```text
/// async fn name(req: Request, next: Next) -> Result<Response, HandlerError>
/// ```
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, req: Request, next: Next) -> BoxFuture;
}

impl<F, Fut> Middleware for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<Response, HandlerError>> + Send + 'static,
{
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        Box::pin(self(req, next))
    }
}

/// Wraps `handler` in every middleware, first-registered outermost.
pub(crate) fn apply(middlewares: &[Arc<dyn Middleware>], handler: BoxedHandler) -> BoxedHandler {
    let mut wrapped = handler;
    for mw in middlewares.iter().rev() {
        wrapped = Arc::new(Stage { mw: Arc::clone(mw), next: wrapped });
    }
    wrapped
}

/// One link of the chain: a middleware plus everything inside it.
struct Stage {
    mw: Arc<dyn Middleware>,
    next: BoxedHandler,
}

impl ErasedHandler for Stage {
    fn call(&self, req: Request) -> BoxFuture {
        self.mw.handle(req, Next::new(Arc::clone(&self.next)))
    }
}

/// Ready-made middleware that logs every request passing through it.
///
/// The dispatch layer already emits inbound/outbound events for all routes;
/// this adds a caller-controlled log line for the routes it is mounted on,
/// useful when only a subset of routes should be traced at info level.
pub async fn log_requests(req: Request, next: Next) -> Result<Response, HandlerError> {
    info!(
        remote_addr = %req.remote_addr(),
        method = %req.method(),
        path = req.path(),
        "handling request"
    );
    next.call(req).await
}
