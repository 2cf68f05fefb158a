//! Route descriptors.

use http::Method;

use crate::handler::{BoxedHandler, Handler};

/// Describes one API route to mount on the server.
///
/// Routes are created at registration time and never mutated afterwards.
/// Uniqueness of `(path, method)` pairs is the caller's responsibility:
/// conflicting patterns are rejected by the underlying matcher when the
/// server mounts its routes, not deduplicated here.
pub struct Route {
    pub(crate) name: String,
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) handler: BoxedHandler,
    pub(crate) bypass_middleware: bool,
}

impl Route {
    /// Creates a route. Path parameters use `{name}` syntax — retrieve them
    /// with [`Request::param`](crate::Request::param).
    ///
    /// ```rust,no_run
    /// # use plinth::{HandlerError, Method, Request, Response, Route};
    /// # async fn get_user(_: Request) -> Result<Response, HandlerError> { Ok(Response::json("{}")) }
    /// Route::new("getUser", Method::GET, "/users/{id}", get_user);
    /// ```
    pub fn new(
        name: impl Into<String>,
        method: Method,
        path: impl Into<String>,
        handler: impl Handler,
    ) -> Self {
        Self {
            name: name.into(),
            method,
            path: path.into(),
            handler: handler.into_boxed_handler(),
            bypass_middleware: false,
        }
    }

    /// Excludes this route from the caller-supplied middleware chain.
    ///
    /// The built-in `/health` route uses this so health checks are never
    /// subject to authentication or logging policy applied to business
    /// routes.
    #[must_use]
    pub fn bypass_middleware(mut self) -> Self {
        self.bypass_middleware = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("bypass_middleware", &self.bypass_middleware)
            .finish_non_exhaustive()
    }
}
