//! Internal dispatcher: route mounting and the per-request pipeline.
//!
//! Built once by [`Server::listen`](crate::Server::listen) from the
//! registered routes and middlewares, then shared read-only across every
//! connection task. One radix tree per HTTP method — O(path-length) lookup,
//! no allocations on the hot path beyond the matched parameters.
//!
//! Mounting order is fixed:
//!
//! 1. the static directory, if configured (resolution failure is logged and
//!    skipped, never fatal);
//! 2. the built-in `GET /health` route, with caller middleware bypassed;
//! 3. every caller route, wrapped by the middleware chain unless the route
//!    opts out.
//!
//! Conflicting `(path, method)` registrations are rejected by the underlying
//! matcher at mount time; the dispatcher does not re-implement that policy.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{Method, StatusCode};
use http_body_util::{BodyExt, Full};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{DomainError, Error, HandlerError};
use crate::handler::BoxedHandler;
use crate::health;
use crate::middleware::{self, Middleware};
use crate::request::{Request, RequestId};
use crate::response::{error_json, respond_json, ErrorResponse};
use crate::route::Route;
use crate::static_files::{self, STATIC_PREFIX};

/// Response header carrying the per-request identifier.
pub(crate) const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

pub(crate) struct Dispatcher {
    trees: HashMap<Method, matchit::Router<BoxedHandler>>,
    static_dir: Option<PathBuf>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("methods", &self.trees.keys().collect::<Vec<_>>())
            .field("static_dir", &self.static_dir)
            .finish()
    }
}

impl Dispatcher {
    /// Builds the final dispatchable router from the server's registrations.
    pub(crate) fn mount(
        config: &Config,
        routes: Vec<Route>,
        middlewares: &[Arc<dyn Middleware>],
    ) -> Result<Self, Error> {
        let static_dir = config.static_dir.as_ref().and_then(|dir| {
            match std::fs::canonicalize(dir) {
                Ok(abs) => {
                    info!(dir = %abs.display(), prefix = STATIC_PREFIX, "static directory mounted");
                    Some(abs)
                }
                Err(e) => {
                    error!(dir = %dir.display(), error = %e, "unable to mount static directory");
                    None
                }
            }
        });

        let health = Route::new("health", Method::GET, "/health", health::health_check)
            .bypass_middleware();

        let mut trees: HashMap<Method, matchit::Router<BoxedHandler>> = HashMap::new();
        for route in std::iter::once(health).chain(routes) {
            let handler = if route.bypass_middleware {
                route.handler
            } else {
                middleware::apply(middlewares, route.handler)
            };

            if let Err(e) = trees
                .entry(route.method.clone())
                .or_default()
                .insert(route.path.as_str(), handler)
            {
                return Err(Error::Route(
                    DomainError::invalid_args(&[route.path.as_str()]).with_cause(e),
                ));
            }

            debug!(name = %route.name, method = %route.method, path = %route.path, "route mounted");
        }

        Ok(Self { trees, static_dir })
    }

    /// Routes one transport request and produces exactly one response.
    ///
    /// All failures are handled internally (404, 500, …) so the connection
    /// layer never sees an error. Every response — success, error, static,
    /// or 404 — carries the generated `X-Request-ID` header.
    ///
    /// Generic over the body type so tests can drive the pipeline with
    /// in-memory requests.
    pub(crate) async fn dispatch<B>(
        &self,
        req: http::Request<B>,
        remote_addr: SocketAddr,
    ) -> http::Response<Full<Bytes>>
    where
        B: http_body::Body,
        B::Error: std::fmt::Display,
    {
        let request_id = RequestId::generate();
        let mut response = self.route_request(req, remote_addr, &request_id).await;

        if let Ok(value) = HeaderValue::try_from(request_id.as_str()) {
            response.headers_mut().insert(X_REQUEST_ID, value);
        }
        response
    }

    async fn route_request<B>(
        &self,
        req: http::Request<B>,
        remote_addr: SocketAddr,
        request_id: &RequestId,
    ) -> http::Response<Full<Bytes>>
    where
        B: http_body::Body,
        B::Error: std::fmt::Display,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_owned();

        // Static serving is GET-only; anything else falls through to the
        // route tables (and typically 404s).
        if let Some(dir) = &self.static_dir {
            if is_static_path(&path) && method == Method::GET {
                return static_files::serve(dir, &path).await;
            }
        }

        let Some((handler, params)) = self.lookup(&method, &path) else {
            debug!(method = %method, path = %path, request_id = %request_id, "no route matched");
            return error_json(&ErrorResponse {
                code: StatusCode::NOT_FOUND.as_u16(),
                ..Default::default()
            });
        };

        let (parts, body) = req.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                error!(request_id = %request_id, error = %e, "unable to read request body");
                return error_json(&ErrorResponse {
                    code: StatusCode::BAD_REQUEST.as_u16(),
                    ..Default::default()
                });
            }
        };

        let request = Request::new(
            parts.method,
            parts.uri,
            parts.headers,
            body,
            remote_addr,
            params,
            request_id.clone(),
        );

        info!(
            method = %method,
            path = %path,
            query = request.query().unwrap_or(""),
            request_id = %request_id,
            remote_addr = %remote_addr,
            "request received"
        );

        let started = Instant::now();
        match handler.call(request).await {
            Ok(res) => {
                info!(
                    status = res.status_code,
                    latency_ms = started.elapsed().as_millis() as u64,
                    request_id = %request_id,
                    "request completed"
                );
                respond_json(&res)
            }
            Err(err) => {
                let latency_ms = started.elapsed().as_millis() as u64;
                // Full detail (wrapped causes included) belongs in the logs;
                // the client body only carries what the mapper allows out.
                match &err {
                    HandlerError::Domain(e) => error!(
                        kind = e.kind(),
                        error = %e,
                        latency_ms,
                        request_id = %request_id,
                        "handler error"
                    ),
                    HandlerError::Opaque(e) => error!(
                        error = %e,
                        latency_ms,
                        request_id = %request_id,
                        "handler error"
                    ),
                }
                error_json(&err.to_error_response())
            }
        }
    }

    fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.trees.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched
            .params
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

fn is_static_path(path: &str) -> bool {
    path == STATIC_PREFIX
        || path
            .strip_prefix(STATIC_PREFIX)
            .is_some_and(|rest| rest.starts_with('/'))
}
