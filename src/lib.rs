//! # plinth
//!
//! A minimal HTTP server scaffold. Nothing more. Nothing less.
//!
//! ## The contract
//!
//! plinth owns the server lifecycle and the request-dispatch pipeline:
//! validated configuration, route and middleware registration, a uniform
//! handler contract, structured error-to-response mapping, and
//! signal-driven graceful shutdown with a bounded drain. Business handlers,
//! auth token validation, and environment parsing are yours; plinth consumes
//! them through narrow interfaces and does the plumbing.
//!
//! What plinth gives every request, with no opt-in:
//!
//! - **A request identifier** — generated before any middleware runs,
//!   echoed in the `X-Request-ID` response header, threaded through every
//!   log event.
//! - **An information-hiding error boundary** — classified
//!   [`DomainError`]s keep their code, kind tag, and message in the JSON
//!   body; anything opaque is logged in full server-side and answered with
//!   a bare `{"code":500}`.
//! - **A health check** — `GET /health` answers `200 ok`, bypassing caller
//!   middleware so probes are never gated by auth policy.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use plinth::{Config, HandlerError, Method, Request, Response, Route, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), plinth::Error> {
//!     let config = Config {
//!         port: "3000".to_owned(),
//!         timeout_secs: 30,
//!         static_dir: None,
//!         debug: false,
//!     };
//!     plinth::logging::init(config.debug);
//!
//!     let mut server = Server::new(config);
//!     server.add_routes([
//!         Route::new("getUser", Method::GET, "/users/{id}", get_user),
//!     ]);
//!
//!     // Blocks until SIGTERM / Ctrl-C, then drains in-flight requests.
//!     server.listen().await
//! }
//!
//! async fn get_user(req: Request) -> Result<Response, HandlerError> {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Ok(Response::json(format!(r#"{{"id":"{id}"}}"#)))
//! }
//! ```

mod config;
mod error;
mod handler;
mod health;
mod request;
mod response;
mod route;
mod router;
mod server;
mod static_files;

pub mod logging;
pub mod middleware;

pub use config::Config;
#[doc(hidden)]
pub use handler::BoxFuture;
pub use error::{DomainError, Error, HandlerError, INVALID_ARGUMENT, REQUIRED_ARGUMENT};
pub use handler::Handler;
pub use middleware::{Middleware, Next};
pub use request::{Request, RequestId};
pub use response::{ErrorResponse, Response};
pub use route::Route;
pub use server::Server;

// Routes take the transport-level method type directly; re-exported so
// callers do not need an explicit `http` dependency.
pub use http::Method;
