//! Server lifecycle: validate → mount → bind → accept → drain.
//!
//! # Graceful shutdown
//!
//! When the orchestrator terminates the process it sends **SIGTERM** and
//! waits a grace period before SIGKILL. The server reacts by:
//!
//! 1. Immediately stopping `listener.accept()` — no new connections.
//! 2. Signalling every watched connection to finish its in-flight requests
//!    and stop reusing keep-alive, so idle clients are not held open.
//! 3. Waiting for the drain, bounded by the configured timeout. Overrunning
//!    the bound returns [`Error::ShutdownTimeout`] and the process owner
//!    decides whether to force-exit.
//!
//! There is no restart: [`Server::listen`] consumes the server, so a fresh
//! instance is required to listen again.

use std::convert::Infallible;
use std::sync::Arc;

use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::Config;
use crate::error::Error;
use crate::middleware::Middleware;
use crate::route::Route;
use crate::router::Dispatcher;

/// The HTTP server.
///
/// Holds the configuration plus the routes and middlewares to mount when
/// [`listen`](Server::listen) is called. Both registries are append-only;
/// `listen` consumes the server, so mutation after listening starts is
/// unrepresentable.
pub struct Server {
    config: Config,
    routes: Vec<Route>,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Server {
    /// Creates a server with the given configuration. Validation happens in
    /// [`listen`](Server::listen), not here.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            routes: Vec::new(),
            middlewares: Vec::new(),
        }
    }

    /// Appends routes to mount. Safe to call multiple times before
    /// [`listen`](Server::listen); no validation or deduplication happens
    /// until the routes are mounted.
    pub fn add_routes(&mut self, routes: impl IntoIterator<Item = Route>) {
        self.routes.extend(routes);
    }

    /// Appends a middleware. Middlewares run in the order added: earlier
    /// registrations wrap later ones, so they execute first on the way in
    /// and last on the way out.
    pub fn add_middleware(&mut self, middleware: impl Middleware) {
        self.middlewares.push(Arc::new(middleware));
    }

    /// Validates the configuration, mounts the routes, and serves until a
    /// termination signal (SIGTERM or Ctrl-C) followed by a graceful drain.
    ///
    /// Fails fast — before any socket is opened — on an invalid
    /// configuration or a route pattern the matcher rejects. A bind failure
    /// is returned the same way. Once listening, per-request failures never
    /// reach this level; the only error after startup is an overrun drain.
    pub async fn listen(self) -> Result<(), Error> {
        self.config.validate().map_err(Error::Config)?;

        let dispatcher = Arc::new(Dispatcher::mount(
            &self.config,
            self.routes,
            &self.middlewares,
        )?);

        let addr = format!("0.0.0.0:{}", self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        info!(addr = %addr, "server listening");

        let graceful = GracefulShutdown::new();
        let http = ConnBuilder::new(TokioExecutor::new());

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // `biased` makes select! check arms top-to-bottom. Shutdown
                // is first so a signal stops accepting immediately, even if
                // more connections are queued.
                biased;

                () = &mut shutdown => {
                    info!("shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let dispatcher = Arc::clone(&dispatcher);
                    // TokioIo adapts tokio's AsyncRead/AsyncWrite to the
                    // hyper IO traits.
                    let io = TokioIo::new(stream);

                    // `service_fn` is called once per request on the
                    // connection, not once per connection.
                    let svc = service_fn(move |req| {
                        let dispatcher = Arc::clone(&dispatcher);
                        async move {
                            Ok::<_, Infallible>(dispatcher.dispatch(req, remote_addr).await)
                        }
                    });

                    // `auto::Builder` handles both HTTP/1.1 and HTTP/2 —
                    // whatever the client negotiates. The graceful handle
                    // watches the connection so shutdown can disable
                    // keep-alive and wait for in-flight requests.
                    let conn = graceful.watch(http.serve_connection(io, svc).into_owned());

                    tokio::spawn(async move {
                        if let Err(e) = conn.await {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }
            }
        }

        let timeout = self.config.timeout();
        match tokio::time::timeout(timeout, graceful.shutdown()).await {
            Ok(()) => {
                info!("server stopped");
                Ok(())
            }
            Err(_) => Err(Error::ShutdownTimeout(timeout)),
        }
    }
}

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** (sent by orchestrators) and
/// **SIGINT** (Ctrl-C, for local dev). On other platforms only Ctrl-C is
/// available.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    // `pending()` never resolves — on non-Unix platforms the SIGTERM arm is
    // effectively disabled.
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c  => {}
        () = sigterm => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::middleware::Next;
    use crate::request::Request;
    use crate::response::Response;
    use http::Method;

    fn cfg() -> Config {
        Config {
            port: "3000".to_owned(),
            timeout_secs: 30,
            static_dir: None,
            debug: false,
        }
    }

    #[tokio::test]
    async fn listen_refuses_missing_config_without_opening_a_socket() {
        let server = Server::new(Config {
            port: String::new(),
            timeout_secs: 0,
            ..cfg()
        });

        let err = server.listen().await.unwrap_err();
        match err {
            Error::Config(e) => {
                assert_eq!(e.message(), "missing required argument(s): port, timeout");
            }
            other => panic!("expected config error, got {other}"),
        }
    }

    #[tokio::test]
    async fn listen_refuses_zero_timeout_alone() {
        let server = Server::new(Config { timeout_secs: 0, ..cfg() });

        let err = server.listen().await.unwrap_err();
        match err {
            Error::Config(e) => {
                assert_eq!(e.message(), "missing required argument(s): timeout");
            }
            other => panic!("expected config error, got {other}"),
        }
    }

    /// Drives both graceful-shutdown branches with a real SIGTERM.
    ///
    /// One test, two scenarios in sequence: signal delivery is
    /// process-global, so running them concurrently would wake each
    /// other's signal listeners.
    #[cfg(unix)]
    #[tokio::test(flavor = "multi_thread")]
    async fn sigterm_drains_in_flight_requests_bounded_by_the_timeout() {
        use std::time::Duration;

        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::{TcpListener, TcpStream};

        async fn free_port() -> String {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port().to_string()
        }

        fn send_sigterm() {
            let status = std::process::Command::new("kill")
                .args(["-TERM", &std::process::id().to_string()])
                .status()
                .unwrap();
            assert!(status.success());
        }

        // Spawns a server whose only route sleeps for `delay` before
        // answering, and returns once a request to it is in flight.
        async fn start_with_slow_request(
            port: &str,
            timeout_secs: u64,
            delay: Duration,
        ) -> (tokio::task::JoinHandle<Result<(), Error>>, TcpStream) {
            let mut server = Server::new(Config {
                port: port.to_owned(),
                timeout_secs,
                ..cfg()
            });
            server.add_routes([Route::new(
                "slow",
                Method::GET,
                "/slow",
                move |_req: Request| async move {
                    tokio::time::sleep(delay).await;
                    Ok::<_, HandlerError>(Response::json(r#"{"done":true}"#))
                },
            )]);
            let listening = tokio::spawn(server.listen());

            let addr = format!("127.0.0.1:{port}");
            let mut stream = loop {
                match TcpStream::connect(&addr).await {
                    Ok(stream) => break stream,
                    Err(_) => tokio::time::sleep(Duration::from_millis(20)).await,
                }
            };
            stream
                .write_all(b"GET /slow HTTP/1.1\r\nhost: localhost\r\nconnection: close\r\n\r\n")
                .await
                .unwrap();
            // Let the request reach the sleeping handler before signalling.
            tokio::time::sleep(Duration::from_millis(100)).await;

            (listening, stream)
        }

        // Delay shorter than the timeout: the in-flight response is
        // delivered and the drain completes cleanly.
        let port = free_port().await;
        let (listening, mut stream) =
            start_with_slow_request(&port, 5, Duration::from_millis(500)).await;
        send_sigterm();

        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();
        let response = String::from_utf8_lossy(&raw);
        assert!(response.contains("200 OK"), "response: {response}");
        assert!(response.contains(r#"{"done":true}"#), "response: {response}");

        let result = tokio::time::timeout(Duration::from_secs(10), listening)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());

        // Delay longer than the timeout: the drain gives up at the bound
        // and reports it.
        let port = free_port().await;
        let (listening, _stream) =
            start_with_slow_request(&port, 1, Duration::from_secs(30)).await;
        send_sigterm();

        let result = tokio::time::timeout(Duration::from_secs(10), listening)
            .await
            .unwrap()
            .unwrap();
        match result {
            Err(Error::ShutdownTimeout(bound)) => assert_eq!(bound, Duration::from_secs(1)),
            other => panic!("expected shutdown timeout, got {other:?}"),
        }
    }

    #[test]
    fn registration_is_append_only() {
        let handler = |_req: Request| async { Ok::<_, HandlerError>(Response::json("{}")) };
        let mw = |req: Request, next: Next| async move { next.call(req).await };

        let mut server = Server::new(cfg());
        server.add_routes(vec![Route::new("a", Method::GET, "/a", handler)]);
        server.add_routes(vec![
            Route::new("b", Method::GET, "/b", handler),
            Route::new("c", Method::POST, "/c", handler),
        ]);
        server.add_middleware(mw);

        assert_eq!(server.routes.len(), 3);
        assert_eq!(server.middlewares.len(), 1);
    }
}
