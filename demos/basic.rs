//! Minimal plinth example — CRUD-style JSON endpoints behind a middleware.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/health
//!   curl http://localhost:3000/users/42
//!   curl -X POST http://localhost:3000/users \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"alice"}'

use plinth::{middleware, Config, DomainError, HandlerError, Method, Request, Response, Route, Server};

#[tokio::main]
async fn main() -> Result<(), plinth::Error> {
    let config = Config {
        port: "3000".to_owned(),
        timeout_secs: 30,
        static_dir: None,
        debug: false,
    };
    plinth::logging::init(config.debug);

    let mut server = Server::new(config);
    server.add_middleware(middleware::log_requests);
    server.add_routes([
        Route::new("getUser", Method::GET, "/users/{id}", get_user),
        Route::new("createUser", Method::POST, "/users", create_user),
    ]);

    server.listen().await
}

// GET /users/{id}
async fn get_user(req: Request) -> Result<Response, HandlerError> {
    let Some(id) = req.param("id") else {
        return Err(DomainError::required_args(&["id"]).into());
    };
    Ok(Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#)))
}

// POST /users
async fn create_user(req: Request) -> Result<Response, HandlerError> {
    if req.body().is_empty() {
        return Err(DomainError::required_args(&["body"]).into());
    }

    // Real app: parse with serde_json::from_slice and persist.
    let mut res = Response::json(r#"{"id":"99","name":"new_user"}"#);
    res.status_code = 201;
    Ok(res.header("location", "/users/99"))
}
