//! Built-in health-check handler.
//!
//! Mounted automatically at `GET /health` with middleware bypassed, so
//! orchestrator probes are never gated by caller-supplied authentication or
//! logging policy. If the process can answer HTTP at all, it is healthy —
//! this handler intentionally has no dependencies.

use http::StatusCode;

use crate::error::HandlerError;
use crate::request::Request;
use crate::response::Response;

/// Always answers `200 OK` with body `ok`.
pub(crate) async fn health_check(_req: Request) -> Result<Response, HandlerError> {
    Ok(Response {
        status_code: StatusCode::OK.as_u16(),
        headers: Vec::new(),
        body: "ok".to_owned(),
    })
}
