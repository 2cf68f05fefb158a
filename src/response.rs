//! Outgoing response types and the transport writers.
//!
//! Handlers build a [`Response`]; the dispatch layer turns it (or an
//! [`ErrorResponse`]) into the transport-level `http::Response`. The body is
//! a finished string — typically JSON, but the writer never re-encodes it.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;
use serde::Serialize;
use tracing::warn;

/// The response half of the application-handler contract.
///
/// Fields are plain data by design: handlers fill them in, the writer does
/// the rest. `Content-Type: application/json` is assumed unless `headers`
/// overrides it.
#[derive(Debug, Default)]
pub struct Response {
    /// Any valid HTTP status code.
    pub status_code: u16,

    /// Custom headers. Entries override defaults, including `Content-Type`.
    pub headers: Vec<(String, String)>,

    /// The finished body, written verbatim.
    pub body: String,
}

impl Response {
    /// A bodyless response with the given status.
    pub fn status(status_code: u16) -> Self {
        Self { status_code, ..Self::default() }
    }

    /// A `200 OK` response with the given (already serialized) JSON body.
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Appends a custom header. Returns `self` so calls chain.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Client-visible error body. Empty optional fields are omitted from the
/// JSON, so an opaque failure serializes as just `{"code":500}`.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct ErrorResponse {
    /// HTTP status code, repeated in the body.
    #[serde(skip_serializing_if = "code_is_zero")]
    pub code: u16,

    /// Stable error kind tag, e.g. `REQUIRED_ARGUMENT`.
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,

    /// Client-safe description of the failure.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
}

fn code_is_zero(code: &u16) -> bool {
    *code == 0
}

// ── Writers ───────────────────────────────────────────────────────────────────

/// Writes a handler response to the transport.
///
/// Sets `Content-Type: application/json` as the default, then applies every
/// custom header — a custom `Content-Type` replaces the default. The body
/// goes out verbatim.
pub(crate) fn respond_json(res: &Response) -> http::Response<Full<Bytes>> {
    let mut out = http::Response::new(Full::new(Bytes::from(res.body.clone())));
    *out.status_mut() = status_or_500(res.status_code);

    let headers = out.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, value) in &res.headers {
        let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) else {
            warn!(header = %name, "dropping invalid response header");
            continue;
        };
        headers.insert(name, value);
    }

    out
}

/// Writes a structured error body to the transport.
///
/// `Content-Type` is always `application/json` here; the status comes from
/// the error's code.
pub(crate) fn error_json(err: &ErrorResponse) -> http::Response<Full<Bytes>> {
    let body = serde_json::to_vec(err).unwrap_or_else(|_| br#"{"code":500}"#.to_vec());

    let mut out = http::Response::new(Full::new(Bytes::from(body)));
    *out.status_mut() = status_or_500(err.code);
    out.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    out
}

fn status_or_500(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_string(res: http::Response<Full<Bytes>>) -> String {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn json_body_with_default_content_type() {
        let out = respond_json(&Response::json(r#"{"test":"hello"}"#));

        assert_eq!(out.status(), StatusCode::OK);
        assert_eq!(out.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body_string(out).await, r#"{"test":"hello"}"#);
    }

    #[tokio::test]
    async fn custom_header_replaces_default_content_type() {
        let res = Response::json("id,name").header("Content-Type", "text/csv");
        let out = respond_json(&res);

        assert_eq!(out.headers()[CONTENT_TYPE], "text/csv");
        assert_eq!(body_string(out).await, "id,name");
    }

    #[tokio::test]
    async fn extra_headers_are_applied() {
        let res = Response::status(301).header("Location", "https://example.com");
        let out = respond_json(&res);

        assert_eq!(out.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(out.headers()["location"], "https://example.com");
    }

    #[tokio::test]
    async fn error_body_includes_all_fields() {
        let out = error_json(&ErrorResponse {
            code: 500,
            kind: String::new(),
            message: "some random error".to_owned(),
        });

        assert_eq!(out.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(out.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(
            body_string(out).await,
            r#"{"code":500,"message":"some random error"}"#
        );
    }

    #[tokio::test]
    async fn error_body_omits_empty_fields() {
        let out = error_json(&ErrorResponse { code: 500, ..Default::default() });
        assert_eq!(body_string(out).await, r#"{"code":500}"#);
    }

    #[test]
    fn invalid_status_code_falls_back_to_500() {
        assert_eq!(status_or_500(42), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
