//! Static file serving under the `/static` prefix.
//!
//! The configured directory is resolved to an absolute path once, at mount
//! time. At request time the prefix is stripped, the remainder resolved
//! relative to that directory, and the file streamed back with a
//! content type inferred from its extension. Missing files — and anything
//! trying to escape the directory with `..` segments — answer 404.

use std::path::Path;

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;
use tracing::debug;

use crate::response::{error_json, ErrorResponse};

/// Fixed path prefix static files are mounted under.
pub(crate) const STATIC_PREFIX: &str = "/static";

/// Serves one file from `dir` for a request to `request_path`.
pub(crate) async fn serve(dir: &Path, request_path: &str) -> http::Response<Full<Bytes>> {
    let rel = request_path
        .strip_prefix(STATIC_PREFIX)
        .unwrap_or("")
        .trim_start_matches('/');

    // `dir` is canonicalized at mount time; rejecting parent segments keeps
    // every resolved path inside it.
    if rel.is_empty() || rel.split('/').any(|seg| seg == "..") {
        return not_found(request_path);
    }

    let file = dir.join(rel);
    match tokio::fs::read(&file).await {
        Ok(contents) => {
            let mut out = http::Response::new(Full::new(Bytes::from(contents)));
            *out.status_mut() = StatusCode::OK;
            out.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(content_type_for(rel)));
            out
        }
        Err(e) => {
            debug!(path = %file.display(), error = %e, "static file not served");
            not_found(request_path)
        }
    }
}

fn not_found(request_path: &str) -> http::Response<Full<Bytes>> {
    debug!(path = request_path, "static file not found");
    error_json(&ErrorResponse {
        code: StatusCode::NOT_FOUND.as_u16(),
        ..Default::default()
    })
}

fn content_type_for(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("pdf") => "application/pdf",
        Some("wasm") => "application/wasm",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn write_file(dir: &Path, name: &str, contents: &str) {
        tokio::fs::write(dir.join(name), contents).await.unwrap();
    }

    #[tokio::test]
    async fn serves_existing_file_with_content_type() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "style.css", "body {}").await;

        let res = serve(dir.path(), "/static/style.css").await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[CONTENT_TYPE], "text/css");
    }

    #[tokio::test]
    async fn missing_file_answers_404() {
        let dir = tempfile::tempdir().unwrap();
        let res = serve(dir.path(), "/static/nope.txt").await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn parent_segments_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let res = serve(dir.path(), "/static/../etc/passwd").await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn bare_prefix_answers_404() {
        let dir = tempfile::tempdir().unwrap();
        let res = serve(dir.path(), "/static").await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unknown_extension_is_octet_stream() {
        assert_eq!(content_type_for("data.bin2"), "application/octet-stream");
        assert_eq!(content_type_for("index.html"), "text/html; charset=utf-8");
    }
}
