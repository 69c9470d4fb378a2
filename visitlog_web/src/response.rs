//! Response builders for the web front end.

use bytes::Bytes;
use http_body_util::Full;
use hyper::http::header::{self, HeaderValue};
use hyper::{Response, StatusCode};
use serde::Serialize;

fn build(status: StatusCode, content_type: &'static str, body: String) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

/// Build an HTML response with status code.
pub fn html(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    build(status, "text/html; charset=utf-8", body)
}

/// Build a JSON response with status code.
pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_string(body) {
        Ok(json) => build(status, "application/json", json),
        Err(e) => {
            let fallback = serde_json::json!({ "error": format!("Serialization error: {}", e) });
            build(
                StatusCode::INTERNAL_SERVER_ERROR,
                "application/json",
                fallback.to_string(),
            )
        }
    }
}

/// Build a 404 Not Found response.
pub fn not_found() -> Response<Full<Bytes>> {
    build(
        StatusCode::NOT_FOUND,
        "text/plain; charset=utf-8",
        "Not found".into(),
    )
}
