//! Request routing for the web front end.
//!
//! Routes requests to appropriate handlers based on method and path.

use crate::handlers;
use crate::response;
use crate::state::AppState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Method, Response};
use std::sync::Arc;

/// Route a request whose body has already been collected.
pub async fn route(
    method: &Method,
    path: &str,
    body: Bytes,
    state: Arc<AppState>,
) -> Response<Full<Bytes>> {
    tracing::debug!(method = %method, path = %path, "Routing request");

    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    match (method, path) {
        (&Method::GET, "/") => handlers::index(),
        (&Method::GET, "/dashboard") => handlers::dashboard(state).await,
        (&Method::GET, "/registrar") => handlers::registration_form(),
        (&Method::POST, "/registrar") => handlers::register(body, state).await,
        (&Method::GET, "/dados") => handlers::data_feed(state).await,
        (&Method::GET, "/estatisticas") => handlers::statistics(state).await,
        _ => response::not_found(),
    }
}
