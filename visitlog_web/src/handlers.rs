//! Request handlers.
//!
//! Store access is synchronous, so every handler that touches the visitor
//! log runs it on the blocking thread pool.

use crate::form;
use crate::pages;
use crate::response;
use crate::state::AppState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use std::sync::Arc;
use visitlog_core::{feed_json, Summary};

/// GET /
pub fn index() -> Response<Full<Bytes>> {
    response::html(StatusCode::OK, pages::index())
}

async fn load_summary(state: Arc<AppState>) -> Summary {
    let top_n = state.top_companies;
    match tokio::task::spawn_blocking(move || state.log.summary(top_n)).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(error = %e, "summary_task_failed");
            Summary::empty()
        }
    }
}

/// GET /dashboard
pub async fn dashboard(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let summary = load_summary(state).await;
    response::html(StatusCode::OK, pages::dashboard(&summary))
}

/// GET /estatisticas
pub async fn statistics(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let summary = load_summary(state).await;
    response::json(StatusCode::OK, &summary)
}

/// GET /registrar
pub fn registration_form() -> Response<Full<Bytes>> {
    response::html(StatusCode::OK, pages::registration(None))
}

/// POST /registrar
pub async fn register(body: Bytes, state: Arc<AppState>) -> Response<Full<Bytes>> {
    let text = String::from_utf8_lossy(&body);
    let fields = form::parse_urlencoded(&text);

    let event = match form::event_from_fields(&fields) {
        Ok(event) => event,
        Err(message) => {
            tracing::debug!(%message, "registration_rejected");
            return response::html(
                StatusCode::BAD_REQUEST,
                pages::registration(Some(&message)),
            );
        }
    };

    let result = tokio::task::spawn_blocking(move || state.log.register(&event)).await;
    match result {
        Ok(Ok(outcome)) => response::html(
            StatusCode::OK,
            pages::registration(Some(&outcome.to_string())),
        ),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "registration_failed");
            response::html(
                StatusCode::INTERNAL_SERVER_ERROR,
                pages::registration(Some(&format!("Unable to register: {}", e))),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "registration_task_failed");
            response::html(
                StatusCode::INTERNAL_SERVER_ERROR,
                pages::registration(Some("Unable to register")),
            )
        }
    }
}

/// GET /dados
///
/// Failures are reported in the payload as `{"error": ...}` with status 200.
pub async fn data_feed(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let latest_n = state.latest_records;
    let value = match tokio::task::spawn_blocking(move || feed_json(state.log.feed(latest_n))).await
    {
        Ok(value) => value,
        Err(e) => serde_json::json!({ "error": e.to_string() }),
    };
    response::json(StatusCode::OK, &value)
}
