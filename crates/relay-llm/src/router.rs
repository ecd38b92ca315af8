//! Axum surface exposing the handler over HTTP

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use http::StatusCode;
use http::header::{HeaderName, HeaderValue};
use relay_config::RelayConfig;

use crate::handler::handle_event;
use crate::invoker::ModelInvoker;
use crate::types::InvocationResponse;

/// Shared state for the relay routes
#[derive(Clone)]
pub struct RelayState {
    /// Provider handle, built once and reused across invocations
    pub invoker: Arc<dyn ModelInvoker>,
    /// Resolved configuration
    pub config: Arc<RelayConfig>,
}

/// Build the relay router
pub fn relay_router(state: RelayState) -> Router {
    Router::new()
        .route("/invoke", routing::post(invoke))
        .route("/healthz", routing::get(healthz))
        .with_state(state)
}

/// Handle `POST /invoke`
async fn invoke(State(state): State<RelayState>, Json(event): Json<serde_json::Value>) -> Response {
    let envelope = handle_event(state.invoker.as_ref(), &state.config, event).await;
    envelope_response(envelope)
}

/// Handle `GET /healthz`
async fn healthz() -> &'static str {
    "ok"
}

/// Map the invocation envelope onto a real HTTP response
fn envelope_response(envelope: InvocationResponse) -> Response {
    let status = StatusCode::from_u16(envelope.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, envelope.body).into_response();

    for (name, value) in &envelope.headers {
        if let (Ok(name), Ok(value)) = (HeaderName::try_from(*name), HeaderValue::try_from(*value)) {
            response.headers_mut().insert(name, value);
        }
    }

    response
}
