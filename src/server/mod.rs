//! HTTP surface (Axum) over the cache-aside gateway.
//!
//! Used by the `irt-gateway` binary.

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;

pub use error::{ErrorResponse, ServerError};
pub use handler::scores_handler;
pub use state::HandlerState;

use crate::gateway::{
    IRT_STATUS_ERROR, IRT_STATUS_HEADER, IRT_STATUS_HEALTHY, IRT_STATUS_NOT_READY,
    IRT_STATUS_READY,
};
use crate::payload::SubjectSource;
use crate::scoring::ScoringClient;
use crate::store::Store;

pub fn create_router_with_state<S, C, D>(state: HandlerState<S, C, D>) -> Router
where
    S: Store + 'static,
    C: ScoringClient + 'static,
    D: SubjectSource + 'static,
{
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler::<S, C, D>))
        .route("/v1/tests/{test_id}/scores", get(scores_handler::<S, C, D>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub store: &'static str,
    pub store_backend: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        IRT_STATUS_HEADER,
        HeaderValue::from_static(IRT_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler<S, C, D>(State(state): State<HandlerState<S, C, D>>) -> Response
where
    S: Store + 'static,
    C: ScoringClient + 'static,
    D: SubjectSource + 'static,
{
    let store_status = match state.gateway.ping().await {
        Ok(()) => IRT_STATUS_READY,
        Err(e) => {
            tracing::warn!(error = %e, "store ping failed");
            IRT_STATUS_ERROR
        }
    };

    let components = ComponentStatus {
        http: IRT_STATUS_READY,
        store: store_status,
        store_backend: state.store_backend,
    };

    let is_ready = components.store == IRT_STATUS_READY;
    let (status_code, status_msg) = if is_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, IRT_STATUS_NOT_READY)
    };

    let mut headers = HeaderMap::new();
    headers.insert(IRT_STATUS_HEADER, HeaderValue::from_static(status_msg));

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}
