use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{error, info, instrument, warn};

use crate::gateway::{IRT_CACHE_HEADER, Resolution};
use crate::key::TestId;
use crate::payload::SubjectSource;
use crate::scoring::ScoringClient;
use crate::server::error::ServerError;
use crate::server::state::HandlerState;
use crate::store::Store;

/// `GET /v1/tests/{test_id}/scores`
#[instrument(skip(state), fields(cache = tracing::field::Empty))]
pub async fn scores_handler<S, C, D>(
    State(state): State<HandlerState<S, C, D>>,
    Path(test_id): Path<String>,
) -> Result<Response, ServerError>
where
    S: Store + 'static,
    C: ScoringClient + 'static,
    D: SubjectSource + 'static,
{
    let test_id = TestId::parse(&test_id)?;

    let resolution = state.gateway.resolve(&test_id).await.map_err(|e| {
        error!(test_id = %test_id, error = %e, "resolve failed");
        ServerError::from(e)
    })?;

    tracing::Span::current().record("cache", resolution.status.as_header_value());
    if let Some(ref failure) = resolution.write_failure {
        warn!(test_id = %test_id, reason = %failure, "served uncached scores");
    } else {
        info!(test_id = %test_id, status = %resolution.status, "served scores");
    }

    make_response(resolution)
}

pub(crate) fn make_response(resolution: Resolution) -> Result<Response, ServerError> {
    let status = resolution.status;
    let body = serde_json::to_value(resolution.into_response())
        .map_err(|e| ServerError::SerializationFailed(e.to_string()))?;

    let mut headers = HeaderMap::new();
    headers.insert(
        IRT_CACHE_HEADER,
        HeaderValue::from_static(status.as_header_value()),
    );
    Ok((StatusCode::OK, headers, Json(body)).into_response())
}
