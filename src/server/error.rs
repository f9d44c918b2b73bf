use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::gateway::{ErrorKind, GatewayError, IRT_STATUS_ERROR, IRT_STATUS_HEADER};
use crate::key::InvalidTestId;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] InvalidTestId),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("serialization failed: {0}")]
    SerializationFailed(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Gateway(e) => match e.kind() {
                ErrorKind::DataUnavailable => StatusCode::NOT_FOUND,
                ErrorKind::TransportError
                | ErrorKind::ProtocolError
                | ErrorKind::RemoteRejected => StatusCode::BAD_GATEWAY,
            },
            ServerError::SerializationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let mut headers = HeaderMap::new();
        headers.insert(IRT_STATUS_HEADER, HeaderValue::from_static(IRT_STATUS_ERROR));

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
