//! HTTP error responses for the web adapter.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::domain::error::CoinwatchError;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<CoinwatchError> for WebError {
    fn from(err: CoinwatchError) -> Self {
        let status = match &err {
            CoinwatchError::ConfigParse { .. } | CoinwatchError::ConfigInvalid { .. } => {
                StatusCode::BAD_REQUEST
            }
            CoinwatchError::UnknownSymbol { .. } => StatusCode::NOT_FOUND,
            CoinwatchError::InvalidAlert { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            CoinwatchError::Quote { .. } => StatusCode::BAD_GATEWAY,
            CoinwatchError::Storage { .. } | CoinwatchError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}
