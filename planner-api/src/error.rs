use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::store::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("missing or invalid credentials")]
    Unauthorized,

    /// Authentication rejected by the identity service; its message is
    /// forwarded verbatim.
    #[error("{0}")]
    AuthRejected(String),

    #[error("not found")]
    NotFound,

    #[error("upstream error: {0}")]
    Upstream(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound,
            StoreError::Request(message) | StoreError::Decode(message) => {
                ApiError::Upstream(message)
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Rejected(message) => ApiError::AuthRejected(message),
            AuthError::Transport(message) => ApiError::Upstream(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized | ApiError::AuthRejected(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };

        if status.is_server_error() {
            error!("{self}");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
