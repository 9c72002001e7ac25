use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cp_core::Error;
use serde_json::json;
use tracing::{error, warn};

/// Handler error: a pipeline error rendered as `{"detail": ..}`.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            e if e.is_generation_failure() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self.0 {
            Error::NotFound(msg) => msg.clone(),
            other => other.to_string(),
        };
        if status.is_server_error() {
            error!(%status, error = %self.0, "Request failed");
        } else {
            warn!(%status, %detail, "Request rejected");
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
