//! Mapping of pipeline errors onto HTTP responses

use crate::handlers::types::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use repolens_core::{ErrorKind, RepoLensError};

/// Pipeline error returned from a handler
#[derive(Debug)]
pub struct ApiError(pub RepoLensError);

impl From<RepoLensError> for ApiError {
    fn from(error: RepoLensError) -> Self {
        Self(error)
    }
}

/// HTTP status used for each error kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::TreeTruncated => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::UpstreamError => StatusCode::BAD_GATEWAY,
        ErrorKind::ConfigurationError | ErrorKind::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<&RepoLensError> for ErrorResponse {
    fn from(error: &RepoLensError) -> Self {
        Self {
            code: error.kind().as_str().to_string(),
            message: error.to_string(),
            status: error.status(),
            original_message: error.original_message().map(str::to_string),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.0.log();

        let status = status_for(self.0.kind());
        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}
