// src/http/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failures the HTTP layer reports on its own.
///
/// Missing files are not in here: absence is an empty `ETag`, and the 404 comes
/// from the file-serving service.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Path is outside root directory")]
    PathTraversal,

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = match &self {
            RequestError::PathTraversal => StatusCode::FORBIDDEN,
            RequestError::InvalidPath(_) => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}
