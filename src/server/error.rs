//! Error-to-HTTP response conversion for the JSON endpoint.
//!
//! Implements `From<Error>` so that `/random` can use `?` on client and
//! selector results directly.

use crate::error::Error;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub const UPSTREAM_MESSAGE: &str = "Cannot reach Jellyfin server";
pub const NO_MOVIES_MESSAGE: &str = "No movies found in this library";
pub const INTERNAL_MESSAGE: &str = "Error retrieving movie";

/// A status plus the message shown to the browser. Server errors are logged
/// with their cause, which is never sent.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let (status, message) = match &error {
            Error::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::NoMovies => (StatusCode::INTERNAL_SERVER_ERROR, NO_MOVIES_MESSAGE.to_string()),
            e if e.is_upstream() => (StatusCode::INTERNAL_SERVER_ERROR, UPSTREAM_MESSAGE.to_string()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string()),
        };

        if status.is_server_error() {
            tracing::error!(status = %status, error = %error, "{}", message);
        } else {
            tracing::debug!(status = %status, "{}", message);
        }

        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
