use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::api::ErrorBody;

/// Message returned for every 500 so internals never reach the client.
pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Failure answering a `/api/query` request.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("No query provided")]
    EmptyQuery,

    #[error("Request body too large")]
    PayloadTooLarge,

    /// The model's reply did not contain a usable `SELECT` statement.
    #[error("{0}")]
    InvalidSql(String),

    #[error(transparent)]
    Model(#[from] anyhow::Error),
}

impl QueryError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::EmptyQuery | Self::InvalidSql(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Model(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text placed in the error body.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::EmptyQuery | Self::PayloadTooLarge | Self::InvalidSql(_) => self.to_string(),
            Self::Model(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Query failed");
        } else {
            tracing::warn!(error = %self, "Query rejected");
        }
        let body = ErrorBody {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}
