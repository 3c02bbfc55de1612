//! Wire types shared by the widget and the server.

use serde::{Deserialize, Serialize};

/// Path of the query endpoint, relative to the page origin.
pub const QUERY_PATH: &str = "/api/query";

/// Request body for `POST /api/query`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The user's question.
    pub query: String,
}

/// Successful response from `POST /api/query`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Formatted answer. Blank-line separated parts render as separate sections.
    pub response: String,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
}
