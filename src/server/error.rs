//! Response envelopes and the API error type.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::messages::{Locale, Message};
use crate::application::services::QueryFailure;
use crate::application::ErrorKind;
use crate::domain::NodeView;

/// Body of every node endpoint response.
///
/// ```json
/// { "nodes": [...], "error": "...", "message": "..." }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodesEnvelope {
    pub nodes: Vec<NodeView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl NodesEnvelope {
    pub fn ok(nodes: Vec<NodeView>) -> Self {
        Self {
            nodes,
            error: None,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    nodes: Option<Vec<NodeView>>,
    error: String,
}

/// Failure rendered as `{"nodes": [], "error": ...}` on node endpoints and
/// `{"error": ...}` on auth endpoints.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    /// Error on a node endpoint: carries an empty node list.
    pub fn nodes(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                nodes: Some(Vec::new()),
                error: message.into(),
            },
        }
    }

    /// Error on an auth endpoint: message only.
    pub fn plain(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                nodes: None,
                error: message.into(),
            },
        }
    }

    pub fn unauthorized(locale: Locale) -> Self {
        Self::plain(
            StatusCode::UNAUTHORIZED,
            Message::NotAuthenticated.render(locale),
        )
    }

    pub fn internal(locale: Locale) -> Self {
        Self::nodes(StatusCode::BAD_REQUEST, Message::Unexpected.render(locale))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<QueryFailure> for ApiError {
    fn from(failure: QueryFailure) -> Self {
        match failure.kind {
            ErrorKind::Unauthorized => Self::plain(StatusCode::UNAUTHORIZED, failure.message),
            _ => Self::nodes(StatusCode::BAD_REQUEST, failure.message),
        }
    }
}
