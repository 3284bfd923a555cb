//! Error taxonomy for resource operations.
//!
//! Every variant maps to a well-formed HTTP response; nothing here is fatal
//! to the server or to other handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors produced while resolving or applying a resource operation.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The handler id is not present in the registry.
    #[error("handler not found: {0}")]
    HandlerNotFound(String),

    /// The handler exists but the named sub-resource does not.
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// A write-side value could not be parsed into the required shape.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// I/O failure while copying a body or stream.
    #[error("transport failure: {0}")]
    Transport(#[from] std::io::Error),
}

impl ResourceError {
    pub(crate) fn not_found(kind: &str, name: &str) -> Self {
        Self::ResourceNotFound(format!("{kind} {name}"))
    }

    /// HTTP status reported to the external process.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::HandlerNotFound(_) | Self::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            Self::MalformedInput(_) => StatusCode::BAD_REQUEST,
            Self::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::HandlerNotFound(_) => "handler_not_found",
            Self::ResourceNotFound(_) => "resource_not_found",
            Self::MalformedInput(_) => "malformed_input",
            Self::Transport(_) => "transport_failure",
        }
    }
}

impl IntoResponse for ResourceError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Result type for resource operations.
pub type ResourceResult<T> = Result<T, ResourceError>;
