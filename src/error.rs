use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Error taxonomy shared by every engine adapter and the pipeline.
///
/// Adapters return one of these once; upper layers propagate without
/// re-wrapping. The HTTP mapping lives in the `IntoResponse` impl so
/// handlers can use `?` directly.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Bad request-level input: unsupported format, unknown engine,
    /// out-of-range parameter.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The selected backend cannot be constructed: missing model file,
    /// missing credentials, feature not compiled in.
    #[error("engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The adapter call itself failed: remote quota, remote permission,
    /// local synthesis error.
    #[error("upstream failure: {0}")]
    UpstreamFailure(String),

    /// Requested artifact does not exist or was already swept.
    #[error("not found: {0}")]
    NotFound(String),

    /// Local I/O or encoding failure after synthesis succeeded.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EngineError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            EngineError::EngineUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            EngineError::UpstreamFailure(_) => StatusCode::BAD_GATEWAY,
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            EngineError::InvalidArgument("bad format".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            EngineError::EngineUnavailable("no model".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            EngineError::UpstreamFailure("quota".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            EngineError::NotFound("gone".into()).status_code(),
            StatusCode::NOT_FOUND
        );
    }
}
