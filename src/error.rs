use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

/// Every failure a request can end in. Each kind maps onto one HTTP status.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProxyError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Upstream timed out: {0}")]
    Timeout(String),

    #[error("Unsupported event shape: {0}")]
    UnsupportedShape(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Method {0} not allowed")]
    MethodNotAllowed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::NotFound(_) => StatusCode::NOT_FOUND,
            ProxyError::Upstream { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ProxyError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::UnsupportedShape(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ProxyError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProxyError::Timeout(err.to_string())
        } else if let Some(status) = err.status() {
            ProxyError::Upstream {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ProxyError::Internal(err.to_string())
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = json!({
            "success": false,
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ProxyError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ProxyError::UnsupportedShape("x".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ProxyError::MethodNotAllowed("POST".into()).status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(ProxyError::Timeout("x".into()).status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(ProxyError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ProxyError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_status_is_mirrored() {
        let err = ProxyError::Upstream { status: 503, message: "down".into() };
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        // A success code from upstream can't be mirrored as an error
        let err = ProxyError::Upstream { status: 200, message: "odd".into() };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
