use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use linkhub_core::errors::LinkHubError;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Error shape surfaced to API callers. Public callers only ever observe a
/// generic 404 or 200; owner endpoints additionally see 400/401/403/409.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request<M: Into<String>>(message: M) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized<M: Into<String>>(message: M) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn forbidden<M: Into<String>>(message: M) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    pub fn not_found<M: Into<String>>(message: M) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn conflict<M: Into<String>>(message: M) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "message": self.message }));
        (self.status, body).into_response()
    }
}

impl From<LinkHubError> for ApiError {
    fn from(err: LinkHubError) -> Self {
        match err {
            LinkHubError::HubNotFound(_) => ApiError::not_found("hub not found"),
            LinkHubError::LinkNotFound(_) => ApiError::not_found("link not found"),
            LinkHubError::UserNotFound(_) => ApiError::not_found("user not found"),
            LinkHubError::InvalidCredentials => ApiError::unauthorized("invalid credentials"),
            LinkHubError::Forbidden(message) => ApiError::forbidden(message),
            LinkHubError::ValidationError(message) => ApiError::bad_request(message),
            LinkHubError::Conflict(message) => ApiError::conflict(message),
            other => {
                // Evaluation/persistence internals stay invisible to callers.
                error!(error = %other, "internal error while handling request");
                ApiError::internal("internal server error")
            }
        }
    }
}
