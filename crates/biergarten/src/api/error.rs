//! Unified API error handling with structured responses.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::auth::AuthError;
use crate::user::UserError;
use crate::validation::{FieldError, ValidationErrors};

/// API error type with structured responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Validation failed")]
    Validation(ValidationErrors),

    #[error("I'm a teapot!")]
    Teapot,

    #[error("{0}")]
    Internal(String),
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Teapot => StatusCode::IM_A_TEAPOT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error envelope.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            ApiError::Internal(detail) => {
                error!(detail = %detail, "API error");
                ErrorResponse {
                    message: "Internal server error".to_string(),
                    status: status.as_u16(),
                    errors: None,
                }
            }
            ApiError::Validation(errors) => {
                debug!(%errors, "Validation error");
                ErrorResponse {
                    message: "Validation failed".to_string(),
                    status: status.as_u16(),
                    errors: Some(errors.0),
                }
            }
            other => {
                let message = other.to_string();
                debug!(status = status.as_u16(), message = %message, "Client error");
                ErrorResponse {
                    message,
                    status: status.as_u16(),
                    errors: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Internal(msg) => Self::Internal(msg),
            other => Self::Unauthorized(other.to_string()),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Validation(errors) => Self::Validation(errors),
            UserError::UsernameTaken(_) | UserError::EmailTaken(_) => Self::Conflict(err.to_string()),
            UserError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            UserError::AlreadyConfirmed | UserError::InvalidLink => {
                Self::BadRequest(err.to_string())
            }
            UserError::Internal(inner) => inner.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FieldErrorKind;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::forbidden("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::Teapot.status_code(), StatusCode::IM_A_TEAPOT);
        assert_eq!(
            ApiError::Validation(ValidationErrors(vec![])).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_user_error_mapping() {
        assert!(matches!(
            ApiError::from(UserError::UsernameTaken("a".into())),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(UserError::InvalidCredentials),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(UserError::AlreadyConfirmed),
            ApiError::BadRequest(msg) if msg == "Account is already confirmed"
        ));
        assert!(matches!(
            ApiError::from(UserError::Internal(anyhow::anyhow!("db gone"))),
            ApiError::Internal(_)
        ));
    }

    #[test]
    fn test_auth_error_mapping() {
        assert!(matches!(
            ApiError::from(AuthError::SubjectMismatch),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(AuthError::Internal("x".into())),
            ApiError::Internal(_)
        ));
    }

    #[tokio::test]
    async fn test_validation_envelope() {
        let err = ApiError::Validation(ValidationErrors(vec![FieldError::new(
            "name",
            FieldErrorKind::Required,
        )]));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["message"], "Validation failed");
        assert_eq!(json["status"], 400);
        assert_eq!(json["errors"][0]["field"], "name");
        assert_eq!(json["errors"][0]["kind"], "required");
    }

    #[tokio::test]
    async fn test_auth_internal_detail_is_not_leaked() {
        let response = ApiError::from(AuthError::Internal("pool detail".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Internal server error");

        let response = ApiError::from(AuthError::RefreshExpired).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(
            json["message"],
            "access token expired and the refresh token has also expired"
        );
        assert_eq!(json["status"], 401);
    }

    #[tokio::test]
    async fn test_internal_detail_is_not_leaked() {
        let response = ApiError::internal("connection pool exhausted").into_response();
        let json = body_json(response).await;
        assert_eq!(json["message"], "Internal server error");
        assert_eq!(json["status"], 500);
        assert!(json.get("errors").is_none());
    }
}
