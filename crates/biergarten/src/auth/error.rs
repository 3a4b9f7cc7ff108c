//! Authentication errors.

use axum::http::StatusCode;
use thiserror::Error;

/// Authentication errors.
///
/// `AccessExpired` is the only recoverable kind: the gate answers it with a
/// single refresh attempt. Everything else ends the request. The gate itself
/// sees an expired token as `Verification::Expired` and never returns
/// `AccessExpired`; the variant keeps the set of auth failures closed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No access token on the request.
    #[error("no access token provided")]
    MissingAccessToken,

    /// Access token is not a well-formed JWT.
    #[error("invalid access token: malformed")]
    MalformedToken,

    /// Access token signature does not verify.
    #[error("invalid access token: bad signature")]
    SignatureInvalid,

    /// Access token is authentic but past its expiry.
    #[error("access token expired")]
    AccessExpired,

    /// Access token expired and no refresh token was sent.
    #[error("access token expired and no refresh token was provided")]
    MissingRefreshToken,

    /// Refresh token is malformed or its signature does not verify.
    #[error("access token expired and the refresh token is invalid")]
    RefreshInvalid,

    /// Refresh token is authentic but past its expiry.
    #[error("access token expired and the refresh token has also expired")]
    RefreshExpired,

    /// Refresh token was issued to a different subject than the access token.
    #[error("refresh token does not belong to the access token's subject")]
    SubjectMismatch,

    /// Internal error.
    #[error("internal auth error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Whether the gate may try to recover from this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AuthError::AccessExpired)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}
