//! Authentication module.
//!
//! Stateless JWT authentication with silent refresh:
//! - access tokens are verified on every protected request
//! - an expired access token is reissued once from a refresh token bound to
//!   the same subject
//! - confirmation tokens back the account confirmation links

mod claims;
mod config;
mod error;
mod middleware;
mod reissuer;
mod tokens;
mod verifier;

pub use claims::{Claims, TokenKind};
pub use config::{
    AuthConfig, ConfigValidationError, MAX_TTL_SECS, MIN_SECRET_LEN, ResolvedSecrets,
};
pub use error::AuthError;
pub use middleware::{
    ACCESS_TOKEN_HEADER, AuthContext, AuthState, REFRESH_TOKEN_HEADER, SessionTokens, auth_gate,
};
pub use reissuer::Reissuer;
pub use tokens::{IssuedToken, TokenRejection, TokenSigner};
pub use verifier::{AccessVerifier, Verification};
