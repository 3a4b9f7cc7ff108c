//! Access token verification.

use log::debug;

use super::{AuthError, Claims, TokenKind, TokenRejection, TokenSigner};

/// Outcome of verifying an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Authentic and live.
    Valid(Claims),
    /// Authentic but past expiry. Carries the claims so the caller can
    /// attempt a refresh bound to the same subject.
    Expired(Claims),
    /// Malformed or forged. Terminal.
    Invalid(AuthError),
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verification::Valid(_))
    }
}

/// Stateless verifier for access tokens.
#[derive(Debug, Clone)]
pub struct AccessVerifier {
    signer: TokenSigner,
}

impl AccessVerifier {
    pub fn new(signer: TokenSigner) -> Self {
        debug_assert_eq!(signer.kind(), TokenKind::Access);
        Self { signer }
    }

    /// Verify `token` against the clock reading `now` (Unix seconds).
    ///
    /// Pure: the same token and instant always produce the same outcome.
    pub fn verify_at(&self, token: &str, now: i64) -> Verification {
        let claims = match self.signer.decode(token) {
            Ok(claims) => claims,
            Err(TokenRejection::Malformed) => {
                debug!("access token rejected: malformed");
                return Verification::Invalid(AuthError::MalformedToken);
            }
            Err(TokenRejection::BadSignature) => {
                debug!("access token rejected: bad signature");
                return Verification::Invalid(AuthError::SignatureInvalid);
            }
        };

        if claims.is_expired_at(now) {
            debug!("access token for {} expired at {}", claims.sub, claims.exp);
            Verification::Expired(claims)
        } else {
            Verification::Valid(claims)
        }
    }
}
