//! Token signing and decoding.

use std::fmt;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::{AuthError, Claims, TokenKind};

/// Why a token string failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    /// Not a well-formed JWT, or the claims don't match the expected shape.
    Malformed,
    /// Well-formed, but not signed with this signer's secret and algorithm.
    BadSignature,
}

/// A freshly minted token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// HS256 signer for one token kind.
///
/// Decoding checks format and signature only. Expiry is left to the caller so
/// that an expired-but-authentic token can still be told apart from a forged
/// one.
#[derive(Clone)]
pub struct TokenSigner {
    kind: TokenKind,
    ttl_secs: i64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    /// Create a signer for `kind` from a shared secret.
    pub fn new(kind: TokenKind, secret: &str, ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.required_spec_claims = ["exp", "sub"].into_iter().map(String::from).collect();

        Self {
            kind,
            ttl_secs,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Mint a token for `subject` issued now.
    pub fn issue(&self, subject: &str) -> Result<IssuedToken, AuthError> {
        self.issue_at(subject, Utc::now().timestamp())
    }

    /// Mint a token for `subject` issued at `now` (Unix seconds).
    pub fn issue_at(&self, subject: &str, now: i64) -> Result<IssuedToken, AuthError> {
        if now.checked_add(self.ttl_secs).is_none() {
            return Err(AuthError::Internal(format!(
                "{} token expiry overflows",
                self.kind
            )));
        }
        let claims = Claims::new(subject, now, self.ttl_secs);
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("signing {} token: {e}", self.kind)))?;

        Ok(IssuedToken { token, claims })
    }

    /// Decode `token`, checking its format and signature but not its expiry.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenRejection> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenRejection::BadSignature
                }
                _ => TokenRejection::Malformed,
            })
    }
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("kind", &self.kind)
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}
