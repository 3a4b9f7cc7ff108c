//! JWT claims and token kinds.

use serde::{Deserialize, Serialize};

/// The three kinds of signed tokens the service mints.
///
/// Each kind is signed with its own secret, so a token of one kind never
/// verifies as another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Short-lived credential presented on every protected request.
    Access,
    /// Longer-lived credential used to mint new access tokens.
    Refresh,
    /// Credential embedded in account confirmation links.
    Confirmation,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
            TokenKind::Confirmation => write!(f, "confirmation"),
        }
    }
}

/// JWT claims structure shared by every token kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,

    /// Issued at (as Unix timestamp).
    pub iat: i64,

    /// Expiration time (as Unix timestamp).
    pub exp: i64,
}

impl Claims {
    /// Build claims for `subject`, issued at `now` and valid for `ttl_secs`.
    pub fn new(subject: impl Into<String>, now: i64, ttl_secs: i64) -> Self {
        Self {
            sub: subject.into(),
            iat: now,
            exp: now + ttl_secs,
        }
    }

    /// Get the subject (user ID).
    pub fn subject(&self) -> &str {
        &self.sub
    }

    /// A token is live strictly before its expiry instant.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }
}
