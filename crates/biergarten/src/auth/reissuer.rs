//! Access token reissue from a refresh token.

use log::{debug, warn};

use super::{AuthError, Claims, IssuedToken, TokenKind, TokenSigner};

/// Mints a new access token from a refresh token bound to the same subject.
///
/// The refresh token is never rotated or revoked here.
#[derive(Debug, Clone)]
pub struct Reissuer {
    refresh: TokenSigner,
    access: TokenSigner,
}

impl Reissuer {
    pub fn new(refresh: TokenSigner, access: TokenSigner) -> Self {
        debug_assert_eq!(refresh.kind(), TokenKind::Refresh);
        debug_assert_eq!(access.kind(), TokenKind::Access);
        Self { refresh, access }
    }

    /// Reissue an access token for the subject of `expired`.
    ///
    /// Check order: refresh signature, then subject binding, then refresh
    /// expiry. A subject mismatch on any authentic refresh token is reported
    /// as `SubjectMismatch` even when that refresh token has also expired.
    pub fn reissue_at(
        &self,
        refresh_token: &str,
        expired: &Claims,
        now: i64,
    ) -> Result<IssuedToken, AuthError> {
        let refresh_claims = self.refresh.decode(refresh_token).map_err(|rejection| {
            debug!("refresh token rejected: {rejection:?}");
            AuthError::RefreshInvalid
        })?;

        if refresh_claims.sub != expired.sub {
            warn!(
                "refresh token subject {} does not match access token subject {}",
                refresh_claims.sub, expired.sub
            );
            return Err(AuthError::SubjectMismatch);
        }

        if refresh_claims.is_expired_at(now) {
            debug!(
                "refresh token for {} expired at {}",
                refresh_claims.sub, refresh_claims.exp
            );
            return Err(AuthError::RefreshExpired);
        }

        let issued = self.access.issue_at(&expired.sub, now)?;
        debug!("reissued access token for {}", issued.claims.sub);
        Ok(issued)
    }
}
