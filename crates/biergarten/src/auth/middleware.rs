//! Authentication gate.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{
        HeaderMap, HeaderName, HeaderValue, Request,
        header::AUTHORIZATION,
        request::Parts,
    },
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use log::debug;
use std::sync::Arc;

use crate::api::ApiError;

use super::{
    AccessVerifier, AuthConfig, AuthError, Claims, ConfigValidationError, IssuedToken, Reissuer,
    TokenKind, TokenSigner, Verification,
};

/// Request header carrying the access token. Also set on responses when the
/// token was regenerated.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Request header carrying the refresh token.
pub const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";

/// Extract a Bearer token from an Authorization header value.
fn bearer_token_from_header(header_value: &str) -> Result<&str, AuthError> {
    let mut parts = header_value.split_whitespace();
    let scheme = parts.next().ok_or(AuthError::MalformedToken)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedToken);
    }

    let token = parts.next().ok_or(AuthError::MalformedToken)?;

    if parts.next().is_some() {
        return Err(AuthError::MalformedToken);
    }

    Ok(token)
}

/// Read a non-empty header as a string. Non-UTF-8 values are malformed.
fn header_token(headers: &HeaderMap, name: &str) -> Result<Option<String>, AuthError> {
    match headers.get(name) {
        None => Ok(None),
        Some(value) => {
            let value = value.to_str().map_err(|_| AuthError::MalformedToken)?.trim();
            Ok((!value.is_empty()).then(|| value.to_string()))
        }
    }
}

/// Refresh token from `x-refresh-token`. An unreadable value is an invalid
/// refresh token, not a malformed access token.
fn refresh_token_from_headers(headers: &HeaderMap) -> Result<Option<String>, AuthError> {
    header_token(headers, REFRESH_TOKEN_HEADER).map_err(|_| AuthError::RefreshInvalid)
}

/// Access token from `x-access-token`, falling back to `Authorization: Bearer`.
fn access_token_from_headers(headers: &HeaderMap) -> Result<Option<String>, AuthError> {
    if let Some(token) = header_token(headers, ACCESS_TOKEN_HEADER)? {
        return Ok(Some(token));
    }

    match headers.get(AUTHORIZATION) {
        None => Ok(None),
        Some(value) => {
            let value = value.to_str().map_err(|_| AuthError::MalformedToken)?;
            bearer_token_from_header(value).map(|token| Some(token.to_string()))
        }
    }
}

struct AuthKeys {
    access: TokenSigner,
    refresh: TokenSigner,
    confirmation: TokenSigner,
    verifier: AccessVerifier,
    reissuer: Reissuer,
}

/// Authentication state shared across handlers.
///
/// Holds the signers for every token kind. Immutable after construction.
#[derive(Clone)]
pub struct AuthState {
    keys: Arc<AuthKeys>,
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("access_ttl_secs", &self.keys.access.ttl_secs())
            .field("refresh_ttl_secs", &self.keys.refresh.ttl_secs())
            .finish_non_exhaustive()
    }
}

/// Access and refresh token pair handed out at login and registration.
#[derive(Debug, Clone)]
pub struct SessionTokens {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

impl AuthState {
    /// Create auth state from config, resolving `env:` secrets.
    pub fn new(config: &AuthConfig) -> Result<Self, ConfigValidationError> {
        let secrets = config.resolve()?;

        let access = TokenSigner::new(
            TokenKind::Access,
            &secrets.access,
            config.ttl_for(TokenKind::Access),
        );
        let refresh = TokenSigner::new(
            TokenKind::Refresh,
            &secrets.refresh,
            config.ttl_for(TokenKind::Refresh),
        );
        let confirmation = TokenSigner::new(
            TokenKind::Confirmation,
            &secrets.confirmation,
            config.ttl_for(TokenKind::Confirmation),
        );

        let keys = AuthKeys {
            verifier: AccessVerifier::new(access.clone()),
            reissuer: Reissuer::new(refresh.clone(), access.clone()),
            access,
            refresh,
            confirmation,
        };

        Ok(Self {
            keys: Arc::new(keys),
        })
    }

    pub fn access_signer(&self) -> &TokenSigner {
        &self.keys.access
    }

    pub fn refresh_signer(&self) -> &TokenSigner {
        &self.keys.refresh
    }

    pub fn verifier(&self) -> &AccessVerifier {
        &self.keys.verifier
    }

    pub fn reissuer(&self) -> &Reissuer {
        &self.keys.reissuer
    }

    /// Mint an access and refresh token pair for `user_id`.
    pub fn issue_session(&self, user_id: &str) -> Result<SessionTokens, AuthError> {
        let now = Utc::now().timestamp();
        Ok(SessionTokens {
            access: self.keys.access.issue_at(user_id, now)?,
            refresh: self.keys.refresh.issue_at(user_id, now)?,
        })
    }

    /// Mint an account confirmation token for `user_id`.
    pub fn issue_confirmation(&self, user_id: &str) -> Result<IssuedToken, AuthError> {
        self.keys.confirmation.issue(user_id)
    }

    /// Check a confirmation token. Any failure yields `None`.
    pub fn check_confirmation_at(&self, token: &str, now: i64) -> Option<Claims> {
        let claims = self.keys.confirmation.decode(token).ok()?;
        (!claims.is_expired_at(now)).then_some(claims)
    }

    /// Run the gate against the current clock.
    pub fn authenticate(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Result<AuthContext, AuthError> {
        self.authenticate_at(access_token, refresh_token, Utc::now().timestamp())
    }

    /// Run the gate: verify the access token and, only if it is expired, make
    /// one reissue attempt with the refresh token.
    pub fn authenticate_at(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
        now: i64,
    ) -> Result<AuthContext, AuthError> {
        self.authenticate_with(access_token, || Ok(refresh_token.map(str::to_owned)), now)
    }

    /// Run the gate over request headers. `x-refresh-token` is only read when
    /// the access token turns out to be expired.
    pub fn authenticate_headers_at(
        &self,
        headers: &HeaderMap,
        now: i64,
    ) -> Result<AuthContext, AuthError> {
        let access_token = access_token_from_headers(headers)?;
        self.authenticate_with(
            access_token.as_deref(),
            || refresh_token_from_headers(headers),
            now,
        )
    }

    fn authenticate_with(
        &self,
        access_token: Option<&str>,
        refresh_token: impl FnOnce() -> Result<Option<String>, AuthError>,
        now: i64,
    ) -> Result<AuthContext, AuthError> {
        let access_token = access_token.ok_or(AuthError::MissingAccessToken)?;

        match self.keys.verifier.verify_at(access_token, now) {
            Verification::Valid(claims) => Ok(AuthContext::authenticated(claims.sub)),
            Verification::Invalid(err) => Err(err),
            Verification::Expired(expired) => {
                let refresh_token = refresh_token()?.ok_or(AuthError::MissingRefreshToken)?;
                let issued = self.keys.reissuer.reissue_at(&refresh_token, &expired, now)?;
                Ok(AuthContext::regenerated(issued))
            }
        }
    }
}

/// Per-request authentication result.
#[derive(Debug, Clone)]
pub struct AuthContext {
    user_id: String,
    regenerated: Option<IssuedToken>,
}

impl AuthContext {
    /// Authenticated with the presented access token.
    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            regenerated: None,
        }
    }

    /// Authenticated after a silent refresh.
    pub fn regenerated(issued: IssuedToken) -> Self {
        Self {
            user_id: issued.claims.sub.clone(),
            regenerated: Some(issued),
        }
    }

    /// Get the user ID.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn token_regenerated(&self) -> bool {
        self.regenerated.is_some()
    }

    /// The regenerated access token, if a silent refresh happened.
    pub fn new_access_token(&self) -> Option<&str> {
        self.regenerated.as_ref().map(|issued| issued.token.as_str())
    }

    /// Claims of the regenerated access token, if any.
    pub fn new_access_claims(&self) -> Option<&Claims> {
        self.regenerated.as_ref().map(|issued| &issued.claims)
    }
}

/// Extract the gate's result from request extensions.
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| AuthError::MissingAccessToken.into())
    }
}

/// Authentication middleware.
///
/// Injects `AuthContext` into request extensions. When the access token was
/// regenerated, the new token is also set on the response's
/// `x-access-token` header.
pub async fn auth_gate(
    State(auth): State<AuthState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx = auth
        .authenticate_headers_at(req.headers(), Utc::now().timestamp())
        .inspect_err(|err| debug!("request to {} rejected: {}", req.uri().path(), err))?;

    let new_token = ctx.new_access_token().map(str::to_owned);
    if new_token.is_some() {
        debug!("access token regenerated for {}", ctx.user_id());
    }
    req.extensions_mut().insert(ctx);

    let mut response = next.run(req).await;

    if let Some(token) = new_token
        && let Ok(value) = HeaderValue::from_str(&token)
    {
        response
            .headers_mut()
            .insert(HeaderName::from_static(ACCESS_TOKEN_HEADER), value);
    }

    Ok(response)
}
