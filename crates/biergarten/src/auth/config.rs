//! Authentication configuration.

use serde::{Deserialize, Serialize};

use super::TokenKind;

/// Minimum secret length accepted for HS256 signing.
pub const MIN_SECRET_LEN: usize = 32;

/// Longest token lifetime accepted, ten years.
pub const MAX_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Authentication configuration.
///
/// Every secret accepts either a literal value or `env:VAR_NAME`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Secret for access tokens.
    pub access_token_secret: Option<String>,

    /// Secret for refresh tokens. Must differ from the access secret.
    pub refresh_token_secret: Option<String>,

    /// Secret for account confirmation links.
    pub confirmation_token_secret: Option<String>,

    /// Access token lifetime in seconds.
    pub access_token_ttl_secs: i64,

    /// Refresh token lifetime in seconds.
    pub refresh_token_ttl_secs: i64,

    /// Confirmation link lifetime in seconds.
    pub confirmation_token_ttl_secs: i64,

    /// bcrypt work factor for password hashes.
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // No default secrets - must be explicitly configured
            access_token_secret: None,
            refresh_token_secret: None,
            confirmation_token_secret: None,
            access_token_ttl_secs: 15 * 60,
            refresh_token_ttl_secs: 7 * 24 * 60 * 60,
            confirmation_token_ttl_secs: 24 * 60 * 60,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// Secrets after `env:` expansion, ready to build signers from.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedSecrets {
    pub access: String,
    pub refresh: String,
    pub confirmation: String,
}

impl std::fmt::Debug for ResolvedSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ResolvedSecrets { .. }")
    }
}

impl AuthConfig {
    /// Build a config with literal secrets and default lifetimes.
    pub fn with_secrets(
        access: impl Into<String>,
        refresh: impl Into<String>,
        confirmation: impl Into<String>,
    ) -> Self {
        Self {
            access_token_secret: Some(access.into()),
            refresh_token_secret: Some(refresh.into()),
            confirmation_token_secret: Some(confirmation.into()),
            ..Self::default()
        }
    }

    fn secret_for(&self, kind: TokenKind) -> Option<&String> {
        match kind {
            TokenKind::Access => self.access_token_secret.as_ref(),
            TokenKind::Refresh => self.refresh_token_secret.as_ref(),
            TokenKind::Confirmation => self.confirmation_token_secret.as_ref(),
        }
    }

    /// Lifetime of tokens of `kind`, in seconds.
    pub fn ttl_for(&self, kind: TokenKind) -> i64 {
        match kind {
            TokenKind::Access => self.access_token_ttl_secs,
            TokenKind::Refresh => self.refresh_token_ttl_secs,
            TokenKind::Confirmation => self.confirmation_token_ttl_secs,
        }
    }

    /// Resolve the secret for `kind`, expanding `env:VAR_NAME` syntax.
    pub fn resolve_secret(&self, kind: TokenKind) -> Result<String, ConfigValidationError> {
        let value = self
            .secret_for(kind)
            .ok_or(ConfigValidationError::MissingSecret(kind))?;

        let secret = match value.strip_prefix("env:") {
            Some(var_name) => match std::env::var(var_name) {
                Ok(secret) if !secret.is_empty() => secret,
                Ok(_) => return Err(ConfigValidationError::EnvVarEmpty(var_name.to_string())),
                Err(_) => return Err(ConfigValidationError::EnvVarNotFound(var_name.to_string())),
            },
            None => value.clone(),
        };

        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigValidationError::SecretTooShort(kind));
        }

        Ok(secret)
    }

    /// Validate the configuration and resolve all secrets.
    pub fn resolve(&self) -> Result<ResolvedSecrets, ConfigValidationError> {
        for kind in [TokenKind::Access, TokenKind::Refresh, TokenKind::Confirmation] {
            if self.ttl_for(kind) <= 0 {
                return Err(ConfigValidationError::NonPositiveTtl(kind));
            }
            if self.ttl_for(kind) > MAX_TTL_SECS {
                return Err(ConfigValidationError::TtlTooLong(kind));
            }
        }
        if self.refresh_token_ttl_secs <= self.access_token_ttl_secs {
            return Err(ConfigValidationError::RefreshTtlNotLonger);
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigValidationError::BcryptCostOutOfRange(self.bcrypt_cost));
        }

        let secrets = ResolvedSecrets {
            access: self.resolve_secret(TokenKind::Access)?,
            refresh: self.resolve_secret(TokenKind::Refresh)?,
            confirmation: self.resolve_secret(TokenKind::Confirmation)?,
        };

        if secrets.access == secrets.refresh
            || secrets.access == secrets.confirmation
            || secrets.refresh == secrets.confirmation
        {
            return Err(ConfigValidationError::SharedSecret);
        }

        Ok(secrets)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.resolve().map(|_| ())
    }

    /// Generate a random 64-character alphanumeric secret.
    pub fn generate_secret() -> String {
        use rand::Rng;

        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        const SECRET_LENGTH: usize = 64;

        let mut rng = rand::rng();
        (0..SECRET_LENGTH)
            .map(|_| {
                let idx = rng.random_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }

    /// A config with three freshly generated secrets.
    pub fn generated() -> Self {
        Self::with_secrets(
            Self::generate_secret(),
            Self::generate_secret(),
            Self::generate_secret(),
        )
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error(
        "{0} token secret is not configured. Set it in the [auth] config section or via BIERGARTEN__AUTH__* environment variables."
    )]
    MissingSecret(TokenKind),

    #[error("{0} token secret must be at least 32 characters long.")]
    SecretTooShort(TokenKind),

    #[error("access, refresh and confirmation token secrets must all be different.")]
    SharedSecret,

    #[error("{0} token lifetime must be positive.")]
    NonPositiveTtl(TokenKind),

    #[error("{0} token lifetime must not exceed ten years.")]
    TtlTooLong(TokenKind),

    #[error("refresh token lifetime must be longer than access token lifetime.")]
    RefreshTtlNotLonger,

    #[error("bcrypt cost {0} is outside the supported range 4..=31.")]
    BcryptCostOutOfRange(u32),

    #[error("Environment variable '{0}' not found (referenced via env:{0} in config).")]
    EnvVarNotFound(String),

    #[error("Environment variable '{0}' is empty (referenced via env:{0} in config).")]
    EnvVarEmpty(String),
}

#[cfg(test)]
#[allow(clippy::field_reassign_with_default)]
mod tests {
    use super::*;

    const A: &str = "access-secret-that-is-at-least-32-characters";
    const R: &str = "refresh-secret-that-is-at-least-32-characters";
    const C: &str = "confirm-secret-that-is-at-least-32-characters";

    #[test]
    fn test_auth_config_default() {
        let config = AuthConfig::default();
        assert!(config.access_token_secret.is_none());
        assert_eq!(config.access_token_ttl_secs, 900);
        assert_eq!(config.refresh_token_ttl_secs, 604_800);
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigValidationError::MissingSecret(TokenKind::Access)
        );
    }

    #[test]
    fn test_valid_config_resolves() {
        let secrets = AuthConfig::with_secrets(A, R, C).resolve().unwrap();
        assert_eq!(secrets.access, A);
        assert_eq!(secrets.refresh, R);
        assert_eq!(secrets.confirmation, C);
    }

    #[test]
    fn test_short_secret_rejected() {
        let config = AuthConfig::with_secrets(A, "tooshort", C);
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigValidationError::SecretTooShort(TokenKind::Refresh)
        );
    }

    #[test]
    fn test_shared_secret_rejected() {
        let config = AuthConfig::with_secrets(A, A, C);
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigValidationError::SharedSecret
        );
    }

    #[test]
    fn test_ttl_rules() {
        let mut config = AuthConfig::with_secrets(A, R, C);
        config.access_token_ttl_secs = 0;
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigValidationError::NonPositiveTtl(TokenKind::Access)
        );

        let mut config = AuthConfig::with_secrets(A, R, C);
        config.refresh_token_ttl_secs = config.access_token_ttl_secs;
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigValidationError::RefreshTtlNotLonger
        );

        let mut config = AuthConfig::with_secrets(A, R, C);
        config.access_token_ttl_secs = i64::MAX - 1;
        config.refresh_token_ttl_secs = i64::MAX;
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigValidationError::TtlTooLong(TokenKind::Access)
        );

        let mut config = AuthConfig::with_secrets(A, R, C);
        config.refresh_token_ttl_secs = MAX_TTL_SECS;
        assert!(config.validate().is_ok());
        config.confirmation_token_ttl_secs = MAX_TTL_SECS + 1;
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigValidationError::TtlTooLong(TokenKind::Confirmation)
        );

        let mut config = AuthConfig::with_secrets(A, R, C);
        config.bcrypt_cost = 2;
        assert_eq!(
            config.validate().unwrap_err(),
            ConfigValidationError::BcryptCostOutOfRange(2)
        );
    }

    #[test]
    fn test_resolve_secret_env_var() {
        // SAFETY: This is a test-only environment variable with a unique name
        unsafe {
            std::env::set_var(
                "TEST_BIERGARTEN_ACCESS_SECRET_4711",
                "secret-from-env-var-at-least-32-chars",
            );
        }

        let mut config = AuthConfig::with_secrets(A, R, C);
        config.access_token_secret = Some("env:TEST_BIERGARTEN_ACCESS_SECRET_4711".to_string());

        assert_eq!(
            config.resolve_secret(TokenKind::Access).unwrap(),
            "secret-from-env-var-at-least-32-chars"
        );

        // SAFETY: Cleaning up test environment variable
        unsafe {
            std::env::remove_var("TEST_BIERGARTEN_ACCESS_SECRET_4711");
        }
    }

    #[test]
    fn test_resolve_secret_env_var_not_found() {
        let mut config = AuthConfig::with_secrets(A, R, C);
        config.refresh_token_secret = Some("env:NONEXISTENT_BIERGARTEN_VAR_4711".to_string());

        assert_eq!(
            config.resolve_secret(TokenKind::Refresh).unwrap_err(),
            ConfigValidationError::EnvVarNotFound("NONEXISTENT_BIERGARTEN_VAR_4711".to_string())
        );
    }

    #[test]
    fn test_resolve_secret_env_var_empty() {
        // SAFETY: This is a test-only environment variable with a unique name
        unsafe {
            std::env::set_var("TEST_BIERGARTEN_EMPTY_SECRET_4711", "");
        }

        let mut config = AuthConfig::with_secrets(A, R, C);
        config.confirmation_token_secret = Some("env:TEST_BIERGARTEN_EMPTY_SECRET_4711".to_string());

        assert_eq!(
            config.resolve_secret(TokenKind::Confirmation).unwrap_err(),
            ConfigValidationError::EnvVarEmpty("TEST_BIERGARTEN_EMPTY_SECRET_4711".to_string())
        );

        // SAFETY: Cleaning up test environment variable
        unsafe {
            std::env::remove_var("TEST_BIERGARTEN_EMPTY_SECRET_4711");
        }
    }

    #[test]
    fn test_generated_config_is_valid() {
        let config = AuthConfig::generated();
        let secrets = config.resolve().unwrap();
        assert_eq!(secrets.access.len(), 64);
        assert!(secrets.access.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(secrets.access, secrets.refresh);
    }

    #[test]
    fn test_resolved_secrets_debug_redacts() {
        let secrets = AuthConfig::with_secrets(A, R, C).resolve().unwrap();
        assert!(!format!("{secrets:?}").contains(A));
    }
}
