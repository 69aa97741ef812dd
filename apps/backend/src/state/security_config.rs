use std::env;

use jsonwebtoken::Algorithm;
use time::Duration;

use crate::error::AppError;

/// Default lifetime of an issued token.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::hours(72);

/// Configuration for JWT security settings
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// JWT secret key for signing and verifying tokens
    pub jwt_secret: Vec<u8>,
    /// JWT algorithm to use (defaults to HS256)
    pub algorithm: Algorithm,
    /// Lifetime of issued tokens (defaults to 72 hours)
    pub token_ttl: Duration,
}

impl SecurityConfig {
    /// Create a new SecurityConfig with the given JWT secret
    pub fn new(jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            algorithm: Algorithm::HS256,
            token_ttl: DEFAULT_TOKEN_TTL,
        }
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_token_ttl(mut self, token_ttl: Duration) -> Self {
        self.token_ttl = token_ttl;
        self
    }

    /// Read `JWT_SECRET` (required, non-empty) and `JWT_TTL_HOURS` (optional).
    pub fn from_env() -> Result<Self, AppError> {
        let secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::config("JWT_SECRET must be set"))?;
        if secret.is_empty() {
            return Err(AppError::config("JWT_SECRET must not be empty"));
        }

        let mut config = Self::new(secret.into_bytes());
        if let Ok(raw) = env::var("JWT_TTL_HOURS") {
            let seconds = raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|h| *h > 0)
                .and_then(|h| h.checked_mul(3600))
                .ok_or_else(|| {
                    AppError::config(format!(
                        "JWT_TTL_HOURS must be a positive integer of hours, got '{raw}'"
                    ))
                })?;
            config = config.with_token_ttl(Duration::seconds(seconds));
        }
        Ok(config)
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self::new(b"test_secret_key_for_testing_purposes_only".to_vec())
    }
}
