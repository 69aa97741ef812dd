//! Token issuance and verification with the process-wide signing secret.

use std::collections::BTreeMap;
use std::sync::Arc;

use time::OffsetDateTime;

use crate::auth::claims::Claims;
use crate::auth::codec::{self, CodecError};
use crate::error::AppError;
use crate::state::security_config::SecurityConfig;

/// Issues and verifies access tokens.
///
/// Cloning is cheap; the configuration is shared and never mutated, so any
/// number of request handlers may call into it concurrently.
#[derive(Debug, Clone)]
pub struct TokenAuthority {
    config: Arc<SecurityConfig>,
}

impl TokenAuthority {
    /// Refuses an empty secret or a non-HMAC algorithm.
    pub fn new(config: SecurityConfig) -> Result<Self, AppError> {
        if config.jwt_secret.is_empty() {
            return Err(AppError::config("JWT signing secret must not be empty"));
        }
        if !codec::is_hmac(config.algorithm) {
            return Err(AppError::config(format!(
                "unsupported JWT algorithm {:?}",
                config.algorithm
            )));
        }
        Ok(Self {
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &SecurityConfig {
        &self.config
    }

    /// Issue a token expiring `token_ttl` from now.
    pub fn issue(
        &self,
        subject_id: &str,
        email: &str,
        extra: BTreeMap<String, String>,
    ) -> Result<String, CodecError> {
        self.issue_at(OffsetDateTime::now_utc(), subject_id, email, extra)
    }

    pub fn issue_at(
        &self,
        now: OffsetDateTime,
        subject_id: &str,
        email: &str,
        extra: BTreeMap<String, String>,
    ) -> Result<String, CodecError> {
        let claims = Claims::new(subject_id, email, extra, self.expiry_for(now)?);
        codec::encode_claims(&claims, &self.config.jwt_secret, self.config.algorithm)
    }

    /// Expiry assigned to a token issued at `now`, truncated to whole seconds
    /// as it appears on the wire.
    pub fn expiry_for(&self, now: OffsetDateTime) -> Result<OffsetDateTime, CodecError> {
        let exp = now
            .unix_timestamp()
            .checked_add(self.config.token_ttl.whole_seconds())
            .ok_or_else(|| CodecError::Encoding("expiry out of range".to_string()))?;
        OffsetDateTime::from_unix_timestamp(exp)
            .map_err(|e| CodecError::Encoding(format!("expiry out of range: {e}")))
    }

    /// Verify signature and algorithm, then reject the token once expired.
    pub fn verify(&self, token: &str) -> Result<Claims, CodecError> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<Claims, CodecError> {
        let claims = codec::decode_claims(token, &self.config.jwt_secret, self.config.algorithm)?;
        if claims.is_expired_at(now) {
            return Err(CodecError::Expired);
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use jsonwebtoken::Algorithm;
    use time::macros::datetime;
    use time::Duration;

    use super::TokenAuthority;
    use crate::auth::claims::Claims;
    use crate::auth::codec::CodecError;
    use crate::state::security_config::SecurityConfig;

    fn authority(secret: &str) -> TokenAuthority {
        TokenAuthority::new(SecurityConfig::new(secret.as_bytes())).unwrap()
    }

    fn names() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("first_name".to_string(), "Ada".to_string()),
            ("last_name".to_string(), "Lovelace".to_string()),
        ])
    }

    #[test]
    fn issue_then_verify_immediately() {
        let tokens = authority("test_secret_key_for_testing_purposes_only");
        let token = tokens.issue("u1", "a@b.com", BTreeMap::new()).unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.subject_id, "u1");
        assert_eq!(claims.email, "a@b.com");
        assert!(claims.extra.is_empty());
    }

    #[test]
    fn round_trip_adds_72_hour_expiry() {
        let tokens = authority("round-trip");
        let issued_at = datetime!(2024-06-01 10:30:15.750 UTC);
        let token = tokens.issue_at(issued_at, "u1", "a@b.com", names()).unwrap();

        let claims = tokens
            .verify_at(&token, issued_at + Duration::hours(1))
            .unwrap();
        assert_eq!(
            claims,
            Claims::new(
                "u1",
                "a@b.com",
                names(),
                datetime!(2024-06-04 10:30:15 UTC)
            )
        );
        assert_eq!(claims.get("first_name"), Some("Ada"));
    }

    #[test]
    fn expiry_boundary() {
        let tokens = authority("boundary");
        let issued_at = datetime!(2024-06-01 00:00 UTC);
        let token = tokens.issue_at(issued_at, "u1", "a@b.com", names()).unwrap();
        let expires_at = datetime!(2024-06-04 00:00 UTC);

        assert!(tokens
            .verify_at(&token, expires_at - Duration::seconds(1))
            .is_ok());
        assert_eq!(
            tokens.verify_at(&token, expires_at),
            Err(CodecError::Expired)
        );
        assert_eq!(
            tokens.verify_at(&token, expires_at + Duration::days(30)),
            Err(CodecError::Expired)
        );
    }

    #[test]
    fn token_from_other_secret_is_signature_error() {
        let token = authority("secret-A")
            .issue("u1", "a@b.com", BTreeMap::new())
            .unwrap();
        assert_eq!(
            authority("secret-B").verify(&token),
            Err(CodecError::Signature)
        );
    }

    #[test]
    fn signature_is_checked_before_expiry() {
        let issued_at = datetime!(2000-01-01 00:00 UTC);
        let token = authority("secret-A")
            .issue_at(issued_at, "u1", "a@b.com", BTreeMap::new())
            .unwrap();
        assert_eq!(
            authority("secret-B").verify(&token),
            Err(CodecError::Signature)
        );
    }

    #[test]
    fn configured_ttl_is_honoured() {
        let tokens = TokenAuthority::new(
            SecurityConfig::new(b"ttl".to_vec()).with_token_ttl(Duration::minutes(15)),
        )
        .unwrap();
        let issued_at = datetime!(2024-06-01 00:00 UTC);
        let token = tokens
            .issue_at(issued_at, "u1", "a@b.com", BTreeMap::new())
            .unwrap();
        assert_eq!(
            tokens.verify_at(&token, issued_at + Duration::minutes(15)),
            Err(CodecError::Expired)
        );
    }

    #[test]
    fn unrepresentable_expiry_is_an_encoding_error() {
        let tokens =
            TokenAuthority::new(SecurityConfig::new(b"ttl".to_vec()).with_token_ttl(Duration::MAX))
                .unwrap();
        assert!(matches!(
            tokens.issue_at(datetime!(2024-06-01 00:00 UTC), "u1", "a@b.com", BTreeMap::new()),
            Err(CodecError::Encoding(_))
        ));
    }

    #[test]
    fn algorithm_mismatch_between_authorities() {
        let hs512 = TokenAuthority::new(
            SecurityConfig::new(b"shared".to_vec()).with_algorithm(Algorithm::HS512),
        )
        .unwrap();
        let token = hs512.issue("u1", "a@b.com", BTreeMap::new()).unwrap();
        assert!(matches!(
            authority("shared").verify(&token),
            Err(CodecError::AlgorithmMismatch { .. })
        ));
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(TokenAuthority::new(SecurityConfig::new(Vec::new())).is_err());
    }

    #[test]
    fn asymmetric_algorithm_is_refused() {
        let config = SecurityConfig::new(b"x".to_vec()).with_algorithm(Algorithm::ES256);
        assert!(TokenAuthority::new(config).is_err());
    }
}
