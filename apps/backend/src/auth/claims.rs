//! Identity claims carried inside access tokens.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Claim names owned by the fixed fields; extension claims may not reuse them.
pub const RESERVED_CLAIMS: [&str; 3] = ["user_id", "email", "exp"];

/// Claims embedded in a token.
///
/// The required fields are typed; optional string claims such as
/// `first_name` and `last_name` live in `extra`, which is flattened into the
/// payload with a stable (sorted) key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Opaque user identifier
    #[serde(rename = "user_id")]
    pub subject_id: String,
    pub email: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
    /// Expiry, encoded as seconds since epoch
    #[serde(rename = "exp", with = "time::serde::timestamp")]
    pub expires_at: OffsetDateTime,
}

impl Claims {
    pub fn new(
        subject_id: impl Into<String>,
        email: impl Into<String>,
        extra: BTreeMap<String, String>,
        expires_at: OffsetDateTime,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            email: email.into(),
            extra,
            expires_at,
        }
    }

    /// Look up an extension claim.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.extra.get(name).map(String::as_str)
    }

    /// First extension key that collides with a fixed claim, if any.
    pub fn reserved_collision(&self) -> Option<&str> {
        self.extra
            .keys()
            .map(String::as_str)
            .find(|key| RESERVED_CLAIMS.contains(key))
    }

    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}
