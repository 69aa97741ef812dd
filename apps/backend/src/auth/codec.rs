//! Compact signed token encoding for [`Claims`].
//!
//! Tokens are JWS compact serializations (`header.payload.signature`) signed
//! with an HMAC algorithm. Decoding pins the algorithm: a header that
//! advertises anything else, including `none` or no algorithm at all, is
//! rejected before the signature is looked at. Expiry is not checked here.

use std::collections::HashSet;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::Value;
use thiserror::Error;

use crate::auth::claims::Claims;
use crate::logging::security;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("token signature does not match")]
    Signature,
    #[error("token algorithm {declared:?} does not match the configured algorithm")]
    AlgorithmMismatch { declared: Option<String> },
    #[error("token expired")]
    Expired,
    #[error("cannot encode claims: {0}")]
    Encoding(String),
}

pub fn is_hmac(algorithm: Algorithm) -> bool {
    matches!(
        algorithm,
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
    )
}

/// Sign `claims` into a three-segment token.
pub fn encode_claims(
    claims: &Claims,
    secret: &[u8],
    algorithm: Algorithm,
) -> Result<String, CodecError> {
    if !is_hmac(algorithm) {
        return Err(CodecError::Encoding(format!(
            "{algorithm:?} is not a shared-secret algorithm"
        )));
    }
    if let Some(key) = claims.reserved_collision() {
        return Err(CodecError::Encoding(format!(
            "extension claim '{key}' shadows a reserved claim"
        )));
    }

    encode(
        &Header::new(algorithm),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| CodecError::Encoding(e.to_string()))
}

/// Check structure, algorithm and signature of `token` and return its claims.
pub fn decode_claims(
    token: &str,
    secret: &[u8],
    algorithm: Algorithm,
) -> Result<Claims, CodecError> {
    let declared = declared_algorithm(token)?;
    let pinned = declared
        .as_deref()
        .and_then(|alg| alg.parse::<Algorithm>().ok())
        .filter(|alg| *alg == algorithm);
    if pinned.is_none() {
        security::algorithm_mismatch(declared.as_deref(), algorithm);
        return Err(CodecError::AlgorithmMismatch { declared });
    }

    let mut validation = Validation::new(algorithm);
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();

    decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => CodecError::Signature,
            ErrorKind::InvalidAlgorithm => CodecError::AlgorithmMismatch {
                declared: Some(format!("{algorithm:?}")),
            },
            _ => CodecError::Malformed(e.to_string()),
        })
}

/// Split the token and read the `alg` field of its header.
fn declared_algorithm(token: &str) -> Result<Option<String>, CodecError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
        return Err(CodecError::Malformed(format!(
            "expected 3 non-empty segments, got {}",
            segments.len()
        )));
    }

    let raw = URL_SAFE_NO_PAD
        .decode(segments[0])
        .map_err(|e| CodecError::Malformed(format!("header is not base64url: {e}")))?;
    let header: Value = serde_json::from_slice(&raw)
        .map_err(|e| CodecError::Malformed(format!("header is not JSON: {e}")))?;
    if !header.is_object() {
        return Err(CodecError::Malformed("header is not a JSON object".into()));
    }

    Ok(header.get("alg").and_then(Value::as_str).map(str::to_string))
}
