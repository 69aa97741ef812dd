use jsonwebtoken::Algorithm;
use tracing::warn;

use crate::trace_ctx;

/// Log a token whose header advertises an algorithm other than the pinned one.
pub fn algorithm_mismatch(declared: Option<&str>, expected: Algorithm) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_ALG_MISMATCH",
        %trace_id,
        declared = declared.unwrap_or("<absent>"),
        expected = ?expected,
        "Token rejected: algorithm mismatch"
    );
}

/// Log a rejected bearer token.
pub fn token_rejected(reason: &str) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_TOKEN_REJECTED",
        %trace_id,
        reason,
        "Authentication failure"
    );
}
