//! Token issuance and verification.

pub mod authority;
pub mod claims;
pub mod codec;

pub use authority::TokenAuthority;
pub use claims::Claims;
pub use codec::CodecError;
