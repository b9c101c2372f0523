//! Cryptographic primitives for Chirp.
//!
//! Provides salted Argon2id password hashing and HMAC-SHA256 signed session
//! tokens in the standard three-part `header.claims.signature` form.
//!
//! All crypto operations wrap established libraries. There is no custom cryptography.
//! Comparisons of secrets go through the libraries' constant-time checks.

pub mod error;
pub mod signer;
pub mod vault;

pub use error::{CryptoError, TokenError};
pub use signer::{Claims, TokenKind, TokenSigner, ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS};
pub use vault::CredentialVault;
