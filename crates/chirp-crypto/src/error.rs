use thiserror::Error;

/// Errors from password hashing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// The hashing backend failed to produce a hash.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// A stored hash could not be parsed.
    #[error("malformed password hash: {0}")]
    MalformedHash(String),
}

/// Errors from issuing or verifying session tokens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The token is not three base64url segments of valid JSON.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// The header names an algorithm other than HS256.
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The signature does not match the header and claims.
    #[error("invalid token signature")]
    InvalidSignature,

    /// The token was issued for a different purpose.
    #[error("wrong token kind: expected {expected}, found {found}")]
    WrongKind { expected: String, found: String },

    /// The token's expiry instant has passed.
    #[error("token expired at {expired_at}")]
    Expired { expired_at: i64 },

    /// The token value is on the revocation list.
    #[error("token has been revoked")]
    Revoked,

    /// The `sub` claim is not a valid user id.
    #[error("invalid token subject: {0}")]
    InvalidSubject(String),

    /// Signing was attempted with an empty secret.
    #[error("signing secret must not be empty")]
    EmptySecret,

    /// Claims could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}
