use chirp_crypto::{CryptoError, TokenError};
use chirp_store::StoreError;
use chirp_types::TypeError;
use thiserror::Error;

/// Top-level error for Chirp operations.
///
/// [`Auth`](Self::Auth) carries the concrete reason for logging, but its
/// `Display` never says which check failed.
#[derive(Debug, Error)]
pub enum ChirpError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("authentication failed")]
    Auth(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ChirpError {
    /// The HTTP status an adapter should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Auth(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Io(_) | Self::Codec(_) | Self::Crypto(_) | Self::Config(_) | Self::Internal(_) => {
                500
            }
        }
    }

    /// Returns `true` for errors caused by the caller rather than the system.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<StoreError> for ChirpError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Io(e) => Self::Io(e),
            StoreError::Codec(msg) => Self::Codec(msg),
            StoreError::LockPoisoned => Self::Internal("store lock poisoned".into()),
        }
    }
}

impl From<TokenError> for ChirpError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::EmptySecret => Self::Config("signing secret must not be empty".into()),
            TokenError::Serialization(msg) => Self::Internal(msg),
            other => Self::Auth(other.to_string()),
        }
    }
}

impl From<TypeError> for ChirpError {
    fn from(err: TypeError) -> Self {
        match err {
            // The stored document already holds the largest possible id.
            TypeError::IdSpaceExhausted(collection) => {
                Self::Codec(format!("no {collection} ids left to allocate"))
            }
            other => Self::Validation(other.to_string()),
        }
    }
}

/// Result alias for Chirp operations.
pub type ChirpResult<T> = Result<T, ChirpError>;
