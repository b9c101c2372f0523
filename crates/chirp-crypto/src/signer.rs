use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chirp_types::UserId;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::TokenError;

type HmacSha256 = Hmac<Sha256>;

/// Lifetime of an access token in seconds: 1 hour.
pub const ACCESS_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Lifetime of a refresh token in seconds: 1440 hours (60 days).
pub const REFRESH_TOKEN_TTL_SECS: i64 = 1440 * 60 * 60;

const ALGORITHM: &str = "HS256";

/// The purpose a token was issued for, carried in its `iss` claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Short-lived credential authorizing API calls.
    Access,
    /// Long-lived credential used only to mint new access tokens.
    Refresh,
}

impl TokenKind {
    /// The `iss` claim value for this kind.
    pub fn issuer(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.issuer())
    }
}

/// Registered claims carried by every session token. Times are Unix seconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Parse the `sub` claim as a user id.
    pub fn subject(&self) -> Result<UserId, TokenError> {
        self.sub
            .parse()
            .map_err(|_| TokenError::InvalidSubject(self.sub.clone()))
    }

    /// Returns `true` if the token is past its expiry at `now`.
    ///
    /// A token is still valid at exactly its `exp` second.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp < now
    }
}

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Issues and verifies HMAC-SHA256 signed session tokens.
///
/// Tokens use the standard `base64url(header).base64url(claims).base64url(mac)`
/// layout. The symmetric secret is shared between issuance and verification
/// and is wiped from memory when the signer is dropped.
///
/// Verification is stateless: it checks signature, issuer and expiry only.
/// Revocation lives with the store, see `chirp-core`.
pub struct TokenSigner {
    secret: Zeroizing<Vec<u8>>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenSigner {
    /// Create a signer with the default token lifetimes.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, TokenError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        Ok(Self {
            secret: Zeroizing::new(secret.to_vec()),
            access_ttl: Duration::seconds(ACCESS_TOKEN_TTL_SECS),
            refresh_ttl: Duration::seconds(REFRESH_TOKEN_TTL_SECS),
        })
    }

    /// Override the token lifetimes.
    pub fn with_ttls(mut self, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        self.access_ttl = access_ttl;
        self.refresh_ttl = refresh_ttl;
        self
    }

    /// Lifetime of tokens of the given kind.
    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Issue a token of `kind` for `subject`, valid from now.
    pub fn issue(&self, kind: TokenKind, subject: UserId) -> Result<String, TokenError> {
        self.issue_at(kind, subject, Utc::now().timestamp())
    }

    /// Issue a token of `kind` for `subject` as if the current time were `now`.
    pub fn issue_at(&self, kind: TokenKind, subject: UserId, now: i64) -> Result<String, TokenError> {
        let claims = Claims {
            iss: kind.issuer().to_string(),
            sub: subject.to_string(),
            iat: now,
            exp: now + self.ttl(kind).num_seconds(),
        };
        self.sign(&claims)
    }

    /// Verify signature, issuer and expiry against the current time.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, TokenError> {
        self.verify_at(token, kind, Utc::now().timestamp())
    }

    /// Verify signature, issuer and expiry as if the current time were `now`.
    pub fn verify_at(&self, token: &str, kind: TokenKind, now: i64) -> Result<Claims, TokenError> {
        let claims = self.decode(token)?;
        if claims.iss != kind.issuer() {
            return Err(TokenError::WrongKind {
                expected: kind.issuer().to_string(),
                found: claims.iss,
            });
        }
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired {
                expired_at: claims.exp,
            });
        }
        Ok(claims)
    }

    /// Check the signature and return the claims without judging issuer or
    /// expiry.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let mut parts = token.split('.');
        let (header_b64, claims_b64, sig_b64) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(h), Some(c), Some(s), None) => (h, c, s),
            _ => return Err(TokenError::Malformed("expected three segments".into())),
        };

        let signature = decode_segment(sig_b64, "signature")?;
        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let header: Header = serde_json::from_slice(&decode_segment(header_b64, "header")?)
            .map_err(|e| TokenError::Malformed(format!("header: {e}")))?;
        if header.alg != ALGORITHM {
            return Err(TokenError::UnsupportedAlgorithm(header.alg));
        }

        serde_json::from_slice(&decode_segment(claims_b64, "claims")?)
            .map_err(|e| TokenError::Malformed(format!("claims: {e}")))
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        let header = Header {
            alg: ALGORITHM.into(),
            typ: "JWT".into(),
        };
        let header_json =
            serde_json::to_vec(&header).map_err(|e| TokenError::Serialization(e.to_string()))?;
        let claims_json =
            serde_json::to_vec(claims).map_err(|e| TokenError::Serialization(e.to_string()))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header_json),
            URL_SAFE_NO_PAD.encode(claims_json)
        );
        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)))
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| TokenError::EmptySecret)
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

fn decode_segment(segment: &str, what: &str) -> Result<Vec<u8>, TokenError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| TokenError::Malformed(format!("{what}: {e}")))
}
