use std::sync::Arc;

use chirp_crypto::{TokenError, TokenKind, TokenSigner};
use chirp_store::SnapshotStore;
use chirp_types::{RevokedToken, UserId};
use chrono::Utc;
use tracing::{info, warn};

use crate::error::{ChirpError, ChirpResult};

/// Issues, verifies, and revokes session tokens.
///
/// Access tokens are checked statelessly. Refresh tokens are additionally
/// checked against the revocation set persisted in the store, and a valid
/// refresh token only ever yields a new access token; it is not rotated.
pub struct SessionTokenService<S> {
    store: Arc<S>,
    signer: Arc<TokenSigner>,
}

impl<S: SnapshotStore> SessionTokenService<S> {
    pub fn new(store: Arc<S>, signer: TokenSigner) -> Self {
        Self {
            store,
            signer: Arc::new(signer),
        }
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    /// Issue a 1 hour access token for `subject`.
    pub fn issue_access_token(&self, subject: UserId) -> ChirpResult<String> {
        Ok(self.signer.issue(TokenKind::Access, subject)?)
    }

    /// Issue a 60 day refresh token for `subject`.
    pub fn issue_refresh_token(&self, subject: UserId) -> ChirpResult<String> {
        Ok(self.signer.issue(TokenKind::Refresh, subject)?)
    }

    /// Verify an access token and return its subject.
    pub fn verify_access_token(&self, token: &str) -> ChirpResult<UserId> {
        self.verify_access_token_at(token, Utc::now().timestamp())
    }

    pub fn verify_access_token_at(&self, token: &str, now: i64) -> ChirpResult<UserId> {
        let claims = self
            .signer
            .verify_at(token, TokenKind::Access, now)
            .map_err(reject)?;
        claims.subject().map_err(reject)
    }

    /// Verify a refresh token and mint a fresh access token for its subject.
    pub fn verify_refresh_token(&self, token: &str) -> ChirpResult<String> {
        self.verify_refresh_token_at(token, Utc::now().timestamp())
    }

    pub fn verify_refresh_token_at(&self, token: &str, now: i64) -> ChirpResult<String> {
        let claims = self
            .signer
            .verify_at(token, TokenKind::Refresh, now)
            .map_err(reject)?;
        let subject = claims.subject().map_err(reject)?;

        if self.store.load()?.is_revoked(token) {
            return Err(reject(TokenError::Revoked));
        }
        Ok(self.signer.issue_at(TokenKind::Access, subject, now)?)
    }

    /// Add the raw token value to the revocation set.
    ///
    /// The value is not validated. Revoking an already revoked token keeps the
    /// original revocation time.
    pub fn revoke(&self, token: &str) -> ChirpResult<()> {
        self.store.update(|snap| {
            if !snap.is_revoked(token) {
                snap.revoked_tokens
                    .insert(token.to_string(), RevokedToken::now(token));
                info!(revoked = snap.revoked_tokens.len(), "revoked refresh token");
            }
            Ok::<_, ChirpError>(())
        })
    }

    /// Drop revocation entries that could no longer verify: undecodable
    /// values and tokens already past their expiry. Returns how many were
    /// removed.
    pub fn compact_revocations(&self) -> ChirpResult<usize> {
        self.compact_revocations_at(Utc::now().timestamp())
    }

    pub fn compact_revocations_at(&self, now: i64) -> ChirpResult<usize> {
        let removed = self.store.update(|snap| {
            let before = snap.revoked_tokens.len();
            snap.revoked_tokens.retain(|value, _| {
                self.signer
                    .decode(value)
                    .map(|claims| !claims.is_expired_at(now))
                    .unwrap_or(false)
            });
            Ok::<_, ChirpError>(before - snap.revoked_tokens.len())
        })?;
        info!(removed, "compacted revocation list");
        Ok(removed)
    }
}

impl<S> Clone for SessionTokenService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            signer: Arc::clone(&self.signer),
        }
    }
}

impl<S> std::fmt::Debug for SessionTokenService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenService")
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

fn reject(err: TokenError) -> ChirpError {
    warn!(reason = %err, "rejected session token");
    ChirpError::from(err)
}
