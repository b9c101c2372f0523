use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// Opaque, salted password hash.
///
/// Holds the encoded hash string produced by the credential vault (which
/// embeds algorithm, parameters and salt). The store never interprets it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash string.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// The encoded hash string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The encoded hash as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PasswordHash(<redacted>)")
    }
}

/// A registered account as persisted in the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub email: String,
    pub password_hash: PasswordHash,
    #[serde(default)]
    pub is_upgraded: bool,
}

impl UserAccount {
    /// The public projection of this account.
    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            email: self.email.clone(),
            is_upgraded: self.is_upgraded,
        }
    }
}

/// Public view of an account, safe to hand back to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub is_upgraded: bool,
}

impl From<&UserAccount> for User {
    fn from(account: &UserAccount) -> Self {
        account.to_user()
    }
}
