use std::sync::Arc;

use chirp_crypto::CredentialVault;
use chirp_store::SnapshotStore;
use chirp_types::{User, UserAccount, UserId};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::error::{ChirpError, ChirpResult};
use crate::tokens::SessionTokenService;

/// The result of a successful login.
#[derive(Clone)]
pub struct SessionTokenPair {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for SessionTokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenPair")
            .field("user", &self.user)
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Changes to apply in [`UserRepository::edit`]. `None` leaves a field as is.
///
/// A new password is wiped from memory when the update is dropped.
#[derive(Clone, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub password: Option<Zeroizing<String>>,
}

impl UserUpdate {
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(Zeroizing::new(password.into()));
        self
    }
}

impl std::fmt::Debug for UserUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserUpdate")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Account registration, login, and profile changes.
///
/// Emails are unique and compared exactly, case included. Passwords are
/// hashed before the store lock is taken, since hashing is deliberately slow.
pub struct UserRepository<S> {
    store: Arc<S>,
    vault: CredentialVault,
    tokens: SessionTokenService<S>,
}

impl<S: SnapshotStore> UserRepository<S> {
    pub fn new(store: Arc<S>, tokens: SessionTokenService<S>) -> Self {
        Self {
            store,
            vault: CredentialVault::new(),
            tokens,
        }
    }

    /// Register a new account.
    pub fn create(&self, email: &str, password: &str) -> ChirpResult<UserAccount> {
        let password_hash = self.vault.hash(password)?;
        let account = self.store.update(|snap| -> ChirpResult<UserAccount> {
            if snap.user_by_email(email).is_some() {
                return Err(ChirpError::Conflict(format!("email already registered: {email}")));
            }
            let id = snap.allocate_user_id()?;
            let account = UserAccount {
                id,
                email: email.to_string(),
                password_hash,
                is_upgraded: false,
            };
            snap.users.insert(id, account.clone());
            Ok(account)
        })?;
        info!(user_id = %account.id, "created user");
        Ok(account)
    }

    /// Check credentials and issue a fresh access/refresh token pair.
    ///
    /// Unknown email and wrong password fail identically, and take about the
    /// same time.
    pub fn authenticate(&self, email: &str, password: &str) -> ChirpResult<SessionTokenPair> {
        let snap = self.store.load()?;
        let Some(account) = snap.user_by_email(email) else {
            self.vault.verify_decoy(password);
            warn!("login failed: unknown email");
            return Err(ChirpError::Auth("unknown email".into()));
        };
        match self.vault.verify(password, &account.password_hash) {
            Ok(true) => {}
            Ok(false) => {
                warn!(user_id = %account.id, "login failed: wrong password");
                return Err(ChirpError::Auth("wrong password".into()));
            }
            Err(e) => {
                warn!(user_id = %account.id, error = %e, "login failed: stored hash unusable");
                return Err(ChirpError::Auth(e.to_string()));
            }
        }

        let pair = SessionTokenPair {
            user: account.to_user(),
            access_token: self.tokens.issue_access_token(account.id)?,
            refresh_token: self.tokens.issue_refresh_token(account.id)?,
        };
        debug!(user_id = %account.id, "user authenticated");
        Ok(pair)
    }

    /// Change an account's email and/or password.
    pub fn edit(&self, id: UserId, update: UserUpdate) -> ChirpResult<UserAccount> {
        let password_hash = match &update.password {
            Some(password) => Some(self.vault.hash(password)?),
            None => None,
        };
        let account = self.store.update(|snap| -> ChirpResult<UserAccount> {
            if !snap.users.contains_key(&id) {
                return Err(ChirpError::NotFound(format!("user {id}")));
            }
            if let Some(email) = &update.email {
                if snap.user_by_email(email).is_some_and(|other| other.id != id) {
                    return Err(ChirpError::Conflict(format!("email already registered: {email}")));
                }
            }
            let account = snap
                .users
                .get_mut(&id)
                .ok_or_else(|| ChirpError::NotFound(format!("user {id}")))?;
            if let Some(email) = update.email {
                account.email = email;
            }
            if let Some(hash) = password_hash {
                account.password_hash = hash;
            }
            Ok(account.clone())
        })?;
        debug!(user_id = %id, "edited user");
        Ok(account)
    }

    /// Mark an account as upgraded. Upgrading twice is not an error.
    pub fn upgrade(&self, id: UserId) -> ChirpResult<()> {
        self.store.update(|snap| {
            let account = snap
                .users
                .get_mut(&id)
                .ok_or_else(|| ChirpError::NotFound(format!("user {id}")))?;
            account.is_upgraded = true;
            Ok::<_, ChirpError>(())
        })?;
        info!(user_id = %id, "upgraded user");
        Ok(())
    }

    pub fn get_by_id(&self, id: UserId) -> ChirpResult<UserAccount> {
        self.store
            .load()?
            .users
            .remove(&id)
            .ok_or_else(|| ChirpError::NotFound(format!("user {id}")))
    }

    pub fn find_by_email(&self, email: &str) -> ChirpResult<Option<UserAccount>> {
        Ok(self.store.load()?.user_by_email(email).cloned())
    }

    pub fn tokens(&self) -> &SessionTokenService<S> {
        &self.tokens
    }
}
