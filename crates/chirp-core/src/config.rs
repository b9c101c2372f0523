use std::path::{Path, PathBuf};

use chirp_crypto::TokenSigner;
use chirp_store::{FileSnapshotStore, SnapshotStore};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::info;

use crate::error::{ChirpError, ChirpResult};

/// Environment variable overriding [`ChirpConfig::jwt_secret`].
pub const ENV_JWT_SECRET: &str = "JWT_SECRET";
/// Environment variable overriding [`ChirpConfig::polka_api_key`].
pub const ENV_POLKA_API_KEY: &str = "POLKA_API_KEY";
/// Environment variable overriding [`ChirpConfig::database_path`].
pub const ENV_DATABASE_PATH: &str = "CHIRP_DATABASE_PATH";

/// Runtime configuration.
///
/// Read from TOML, then overlaid by environment variables. Missing keys take
/// their [`Default`] values.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChirpConfig {
    /// Location of the JSON document.
    pub database_path: PathBuf,
    /// HMAC secret for session tokens.
    pub jwt_secret: String,
    /// Credential expected from the payment provider's upgrade webhook.
    pub polka_api_key: Option<String>,
    /// When `true`, the store is wiped on startup.
    pub debug: bool,
}

impl Default for ChirpConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("database.json"),
            jwt_secret: String::new(),
            polka_api_key: None,
            debug: false,
        }
    }
}

impl ChirpConfig {
    /// Parse TOML without consulting the environment.
    pub fn from_toml_str(s: &str) -> ChirpResult<Self> {
        toml::from_str(s).map_err(|e| ChirpError::Config(e.to_string()))
    }

    /// Read a TOML file, apply environment overrides, and validate.
    pub fn load(path: impl AsRef<Path>) -> ChirpResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ChirpError::Config(format!("{}: {e}", path.display())))?;
        let mut config = Self::from_toml_str(&text)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, validated.
    pub fn from_env() -> ChirpResult<Self> {
        let mut config = Self::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Overlay values from `lookup`, keyed by environment variable name.
    /// Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(secret) = get(ENV_JWT_SECRET) {
            self.jwt_secret = secret;
        }
        if let Some(key) = get(ENV_POLKA_API_KEY) {
            self.polka_api_key = Some(key);
        }
        if let Some(path) = get(ENV_DATABASE_PATH) {
            self.database_path = PathBuf::from(path);
        }
    }

    pub fn validate(&self) -> ChirpResult<()> {
        if self.jwt_secret.is_empty() {
            return Err(ChirpError::Config(format!(
                "jwt_secret is empty (set it in the config file or {ENV_JWT_SECRET})"
            )));
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(ChirpError::Config("database_path is empty".into()));
        }
        Ok(())
    }

    /// A token signer using the configured secret and the fixed 1h / 1440h
    /// token lifetimes.
    pub fn signer(&self) -> ChirpResult<TokenSigner> {
        self.validate()?;
        Ok(TokenSigner::new(self.jwt_secret.as_bytes())?)
    }

    /// Open the configured file store, wiping it first in debug mode.
    pub fn open_store(&self) -> ChirpResult<FileSnapshotStore> {
        let store = FileSnapshotStore::new(&self.database_path);
        if self.debug {
            store.reset()?;
            info!(path = %self.database_path.display(), "debug mode: store reset");
        } else {
            store.ensure()?;
        }
        Ok(store)
    }

    /// Check a presented webhook credential against the configured key.
    ///
    /// Returns `false` when no key is configured. The comparison runs in
    /// constant time with respect to the key contents.
    pub fn verify_api_key(&self, presented: &str) -> bool {
        match &self.polka_api_key {
            Some(expected) => expected.as_bytes().ct_eq(presented.as_bytes()).into(),
            None => false,
        }
    }
}

impl std::fmt::Debug for ChirpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChirpConfig")
            .field("database_path", &self.database_path)
            .field("jwt_secret", &"<redacted>")
            .field(
                "polka_api_key",
                &self.polka_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("debug", &self.debug)
            .finish()
    }
}
