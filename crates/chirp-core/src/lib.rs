//! Storage and identity core for Chirp.
//!
//! Ties the snapshot store, the credential vault, and the token signer into
//! the operations a Chirp front end calls:
//!
//! # Key Types
//!
//! - [`PostRepository`] -- create, list, fetch, and delete posts
//! - [`UserRepository`] -- registration, login, profile edits, plan upgrades
//! - [`SessionTokenService`] -- access/refresh tokens and the revocation list
//! - [`ChirpConfig`] -- TOML + environment configuration
//! - [`ChirpError`] -- error taxonomy with HTTP status mapping
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use chirp_core::{ChirpConfig, PostRepository, SessionTokenService, UserRepository};
//!
//! # fn main() -> chirp_core::ChirpResult<()> {
//! let config = ChirpConfig::from_env()?;
//! let store = Arc::new(config.open_store()?);
//! let tokens = SessionTokenService::new(Arc::clone(&store), config.signer()?);
//! let users = UserRepository::new(Arc::clone(&store), tokens);
//! let posts = PostRepository::new(store);
//!
//! let account = users.create("a@x.com", "pw1")?;
//! posts.create(account.id, "hello")?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod posts;
pub mod profanity;
pub mod tokens;
pub mod users;

pub use config::ChirpConfig;
pub use error::{ChirpError, ChirpResult};
pub use posts::{PostRepository, SortOrder};
pub use profanity::mask_profanity;
pub use tokens::SessionTokenService;
pub use users::{SessionTokenPair, UserRepository, UserUpdate};

pub use chirp_types::{Post, PostId, User, UserAccount, UserId};
