//! Foundation types for Chirp.
//!
//! This crate provides the record types persisted by the Chirp store. Every
//! other Chirp crate depends on `chirp-types`.
//!
//! # Key Types
//!
//! - [`PostId`] / [`UserId`] -- Store-assigned positive integer identifiers
//! - [`Post`] -- A short, profanity-masked message owned by an author
//! - [`UserAccount`] -- A registered account, including its password hash
//! - [`User`] -- The public projection of an account (no password hash)
//! - [`RevokedToken`] -- A permanently denylisted refresh token
//! - [`StoreSnapshot`] -- The entire persisted state, read and written as one unit

pub mod error;
pub mod ids;
pub mod post;
pub mod snapshot;
pub mod token;
pub mod user;

pub use error::TypeError;
pub use ids::{PostId, UserId};
pub use post::{Post, MAX_POST_CHARS};
pub use snapshot::StoreSnapshot;
pub use token::RevokedToken;
pub use user::{PasswordHash, User, UserAccount};
