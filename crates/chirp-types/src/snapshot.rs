use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::ids::{PostId, UserId};
use crate::post::Post;
use crate::token::RevokedToken;
use crate::user::UserAccount;

/// The entire persisted state of the store, read and written as one unit.
///
/// Invariants:
/// - Ids are positive, unique within their collection, and assigned only
///   through [`allocate_post_id`](Self::allocate_post_id) /
///   [`allocate_user_id`](Self::allocate_user_id).
/// - Allocation never hands out an id at or below the persisted high-water
///   mark, so ids of deleted records are never reused.
/// - The revocation set only grows, except through explicit compaction of
///   entries that could no longer verify anyway.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSnapshot {
    pub posts: BTreeMap<PostId, Post>,
    pub users: BTreeMap<UserId, UserAccount>,
    pub revoked_tokens: BTreeMap<String, RevokedToken>,
    /// Highest post id ever allocated.
    pub last_post_id: u64,
    /// Highest user id ever allocated.
    pub last_user_id: u64,
}

impl StoreSnapshot {
    /// An empty snapshot with no records.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reserve the next post id.
    ///
    /// The next id is one past the larger of the high-water mark and the
    /// highest id actually present, so a snapshot whose counter is stale
    /// (e.g. the file was edited externally) still allocates a fresh id.
    ///
    /// Fails without touching the snapshot once `u64::MAX` has been handed out.
    pub fn allocate_post_id(&mut self) -> Result<PostId, TypeError> {
        let present = self.posts.keys().next_back().map_or(0, |id| id.get());
        let next = next_id(self.last_post_id, present, "post")?;
        self.last_post_id = next;
        Ok(PostId::new(next))
    }

    /// Reserve the next user id. Same rules as [`allocate_post_id`](Self::allocate_post_id).
    pub fn allocate_user_id(&mut self) -> Result<UserId, TypeError> {
        let present = self.users.keys().next_back().map_or(0, |id| id.get());
        let next = next_id(self.last_user_id, present, "user")?;
        self.last_user_id = next;
        Ok(UserId::new(next))
    }

    /// Find an account by exact (case-sensitive) email.
    pub fn user_by_email(&self, email: &str) -> Option<&UserAccount> {
        self.users.values().find(|user| user.email == email)
    }

    /// Returns `true` if the raw token value has been revoked.
    pub fn is_revoked(&self, token: &str) -> bool {
        self.revoked_tokens.contains_key(token)
    }

    /// Total number of records across all collections.
    pub fn record_count(&self) -> usize {
        self.posts.len() + self.users.len() + self.revoked_tokens.len()
    }

    /// Returns `true` if no collection holds any record.
    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }
}

fn next_id(mark: u64, present: u64, collection: &'static str) -> Result<u64, TypeError> {
    mark.max(present)
        .checked_add(1)
        .ok_or(TypeError::IdSpaceExhausted(collection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::PasswordHash;

    fn post(id: u64, author: u64) -> Post {
        Post {
            id: PostId::new(id),
            author_id: UserId::new(author),
            body: format!("post {id}"),
        }
    }

    fn account(id: u64, email: &str) -> UserAccount {
        UserAccount {
            id: UserId::new(id),
            email: email.into(),
            password_hash: PasswordHash::new("h"),
            is_upgraded: false,
        }
    }

    // -----------------------------------------------------------------------
    // Id allocation
    // -----------------------------------------------------------------------

    #[test]
    fn first_ids_start_at_one() {
        let mut snap = StoreSnapshot::empty();
        assert_eq!(snap.allocate_post_id().unwrap(), PostId::new(1));
        assert_eq!(snap.allocate_user_id().unwrap(), UserId::new(1));
    }

    #[test]
    fn allocation_is_monotonic() {
        let mut snap = StoreSnapshot::empty();
        let a = snap.allocate_post_id().unwrap();
        let b = snap.allocate_post_id().unwrap();
        assert!(b > a);
    }

    #[test]
    fn deleted_top_id_is_not_reused() {
        let mut snap = StoreSnapshot::empty();
        let id = snap.allocate_post_id().unwrap();
        snap.posts.insert(id, post(id.get(), 1));
        snap.posts.remove(&id);
        assert_eq!(snap.allocate_post_id().unwrap(), PostId::new(2));
    }

    #[test]
    fn stale_counter_heals_from_contents() {
        // Simulates a file replaced externally: records exist past the counter.
        let mut snap = StoreSnapshot::empty();
        snap.posts.insert(PostId::new(7), post(7, 1));
        snap.users.insert(UserId::new(4), account(4, "a@x.com"));
        assert_eq!(snap.allocate_post_id().unwrap(), PostId::new(8));
        assert_eq!(snap.allocate_user_id().unwrap(), UserId::new(5));
    }

    #[test]
    fn exhausted_id_space_is_an_error_not_a_panic() {
        let mut snap = StoreSnapshot::empty();
        snap.posts.insert(PostId::new(u64::MAX), post(u64::MAX, 1));
        assert_eq!(
            snap.allocate_post_id(),
            Err(TypeError::IdSpaceExhausted("post"))
        );
        assert_eq!(snap.last_post_id, 0);

        snap.last_user_id = u64::MAX;
        assert!(snap.allocate_user_id().is_err());
        assert_eq!(snap.last_user_id, u64::MAX);
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    #[test]
    fn email_lookup_is_case_sensitive() {
        let mut snap = StoreSnapshot::empty();
        snap.users.insert(UserId::new(1), account(1, "a@x.com"));
        assert!(snap.user_by_email("a@x.com").is_some());
        assert!(snap.user_by_email("A@X.COM").is_none());
    }

    #[test]
    fn revocation_lookup() {
        let mut snap = StoreSnapshot::empty();
        snap.revoked_tokens
            .insert("t1".into(), RevokedToken::now("t1"));
        assert!(snap.is_revoked("t1"));
        assert!(!snap.is_revoked("t2"));
    }

    // -----------------------------------------------------------------------
    // Serialization shape
    // -----------------------------------------------------------------------

    #[test]
    fn json_uses_integer_keys_and_snake_case() {
        let mut snap = StoreSnapshot::empty();
        snap.posts.insert(PostId::new(1), post(1, 2));
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains(r#""posts":{"1":{"id":1,"author_id":2"#));
        assert!(json.contains(r#""revoked_tokens":{}"#));
        assert!(json.contains(r#""last_post_id":0"#));
    }

    #[test]
    fn zero_id_key_is_rejected() {
        let json = r#"{"posts":{"0":{"id":0,"author_id":1,"body":"x"}}}"#;
        assert!(serde_json::from_str::<StoreSnapshot>(json).is_err());
    }

    #[test]
    fn missing_collections_decode_empty() {
        let snap: StoreSnapshot = serde_json::from_str("{}").unwrap();
        assert!(snap.is_empty());
        assert_eq!(snap.last_user_id, 0);
    }
}
