use std::str::FromStr;
use std::sync::Arc;

use chirp_store::SnapshotStore;
use chirp_types::{Post, PostId, UserId};
use tracing::debug;

use crate::error::{ChirpError, ChirpResult};
use crate::profanity::mask_profanity;

/// Ordering of [`PostRepository::list`] results by post id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = ChirpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(ChirpError::Validation(format!(
                "unknown sort order '{other}', expected 'asc' or 'desc'"
            ))),
        }
    }
}

/// Create, list, fetch, and delete posts.
pub struct PostRepository<S> {
    store: Arc<S>,
}

impl<S: SnapshotStore> PostRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Publish a post by `author`.
    ///
    /// The length limit applies to the body as submitted; the stored body has
    /// profane words masked.
    pub fn create(&self, author: UserId, body: &str) -> ChirpResult<Post> {
        Post::validate_body(body)?;
        let body = mask_profanity(body);
        let post = self.store.update(|snap| -> ChirpResult<Post> {
            let id = snap.allocate_post_id()?;
            let post = Post {
                id,
                author_id: author,
                body,
            };
            snap.posts.insert(id, post.clone());
            Ok(post)
        })?;
        debug!(post_id = %post.id, author_id = %author, "created post");
        Ok(post)
    }

    /// All posts, optionally restricted to one author, ordered by id.
    pub fn list(&self, author: Option<UserId>, order: SortOrder) -> ChirpResult<Vec<Post>> {
        let snap = self.store.load()?;
        let mut posts: Vec<Post> = snap
            .posts
            .into_values()
            .filter(|post| author.map_or(true, |a| post.is_authored_by(a)))
            .collect();
        if order == SortOrder::Desc {
            posts.reverse();
        }
        Ok(posts)
    }

    pub fn get_by_id(&self, id: PostId) -> ChirpResult<Post> {
        self.store
            .load()?
            .posts
            .remove(&id)
            .ok_or_else(|| ChirpError::NotFound(format!("post {id}")))
    }

    /// Delete a post. Only its author may do so.
    pub fn delete(&self, id: PostId, requester: UserId) -> ChirpResult<()> {
        self.store.update(|snap| -> ChirpResult<()> {
            let post = snap
                .posts
                .get(&id)
                .ok_or_else(|| ChirpError::NotFound(format!("post {id}")))?;
            if !post.is_authored_by(requester) {
                return Err(ChirpError::Forbidden(format!(
                    "user {requester} is not the author of post {id}"
                )));
            }
            snap.posts.remove(&id);
            Ok(())
        })?;
        debug!(post_id = %id, "deleted post");
        Ok(())
    }
}

impl<S> Clone for PostRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}
