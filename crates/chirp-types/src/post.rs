use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::ids::{PostId, UserId};

/// Maximum length of a post body, counted in characters (not bytes).
pub const MAX_POST_CHARS: usize = 140;

/// A short message published by a user.
///
/// Posts are immutable once created; the only lifecycle transition is
/// deletion by their author. `author_id` is a weak reference: removing the
/// author does not cascade to their posts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub body: String,
}

impl Post {
    /// Check a raw body against the length limit.
    pub fn validate_body(body: &str) -> Result<(), TypeError> {
        let actual = body.chars().count();
        if actual > MAX_POST_CHARS {
            return Err(TypeError::BodyTooLong {
                max: MAX_POST_CHARS,
                actual,
            });
        }
        Ok(())
    }

    /// Returns `true` if `user` authored this post.
    pub fn is_authored_by(&self, user: UserId) -> bool {
        self.author_id == user
    }
}
