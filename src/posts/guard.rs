//! Authorization Guard
//! Mission: Only a post's owner may change or remove it

use crate::posts::models::Post;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Forbidden;

impl fmt::Display for Forbidden {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "caller does not own this post")
    }
}

impl std::error::Error for Forbidden {}

/// Compare the post's recorded owner with the authenticated user id.
pub fn authorize_owner(post: &Post, user_id: &str) -> Result<(), Forbidden> {
    if post.user_id == user_id {
        Ok(())
    } else {
        Err(Forbidden)
    }
}
