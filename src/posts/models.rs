//! Post Models

use serde::{Deserialize, Serialize};

/// A stored post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub user_id: String,
    #[serde(skip_serializing, default)]
    pub created_at: String,
}

/// Create body. Optional fields so missing ones become field errors.
#[derive(Debug, Default, Deserialize)]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Update body; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Validated partial update
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

/// One page of posts plus totals for the whole table
#[derive(Debug, Clone)]
pub struct PostPage {
    pub items: Vec<Post>,
    pub page: u32,
    pub total: u64,
    pub total_pages: u64,
}

/// GET /posts/posts response body
#[derive(Debug, Serialize, Deserialize)]
pub struct PostListResponse {
    pub total_posts: u64,
    pub current_page: u32,
    pub total_pages: u64,
    pub posts: Vec<Post>,
}

impl From<PostPage> for PostListResponse {
    fn from(page: PostPage) -> Self {
        Self {
            total_posts: page.total,
            current_page: page.page,
            total_pages: page.total_pages,
            posts: page.items,
        }
    }
}
