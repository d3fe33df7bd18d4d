//! Post Storage
//! Mission: Persist posts, page through them, and gate mutations on ownership

use crate::db::Database;
use crate::posts::guard::{authorize_owner, Forbidden};
use crate::posts::models::{Post, PostPage, PostPatch};
use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::fmt;
use tracing::info;
use uuid::Uuid;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;

const SELECT_POST: &str = "SELECT id, title, content, user_id, created_at FROM posts";

/// Errors from owner-checked post mutations
#[derive(Debug)]
pub enum PostStoreError {
    NotFound(String),
    Forbidden(String),
    Database(anyhow::Error),
}

impl fmt::Display for PostStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "Post not found: {}", id),
            Self::Forbidden(id) => write!(f, "Not the owner of post: {}", id),
            Self::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for PostStoreError {}

impl From<rusqlite::Error> for PostStoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(e.into())
    }
}

/// Post storage on the shared SQLite connection
pub struct PostStore {
    db: Database,
}

impl PostStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Replace missing or zero paging input with the defaults.
    pub fn normalize_paging(page: Option<u32>, limit: Option<u32>) -> (u32, u32) {
        let page = page.filter(|p| *p >= 1).unwrap_or(DEFAULT_PAGE);
        let limit = limit.filter(|l| *l >= 1).unwrap_or(DEFAULT_LIMIT);
        (page, limit)
    }

    /// 1-indexed page of posts, oldest first. Pages past the end are empty.
    pub fn list(&self, page: Option<u32>, limit: Option<u32>) -> anyhow::Result<PostPage> {
        let (page, limit) = Self::normalize_paging(page, limit);
        let offset = u64::from(page - 1) * u64::from(limit);

        let conn = self.db.conn();

        let total: i64 = conn
            .query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))
            .context("Failed to count posts")?;
        let total = total.max(0) as u64;
        let total_pages = total.div_ceil(u64::from(limit));

        let items = if offset >= total {
            Vec::new()
        } else {
            let sql = format!("{} ORDER BY created_at ASC, id ASC LIMIT ?1 OFFSET ?2", SELECT_POST);
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows = stmt
                .query_map(params![i64::from(limit), offset as i64], post_from_row)?
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to load posts page")?;
            rows
        };

        Ok(PostPage {
            items,
            page,
            total,
            total_pages,
        })
    }

    /// Insert a post owned by `owner_id`. Input is expected to be validated.
    pub fn create(&self, title: &str, content: &str, owner_id: &str) -> anyhow::Result<Post> {
        let post = Post {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            content: content.to_string(),
            user_id: owner_id.to_string(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        };

        let conn = self.db.conn();
        conn.execute(
            "INSERT INTO posts (id, title, content, user_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                post.id,
                post.title,
                post.content,
                post.user_id,
                post.created_at,
            ],
        )
        .context("Failed to insert post")?;

        info!("📝 Created post {} for user {}", post.id, post.user_id);
        Ok(post)
    }

    pub fn get(&self, id: &str) -> anyhow::Result<Option<Post>> {
        let conn = self.db.conn();
        fetch_post(&conn, id).context("Failed to load post")
    }

    /// Partial update. Load, ownership check and write share one transaction.
    pub fn update(
        &self,
        id: &str,
        owner_id: &str,
        patch: &PostPatch,
    ) -> Result<Post, PostStoreError> {
        let mut conn = self.db.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut post = load_owned(&tx, id, owner_id)?;

        if let Some(title) = &patch.title {
            post.title = title.clone();
        }
        if let Some(content) = &patch.content {
            post.content = content.clone();
        }

        if !patch.is_empty() {
            tx.execute(
                "UPDATE posts SET title = ?1, content = ?2 WHERE id = ?3",
                params![post.title, post.content, post.id],
            )?;
        }
        tx.commit()?;

        info!("✏️  Updated post {} by {}", id, owner_id);
        Ok(post)
    }

    /// Remove a post. Same transaction discipline as `update`.
    pub fn delete(&self, id: &str, owner_id: &str) -> Result<(), PostStoreError> {
        let mut conn = self.db.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        load_owned(&tx, id, owner_id)?;
        tx.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
        tx.commit()?;

        info!("🗑️  Deleted post {} by {}", id, owner_id);
        Ok(())
    }
}

fn load_owned(conn: &Connection, id: &str, owner_id: &str) -> Result<Post, PostStoreError> {
    let post = fetch_post(conn, id)?.ok_or_else(|| PostStoreError::NotFound(id.to_string()))?;
    authorize_owner(&post, owner_id).map_err(|Forbidden| PostStoreError::Forbidden(id.to_string()))?;
    Ok(post)
}

fn fetch_post(conn: &Connection, id: &str) -> rusqlite::Result<Option<Post>> {
    let sql = format!("{} WHERE id = ?1", SELECT_POST);
    conn.query_row(&sql, params![id], post_from_row).optional()
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        user_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}
