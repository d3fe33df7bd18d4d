//! User Storage
//! Mission: Store user accounts in SQLite with unique emails

use crate::auth::models::User;
use crate::db::Database;
use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use rusqlite::{ffi, params, OptionalExtension, Row};
use std::fmt;
use tracing::{info, warn};
use uuid::Uuid;

const SELECT_USER: &str = "SELECT id, username, email, password_hash, created_at FROM users";

/// Errors from user creation
#[derive(Debug)]
pub enum UserStoreError {
    DuplicateEmail(String),
    Database(anyhow::Error),
}

impl fmt::Display for UserStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateEmail(email) => write!(f, "Email already exists: {}", email),
            Self::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for UserStoreError {}

/// User storage on the shared SQLite connection
pub struct UserStore {
    db: Database,
}

impl UserStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get user by email
    pub fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let conn = self.db.conn();
        let sql = format!("{} WHERE email = ?1", SELECT_USER);
        conn.query_row(&sql, params![email], user_from_row)
            .optional()
            .context("Failed to look up user by email")
    }

    /// Create a new user from an already-hashed password.
    ///
    /// The email check and the insert run under one lock; the UNIQUE index
    /// still backs it for other writers on the same file.
    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, UserStoreError> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        };

        let conn = self.db.conn();

        let taken: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE email = ?1",
                params![email],
                |row| row.get(0),
            )
            .map_err(|e| UserStoreError::Database(e.into()))?;
        if taken > 0 {
            warn!("Signup rejected, email already registered: {}", email);
            return Err(UserStoreError::DuplicateEmail(email.to_string()));
        }

        let inserted = conn.execute(
            "INSERT INTO users (id, username, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id,
                user.username,
                user.email,
                user.password_hash,
                user.created_at,
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                warn!("Signup lost unique-email race: {}", email);
                return Err(UserStoreError::DuplicateEmail(email.to_string()));
            }
            Err(e) => {
                return Err(UserStoreError::Database(
                    anyhow::Error::new(e).context("Failed to insert user"),
                ))
            }
        }

        info!("✅ Created user: {} ({})", user.username, user.id);
        Ok(user)
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
    })
}
