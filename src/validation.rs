//! Request validation
//!
//! Explicit checks over the raw request bodies. Each validator either returns
//! the typed, trusted value or a `FieldErrors` map naming every bad field.

use crate::auth::models::SignupRequest;
use crate::auth::password::MAX_PASSWORD_BYTES;
use crate::posts::models::{CreatePostRequest, PostPatch, UpdatePostRequest};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

pub const USERNAME_MIN_CHARS: usize = 3;
pub const USERNAME_MAX_CHARS: usize = 50;
pub const PASSWORD_MIN_CHARS: usize = 6;
pub const TITLE_MAX_CHARS: usize = 255;

const MISSING: &str = "Missing data for required field.";

/// Field name -> list of messages, serialized as `{"field": ["msg"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for FieldErrors {}

/// Validated signup input
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Validated post input
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
}

pub fn validate_signup(req: SignupRequest) -> Result<NewUser, FieldErrors> {
    let mut errors = FieldErrors::new();

    match req.username.as_deref() {
        None => errors.add("username", MISSING),
        Some(username) => {
            let len = username.chars().count();
            if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&len) {
                errors.add(
                    "username",
                    format!(
                        "Length must be between {} and {}.",
                        USERNAME_MIN_CHARS, USERNAME_MAX_CHARS
                    ),
                );
            }
        }
    }

    match req.email.as_deref() {
        None => errors.add("email", MISSING),
        Some(email) if !is_valid_email(email) => errors.add("email", "Not a valid email address."),
        Some(_) => {}
    }

    match req.password.as_deref() {
        None => errors.add("password", MISSING),
        Some(password) if password.chars().count() < PASSWORD_MIN_CHARS => errors.add(
            "password",
            format!("Shorter than minimum length {}.", PASSWORD_MIN_CHARS),
        ),
        Some(password) if password.len() > MAX_PASSWORD_BYTES => errors.add(
            "password",
            format!("Longer than maximum length {}.", MAX_PASSWORD_BYTES),
        ),
        Some(_) => {}
    }

    errors.into_result(|| NewUser {
        username: req.username.unwrap_or_default(),
        email: req.email.unwrap_or_default(),
        password: req.password.unwrap_or_default(),
    })
}

pub fn validate_new_post(req: CreatePostRequest) -> Result<NewPost, FieldErrors> {
    let mut errors = FieldErrors::new();

    match req.title.as_deref() {
        None => errors.add("title", MISSING),
        Some(title) => check_title(title, &mut errors),
    }
    match req.content.as_deref() {
        None => errors.add("content", MISSING),
        Some(content) => check_content(content, &mut errors),
    }

    errors.into_result(|| NewPost {
        title: req.title.unwrap_or_default(),
        content: req.content.unwrap_or_default(),
    })
}

/// Only fields that are present are checked; absent ones stay unchanged.
pub fn validate_post_patch(req: UpdatePostRequest) -> Result<PostPatch, FieldErrors> {
    let mut errors = FieldErrors::new();

    if let Some(title) = req.title.as_deref() {
        check_title(title, &mut errors);
    }
    if let Some(content) = req.content.as_deref() {
        check_content(content, &mut errors);
    }

    errors.into_result(|| PostPatch {
        title: req.title,
        content: req.content,
    })
}

fn check_title(title: &str, errors: &mut FieldErrors) {
    if title.chars().count() > TITLE_MAX_CHARS {
        errors.add(
            "title",
            format!("Longer than maximum length {}.", TITLE_MAX_CHARS),
        );
    }
}

fn check_content(content: &str, errors: &mut FieldErrors) {
    if content.is_empty() {
        errors.add("content", "Field may not be empty.");
    }
}

/// Shape check only: `local@domain.tld`, no whitespace, non-empty labels.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return false;
    }
    domain.split('.').all(|label| !label.is_empty())
}
