//! Postboard Backend Library
//!
//! User registration and login with JWT access/refresh tokens, and
//! owner-gated CRUD over posts. The binary in `main.rs` only wires
//! configuration, logging and the listener around `app::build_router`.

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod posts;
pub mod validation;

pub use app::{build_router, cors_layer, AppState};
pub use config::Config;
pub use db::Database;
pub use error::ApiError;
