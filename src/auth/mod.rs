//! Authentication Module
//! Mission: Password hashing, JWT access/refresh tokens, and request authentication

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod user_store;

pub use jwt::{JwtHandler, TokenError};
pub use middleware::{auth_middleware, AuthUser};
pub use user_store::UserStore;
