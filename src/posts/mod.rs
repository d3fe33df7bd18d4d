//! Posts Module
//! Mission: Post storage, ownership guard and HTTP endpoints

pub mod api;
pub mod guard;
pub mod models;
pub mod store;

pub use models::Post;
pub use store::{PostStore, PostStoreError};
