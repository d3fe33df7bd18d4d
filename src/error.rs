//! API error taxonomy
//!
//! Every failure a handler can produce, mapped to a status code and a JSON
//! body of the form `{"message": ...}` (plus `errors` for field validation).

use crate::auth::jwt::TokenError;
use crate::auth::user_store::UserStoreError;
use crate::posts::store::PostStoreError;
use crate::validation::FieldErrors;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    Validation(FieldErrors),
    BadRequest(String),
    DuplicateEmail,
    InvalidCredentials,
    Unauthenticated,
    TokenExpired,
    TokenInvalid,
    Forbidden,
    NotFound,
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) | ApiError::DuplicateEmail => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidCredentials
            | ApiError::Unauthenticated
            | ApiError::TokenExpired
            | ApiError::TokenInvalid => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation(_) => "Validation failed",
            ApiError::BadRequest(msg) => msg,
            ApiError::DuplicateEmail => "Email already exists",
            ApiError::InvalidCredentials => "Invalid email or password",
            ApiError::Unauthenticated => "Missing authorization token",
            ApiError::TokenExpired => "Token has expired",
            ApiError::TokenInvalid => "Invalid token",
            ApiError::Forbidden => "You do not own this post",
            ApiError::NotFound => "Post not found",
            ApiError::Internal(_) => "Internal server error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Validation(errors) => json!({
                "message": self.message(),
                "errors": errors,
            }),
            ApiError::Internal(err) => {
                error!("Internal error: {:#}", err);
                json!({ "message": self.message() })
            }
            _ => json!({ "message": self.message() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => ApiError::TokenExpired,
            TokenError::Invalid => ApiError::TokenInvalid,
        }
    }
}

impl From<UserStoreError> for ApiError {
    fn from(err: UserStoreError) -> Self {
        match err {
            UserStoreError::DuplicateEmail(_) => ApiError::DuplicateEmail,
            UserStoreError::Database(e) => ApiError::Internal(e),
        }
    }
}

impl From<PostStoreError> for ApiError {
    fn from(err: PostStoreError) -> Self {
        match err {
            PostStoreError::NotFound(_) => ApiError::NotFound,
            PostStoreError::Forbidden(_) => ApiError::Forbidden,
            PostStoreError::Database(e) => ApiError::Internal(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
