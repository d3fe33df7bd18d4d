//! JWT Token Handler
//! Mission: Issue and validate access and refresh tokens

use crate::auth::models::{Claims, TokenType};
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use std::fmt;
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_ACCESS_TTL_MINUTES: i64 = 15;
pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 30;

/// Token verification failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    Invalid,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Expired => write!(f, "Token has expired"),
            TokenError::Invalid => write!(f, "Invalid token"),
        }
    }
}

impl std::error::Error for TokenError {}

/// JWT Handler for token operations
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key and default lifetimes
    pub fn new(secret: &str) -> Self {
        Self::with_ttls(
            secret,
            Duration::minutes(DEFAULT_ACCESS_TTL_MINUTES),
            Duration::days(DEFAULT_REFRESH_TTL_DAYS),
        )
    }

    pub fn with_ttls(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Short-lived token proving identity on each request
    pub fn issue_access_token(&self, user_id: &str) -> Result<String> {
        self.issue(user_id, TokenType::Access, self.access_ttl)
    }

    /// Long-lived token used only to mint new access tokens
    pub fn issue_refresh_token(&self, user_id: &str) -> Result<String> {
        self.issue(user_id, TokenType::Refresh, self.refresh_ttl)
    }

    fn issue(&self, user_id: &str, token_type: TokenType, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(ttl)
            .context("Invalid timestamp")?
            .timestamp();

        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expiration,
            jti: Uuid::new_v4().to_string(),
            token_type,
        };

        debug!(
            "Generating {} JWT for user {}, expires in {}s",
            token_type.as_str(),
            user_id,
            ttl.num_seconds()
        );

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to generate JWT")
    }

    /// Check signature, expiry and token kind; return the subject user id.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<String, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let decoded = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        if decoded.claims.token_type != expected {
            debug!(
                "Rejected {} token where {} was required",
                decoded.claims.token_type.as_str(),
                expected.as_str()
            );
            return Err(TokenError::Invalid);
        }

        if decoded.claims.sub.is_empty() {
            return Err(TokenError::Invalid);
        }

        Ok(decoded.claims.sub)
    }

    pub fn verify_access(&self, token: &str) -> Result<String, TokenError> {
        self.verify(token, TokenType::Access)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<String, TokenError> {
        self.verify(token, TokenType::Refresh)
    }

    /// Trade a valid refresh token for a new access token bound to the same user.
    pub fn refresh(&self, refresh_token: &str) -> Result<String, TokenError> {
        let user_id = self.verify_refresh(refresh_token)?;
        self.issue_access_token(&user_id)
            .map_err(|_| TokenError::Invalid)
    }
}
