//! Process configuration
//!
//! Command-line flags with environment fallbacks. `.env` files are loaded
//! before parsing so they feed the `env` lookups.

use crate::auth::jwt::{DEFAULT_ACCESS_TTL_MINUTES, DEFAULT_REFRESH_TTL_DAYS};
use crate::auth::JwtHandler;
use anyhow::Context;
use clap::Parser;

pub const DEV_JWT_SECRET: &str = "dev-secret-change-in-production-minimum-32-characters";

/// One week
pub const MAX_ACCESS_TTL_MINUTES: i64 = 7 * 24 * 60;
pub const MAX_REFRESH_TTL_DAYS: i64 = 365;

#[derive(Parser, Debug, Clone)]
#[command(name = "postboard")]
#[command(about = "Postboard backend - user accounts and owner-gated posts")]
pub struct Config {
    /// Address to bind the HTTP server to
    #[arg(long = "bind", env = "BIND_ADDR", default_value = "0.0.0.0:5000")]
    pub bind_addr: String,

    /// Path to the SQLite database file
    #[arg(long, env = "DATABASE_PATH", default_value = "postboard.db")]
    pub database_path: String,

    /// HMAC secret for signing tokens
    #[arg(long, env = "JWT_SECRET", default_value = DEV_JWT_SECRET, hide_env_values = true)]
    pub jwt_secret: String,

    /// Access token lifetime in minutes
    #[arg(long, env = "JWT_ACCESS_TTL_MINUTES", default_value_t = DEFAULT_ACCESS_TTL_MINUTES)]
    pub access_ttl_minutes: i64,

    /// Refresh token lifetime in days
    #[arg(long, env = "JWT_REFRESH_TTL_DAYS", default_value_t = DEFAULT_REFRESH_TTL_DAYS)]
    pub refresh_ttl_days: i64,

    /// bcrypt work factor for new password hashes
    #[arg(long, env = "BCRYPT_COST", default_value_t = bcrypt::DEFAULT_COST)]
    pub bcrypt_cost: u32,

    /// Allowed CORS origin (`*` for any, without credentials)
    #[arg(long, env = "CORS_ORIGIN", default_value = "http://localhost:5173")]
    pub cors_origin: String,
}

impl Config {
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn jwt_handler(&self) -> anyhow::Result<JwtHandler> {
        let access_ttl = chrono::Duration::try_minutes(self.access_ttl_minutes)
            .context("access token lifetime out of range")?;
        let refresh_ttl = chrono::Duration::try_days(self.refresh_ttl_days)
            .context("refresh token lifetime out of range")?;
        Ok(JwtHandler::with_ttls(&self.jwt_secret, access_ttl, refresh_ttl))
    }

    /// Reject values that would make the server unusable.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            (1..=MAX_ACCESS_TTL_MINUTES).contains(&self.access_ttl_minutes),
            "access token lifetime must be between 1 and {} minutes",
            MAX_ACCESS_TTL_MINUTES
        );
        anyhow::ensure!(
            (1..=MAX_REFRESH_TTL_DAYS).contains(&self.refresh_ttl_days),
            "refresh token lifetime must be between 1 and {} days",
            MAX_REFRESH_TTL_DAYS
        );
        anyhow::ensure!(
            (4..=31).contains(&self.bcrypt_cost),
            "bcrypt cost must be between 4 and 31"
        );
        anyhow::ensure!(!self.jwt_secret.is_empty(), "JWT secret must not be empty");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["postboard"]).unwrap();
        assert_eq!(config.access_ttl_minutes, 15);
        assert_eq!(config.refresh_ttl_days, 30);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        config.validate().unwrap();
    }

    #[test]
    fn test_flags_override() {
        let config = Config::try_parse_from([
            "postboard",
            "--bind",
            "127.0.0.1:9000",
            "--database-path",
            "/tmp/x.db",
            "--jwt-secret",
            "s3cret",
            "--access-ttl-minutes",
            "60",
            "--bcrypt-cost",
            "4",
        ])
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.database_path, "/tmp/x.db");
        assert!(!config.uses_dev_secret());
        assert_eq!(config.access_ttl_minutes, 60);

        let jwt = config.jwt_handler().unwrap();
        let token = jwt.issue_access_token("u").unwrap();
        assert_eq!(jwt.verify_access(&token).unwrap(), "u");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::try_parse_from(["postboard", "--bcrypt-cost", "4"]).unwrap();
        config.access_ttl_minutes = 0;
        assert!(config.validate().is_err());

        let config = Config::try_parse_from(["postboard", "--bcrypt-cost", "2"]).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_huge_lifetimes_are_rejected_without_panicking() {
        let config = Config::try_parse_from([
            "postboard",
            "--access-ttl-minutes",
            "9223372036854775807",
            "--refresh-ttl-days",
            "9223372036854775807",
        ])
        .unwrap();
        assert!(config.validate().is_err());
        assert!(config.jwt_handler().is_err());

        let config = Config::try_parse_from([
            "postboard",
            "--access-ttl-minutes",
            "10081",
            "--bcrypt-cost",
            "4",
        ])
        .unwrap();
        assert!(config.validate().is_err());

        let config = Config::try_parse_from([
            "postboard",
            "--access-ttl-minutes",
            "10080",
            "--refresh-ttl-days",
            "365",
            "--bcrypt-cost",
            "4",
        ])
        .unwrap();
        config.validate().unwrap();
        assert!(config.jwt_handler().is_ok());
    }
}
