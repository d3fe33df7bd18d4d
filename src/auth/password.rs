//! Password Hashing
//! Mission: One-way bcrypt hashing with a per-call salt

use anyhow::{Context, Result};
use tracing::debug;

/// bcrypt only reads this many bytes of input; anything longer is refused
/// rather than silently truncated.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hash a plaintext password. The salt is embedded in the returned string.
pub fn hash_password(plaintext: &str, cost: u32) -> Result<String> {
    anyhow::ensure!(
        plaintext.len() <= MAX_PASSWORD_BYTES,
        "password longer than {} bytes",
        MAX_PASSWORD_BYTES
    );
    bcrypt::hash(plaintext, cost).context("Failed to hash password")
}

/// Check a plaintext password against a stored hash.
///
/// Returns `false` for any mismatch, including a malformed stored hash or a
/// candidate too long to have been hashed.
pub fn verify_password(hash: &str, plaintext: &str) -> bool {
    if plaintext.len() > MAX_PASSWORD_BYTES {
        return false;
    }
    match bcrypt::verify(plaintext, hash) {
        Ok(valid) => valid,
        Err(e) => {
            debug!("Password verification failed on malformed hash: {}", e);
            false
        }
    }
}
