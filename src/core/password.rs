//! Default credentials for imported accounts

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::Rng;
use thiserror::Error;

/// Prefix of the initial password given to imported users
pub const DEFAULT_PASSWORD_PREFIX: &str = "CollabSphere@";

/// Initial password for an imported account: the prefix plus the email's local part
pub fn default_password(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    format!("{}{}", DEFAULT_PASSWORD_PREFIX, local)
}

/// Hash a password into an Argon2id PHC string
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    let salt = SaltString::encode_b64(&bytes).map_err(|e| PasswordError(e.to_string()))?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordError(String);
