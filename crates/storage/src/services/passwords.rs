use uuid::Uuid;

use crate::error::Result;

/// Hashes `password` into an encoded argon2 string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = Uuid::new_v4();
    let config = argon2::Config::default();
    let encoded = argon2::hash_encoded(password.as_bytes(), salt.as_bytes(), &config)?;
    Ok(encoded)
}

pub fn verify_password(encoded: &str, password: &str) -> Result<bool> {
    Ok(argon2::verify_encoded(encoded, password.as_bytes())?)
}
