use crate::error::AppError;
use bcrypt::{hash, verify};

/// bcrypt work factor for stored credentials.
pub const PASSWORD_COST: u32 = 10;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, PASSWORD_COST)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Checks `password` against a stored bcrypt hash. A malformed hash counts as a
/// mismatch.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    match verify(password, hashed_password) {
        Ok(matches) => matches,
        Err(e) => {
            log::warn!("password verification failed on stored hash: {}", e);
            false
        }
    }
}

/// Runs the hash on the blocking pool; bcrypt is CPU bound.
pub async fn hash_password_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::InternalServerError(format!("Hashing task failed: {}", e)))?
}

pub async fn verify_password_blocking(password: String, hashed_password: String) -> bool {
    match tokio::task::spawn_blocking(move || verify_password(&password, &hashed_password)).await {
        Ok(matches) => matches,
        Err(e) => {
            log::error!("verification task failed: {}", e);
            false
        }
    }
}
