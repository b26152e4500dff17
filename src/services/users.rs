use std::sync::Arc;

use crate::auth::password::{hash_password_blocking, verify_password_blocking};
use crate::error::AppError;
use crate::metrics;
use crate::models::{NewUser, User};
use crate::store::UserStore;

const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Registration, lookup and credential checks for user accounts.
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn UserStore>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Hashes the password and inserts the user. Duplicate username or email
    /// surface as `AppError::Conflict`, decided by the store's unique constraints.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: String,
    ) -> Result<User, AppError> {
        let password_hash = hash_password_blocking(password).await?;
        let user = self
            .store
            .create(NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await?;
        log::info!("registered user {}", user.id);
        metrics::record_registration();
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        self.store
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".into()))
    }

    pub async fn find_by_id(&self, id: i64) -> Result<User, AppError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".into()))
    }

    /// Returns the user if `password` matches. An unknown email and a wrong
    /// password are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: String) -> Result<User, AppError> {
        let user = match self.find_by_email(email).await {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => {
                metrics::record_login(false);
                return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
            }
            Err(e) => return Err(e),
        };

        let matches = verify_password_blocking(password, user.password_hash.clone()).await;
        metrics::record_login(matches);
        if matches {
            Ok(user)
        } else {
            log::info!("failed login for user {}", user.id);
            Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()))
        }
    }
}
