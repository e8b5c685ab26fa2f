//! User administration service.

use std::sync::Arc;

use quadrant_core::auth::password::PasswordHasher;
use quadrant_core::auth::repository::UserRepository;
use quadrant_core::models::auth::{Role, User};

use crate::error::AppResult;

/// Admin-facing user management over the repository.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordHasher>) -> Self {
        Self { users, passwords }
    }

    /// Persist a user, hashing the supplied plaintext password first.
    pub async fn save_user(
        &self,
        first_name: &str,
        last_name: &str,
        username: &str,
        password: &str,
        role: Role,
    ) -> AppResult<User> {
        let password_hash = self.passwords.hash(password)?;
        // Update in place when the username is already taken.
        let id = match self.users.find_by_username(username).await? {
            Some(existing) => existing.id,
            None => 0,
        };
        let user = self
            .users
            .save(User {
                id,
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                username: username.to_string(),
                password_hash,
                role,
            })
            .await?;
        Ok(user)
    }

    pub async fn list_all_users(&self) -> AppResult<Vec<User>> {
        Ok(self.users.find_all().await?)
    }

    pub async fn delete_user(&self, id: i64) -> AppResult<()> {
        Ok(self.users.delete(id).await?)
    }
}
