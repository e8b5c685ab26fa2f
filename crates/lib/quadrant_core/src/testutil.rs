//! Test doubles shared by unit and integration tests.

use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;

use crate::auth::AuthError;
use crate::auth::repository::UserRepository;
use crate::clock::Clock;
use crate::models::auth::User;

/// Settable clock so tests can pin and advance time.
#[derive(Debug)]
pub struct ManualClock {
    now_millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            now_millis: AtomicI64::new(start_millis),
        }
    }

    pub fn advance(&self, millis: i64) {
        self.now_millis.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn set(&self, millis: i64) {
        self.now_millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now_millis.load(Ordering::SeqCst)
    }
}

/// In-memory [`UserRepository`] with the same save semantics as the
/// Postgres implementation (insert when `id == 0`, update otherwise).
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
    next_id: AtomicI64,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let users = self.users.read().expect("user lock poisoned");
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, AuthError> {
        let users = self.users.read().expect("user lock poisoned");
        Ok(users.clone())
    }

    async fn save(&self, mut user: User) -> Result<User, AuthError> {
        let mut users = self.users.write().expect("user lock poisoned");
        if user.id == 0 {
            user.id = self.next_id.fetch_add(1, Ordering::SeqCst);
            users.push(user.clone());
        } else if let Some(existing) = users.iter_mut().find(|u| u.id == user.id) {
            *existing = user.clone();
        } else {
            users.push(user.clone());
        }
        Ok(user)
    }

    async fn delete(&self, id: i64) -> Result<(), AuthError> {
        let mut users = self.users.write().expect("user lock poisoned");
        users.retain(|u| u.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;

    #[tokio::test]
    async fn save_assigns_ids_and_updates_in_place() {
        let repo = InMemoryUserRepository::new();
        let user = User {
            id: 0,
            first_name: "A".into(),
            last_name: "B".into(),
            username: "alice".into(),
            password_hash: "hash".into(),
            role: Role::User,
        };

        let mut saved = repo.save(user).await.unwrap();
        assert_eq!(saved.id, 1);

        saved.role = Role::Admin;
        repo.save(saved).await.unwrap();

        let found = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.role, Role::Admin);
        assert_eq!(repo.find_all().await.unwrap().len(), 1);

        repo.delete(1).await.unwrap();
        assert!(repo.find_by_username("alice").await.unwrap().is_none());
    }
}
