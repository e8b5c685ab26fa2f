//! User repository abstraction and its Postgres implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use super::AuthError;
use crate::models::auth::{Role, User};

/// Narrow persistence seam for the user population.
///
/// `save` inserts when `user.id == 0` and updates otherwise, returning the
/// stored row either way.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;
    async fn find_all(&self) -> Result<Vec<User>, AuthError>;
    async fn save(&self, user: User) -> Result<User, AuthError>;
    async fn delete(&self, id: i64) -> Result<(), AuthError>;
}

/// Postgres-backed repository over the `users` table.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

type UserRow = (i64, String, String, String, String, String);

fn row_to_user(row: UserRow) -> Result<User, AuthError> {
    let (id, first_name, last_name, username, password_hash, role) = row;
    let role = Role::from_authority(&role)
        .ok_or_else(|| AuthError::Internal(format!("unknown role '{role}' for user {id}")))?;
    Ok(User {
        id,
        first_name,
        last_name,
        username,
        password_hash,
        role,
    })
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, first_name, last_name, username, password_hash, role \
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        row.map(row_to_user).transpose()
    }

    async fn find_all(&self) -> Result<Vec<User>, AuthError> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, first_name, last_name, username, password_hash, role \
             FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(row_to_user).collect()
    }

    async fn save(&self, user: User) -> Result<User, AuthError> {
        if user.id == 0 {
            let id = sqlx::query_scalar::<_, i64>(
                "INSERT INTO users (first_name, last_name, username, password_hash, role) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING id",
            )
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.role.authority())
            .fetch_one(&self.pool)
            .await?;
            Ok(User { id, ..user })
        } else {
            sqlx::query(
                "UPDATE users SET first_name = $2, last_name = $3, username = $4, \
                 password_hash = $5, role = $6 WHERE id = $1",
            )
            .bind(user.id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.role.authority())
            .execute(&self.pool)
            .await?;
            Ok(user)
        }
    }

    async fn delete(&self, id: i64) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
