use crate::entities::{Role, User};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepositoryTrait {
    async fn create(&self, email: &str, pw_hash: &str) -> Result<User>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn update_password(&self, id: Uuid, new_pw_hash: &str) -> Result<bool>;
    /// `false` when no account has `email`.
    async fn set_role(&self, email: &str, role: Role) -> Result<bool>;
}

#[derive(Clone)]
pub struct UserRepository {
    pool: Pool<Postgres>,
}

impl UserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn create(&self, email: &str, pw_hash: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, pw_hash)
            VALUES ($1, $2)
            RETURNING id, email, pw_hash, role, created_at
            "#,
        )
        .bind(email)
        .bind(pw_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, pw_hash, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_password(&self, id: Uuid, new_pw_hash: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET pw_hash = $1
            WHERE id = $2
            "#,
        )
        .bind(new_pw_hash)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_role(&self, email: &str, role: Role) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET role = $1
            WHERE email = $2
            "#,
        )
        .bind(role.as_str())
        .bind(email)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
