use async_trait::async_trait;
use domains::{DomainError, DomainResult, User, UserRepository};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{parse_column, SqliteStore};
use crate::error::{IntoDomain, StorageError};

const COLUMNS: &str =
    "id, email, username, password_hash, is_premium, plan, premium_expiry_date, created_at";

pub(super) fn user_from_row(row: &SqliteRow) -> Result<User, StorageError> {
    let plan = row
        .try_get::<Option<String>, _>("plan")?
        .map(|p| parse_column("plan", p))
        .transpose()?;
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        is_premium: row.try_get("is_premium")?,
        plan,
        premium_expiry_date: row.try_get("premium_expiry_date")?,
        created_at: row.try_get("created_at")?,
    })
}

impl SqliteStore {
    async fn find_user_where(
        &self,
        column: &str,
        value: impl AsRef<str>,
    ) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM users WHERE {column} = ?"))
            .bind(value.as_ref())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }
}

#[async_trait]
impl UserRepository for SqliteStore {
    async fn insert(&self, user: &User) -> DomainResult<()> {
        sqlx::query(&format!("INSERT INTO users ({COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"))
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.is_premium)
            .bind(user.plan.map(|p| p.as_str()))
            .bind(user.premium_expiry_date)
            .bind(user.created_at)
            .execute(&self.pool)
            .await
            .domain()?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .domain()?;
        row.as_ref().map(user_from_row).transpose().domain()
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        self.find_user_where("email", email).await.domain()
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        self.find_user_where("username", username).await.domain()
    }

    async fn update_profile(&self, user: &User) -> DomainResult<()> {
        let done = sqlx::query("UPDATE users SET email = ?, username = ? WHERE id = ?")
            .bind(&user.email)
            .bind(&user.username)
            .bind(user.id)
            .execute(&self.pool)
            .await
            .domain()?;
        if done.rows_affected() == 0 {
            return Err(DomainError::not_found("user", user.id));
        }
        Ok(())
    }
}
