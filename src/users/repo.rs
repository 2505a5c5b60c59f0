use async_trait::async_trait;

use crate::{
    db::{execute_patch, map_db_error, PgStore},
    error::AppError,
    patch::{build_patch, Column, ColumnMap},
    users::{
        dto::UserPatch,
        repo_types::{NewUser, User},
    },
};

pub const USER_COLUMNS: ColumnMap = ColumnMap {
    table: "users",
    id_column: "id",
    columns: &[
        Column::immutable("id", "id"),
        Column::mutable("username", "username"),
        Column::mutable("password", "password"),
        Column::immutable("created_at", "created_at"),
    ],
    updated_at: Some("updated_at"),
};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Returns the assigned id.
    async fn insert(&self, user: &NewUser) -> Result<i64, AppError>;
    async fn find(&self, id: i64) -> Result<Option<User>, AppError>;
    /// All users in creation order.
    async fn list(&self) -> Result<Vec<User>, AppError>;
    /// Applies a patch whose password, if any, is already hashed. Returns affected rows.
    async fn update(&self, id: i64, patch: &UserPatch) -> Result<u64, AppError>;
    /// Returns affected rows; bookings of the user go with it.
    async fn delete(&self, id: i64) -> Result<u64, AppError>;
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert(&self, user: &NewUser) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (username, password, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.db)
        .await
        .map_err(map_db_error)
    }

    async fn find(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, created_at, updated_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }

    async fn update(&self, id: i64, patch: &UserPatch) -> Result<u64, AppError> {
        let stmt = build_patch(patch, &USER_COLUMNS, id)?;
        execute_patch(&self.db, &stmt).await
    }

    async fn delete(&self, id: i64) -> Result<u64, AppError> {
        let done = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(done.rows_affected())
    }
}
