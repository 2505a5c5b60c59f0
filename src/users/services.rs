use time::OffsetDateTime;
use tracing::{debug, info};

use crate::{
    error::AppError,
    password::CredentialHasher,
    patch::ensure_not_empty,
    users::{
        dto::{CreateUserRequest, UserPatch},
        repo::{UserStore, USER_COLUMNS},
        repo_types::{NewUser, User},
    },
    validation::{require, validate, validate_partial, FieldRule, Rule},
};

/// Path and URL specials that may not appear in a username.
const USERNAME_DENY: &str = "/\\?#%&=+:;@<>\"'";

pub const USER_RULES: &[FieldRule] = &[
    FieldRule::new(
        "username",
        Rule::new()
            .required()
            .length(6, 20)
            .deny(USERNAME_DENY)
            .deny_whitespace(),
    ),
    FieldRule::new("password", Rule::new().required().length(8, 128)),
];

pub async fn create(
    store: &dyn UserStore,
    hasher: &CredentialHasher,
    req: CreateUserRequest,
) -> Result<i64, AppError> {
    validate(&req, USER_RULES)?;
    let username = require(req.username, "username")?;
    let password = require(req.password, "password")?;

    let password_hash = hasher.hash_blocking(password).await?;
    let now = OffsetDateTime::now_utc();
    let id = store
        .insert(&NewUser {
            username,
            password_hash,
            created_at: now,
            updated_at: now,
        })
        .await?;
    info!(user_id = id, "user created");
    Ok(id)
}

pub async fn get(store: &dyn UserStore, id: i64) -> Result<User, AppError> {
    store
        .find(id)
        .await?
        .ok_or(AppError::NotFound { entity: "user", id })
}

pub async fn list(store: &dyn UserStore) -> Result<Vec<User>, AppError> {
    let users = store.list().await?;
    debug!(count = users.len(), "users listed");
    Ok(users)
}

pub async fn update(
    store: &dyn UserStore,
    hasher: &CredentialHasher,
    id: i64,
    mut patch: UserPatch,
) -> Result<(), AppError> {
    validate_partial(&patch, USER_RULES)?;
    ensure_not_empty(&patch, &USER_COLUMNS)?;
    if let Some(plain) = patch.password.take() {
        patch.password = Some(hasher.hash_blocking(plain).await?);
    }

    let rows = store.update(id, &patch).await?;
    if rows == 0 {
        return Err(AppError::NotFound { entity: "user", id });
    }
    info!(user_id = id, "user updated");
    Ok(())
}

/// Deleting a missing user is not an error.
pub async fn delete(store: &dyn UserStore, id: i64) -> Result<(), AppError> {
    let rows = store.delete(id).await?;
    debug!(user_id = id, rows, "user deleted");
    Ok(())
}
