use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    error::AppError,
    extractors::{JsonBody, ResourceId},
    state::AppState,
    users::{
        dto::{CreateUserRequest, CreatedUser, UserPatch},
        repo_types::User,
        services,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user", post(create_user))
        .route(
            "/user/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users", get(list_users))
}

#[instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = services::create(state.users.as_ref(), &state.hasher, payload)
        .await
        .inspect_err(|e| e.log("create user", None))?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/user/{id}"))],
        Json(CreatedUser { id }),
    ))
}

#[instrument(skip_all, fields(user_id = id))]
pub async fn get_user(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<Json<User>, AppError> {
    let user = services::get(state.users.as_ref(), id)
        .await
        .inspect_err(|e| e.log("get user", Some(id)))?;
    Ok(Json(user))
}

/// 204 when there are no users yet.
#[instrument(skip_all)]
pub async fn list_users(State(state): State<AppState>) -> Result<Response, AppError> {
    let users = services::list(state.users.as_ref())
        .await
        .inspect_err(|e| e.log("list users", None))?;
    if users.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    Ok(Json(users).into_response())
}

#[instrument(skip_all, fields(user_id = id))]
pub async fn update_user(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    JsonBody(patch): JsonBody<UserPatch>,
) -> Result<StatusCode, AppError> {
    services::update(state.users.as_ref(), &state.hasher, id, patch)
        .await
        .inspect_err(|e| e.log("update user", Some(id)))?;
    Ok(StatusCode::OK)
}

#[instrument(skip_all, fields(user_id = id))]
pub async fn delete_user(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> Result<StatusCode, AppError> {
    services::delete(state.users.as_ref(), id)
        .await
        .inspect_err(|e| e.log("delete user", Some(id)))?;
    Ok(StatusCode::OK)
}
