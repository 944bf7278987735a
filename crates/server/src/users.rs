use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use api_types::{
    Detail, PageQuery,
    user::{UserNew, UserUpdate, UserView},
};
use engine::{EngineError, NewUserCmd, UpdateUserCmd, User};

use crate::{
    ServerError,
    server::ServerState,
    views::{page, user_view, user_views},
};

/// `POST /users/`. A taken username or email is a plain 400 here, unlike
/// account updates which report it as 409.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<Json<UserView>, ServerError> {
    let user = state
        .engine
        .create_user(NewUserCmd::new(
            payload.username,
            payload.email,
            payload.password,
        ))
        .await
        .map_err(|err| match err {
            EngineError::ExistingKey(key) => {
                ServerError::Generic(format!("\"{key}\" is already registered"))
            }
            other => other.into(),
        })?;
    Ok(Json(user_view(user, Vec::new())))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<UserView>>, ServerError> {
    let users = state.engine.users(page(query)).await?;
    let ids: Vec<Uuid> = users.iter().map(|user| user.id).collect();
    let items = state.engine.items_by_owners(&ids).await?;
    Ok(Json(user_views(users, items)))
}

pub async fn me(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<UserView>, ServerError> {
    let items = state.engine.items_by_owner(user.id).await?;
    Ok(Json(user_view(user, items)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserView>, ServerError> {
    let mut cmd = UpdateUserCmd::new(user_id, user.id);
    if let Some(username) = payload.username {
        cmd = cmd.username(username);
    }
    if let Some(email) = payload.email {
        cmd = cmd.email(email);
    }
    if let Some(password) = payload.password {
        cmd = cmd.password(password);
    }
    let updated = state.engine.update_user(cmd).await?;
    let items = state.engine.items_by_owner(updated.id).await?;
    Ok(Json(user_view(updated, items)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Detail>, ServerError> {
    state.engine.delete_user(user_id, user.id).await?;
    Ok(Json(Detail {
        detail: "User deleted".to_string(),
    }))
}
