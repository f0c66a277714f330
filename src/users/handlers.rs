use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{MessageResponse, PublicUser, UpdateUserRequest, UpdateUserResponse},
    services::{apply_profile_update, USER_NOT_FOUND},
};
use crate::{
    auth::{
        policy::{can_delete_user, ensure},
        CurrentUser,
    },
    error::{parse_id, AppError, AppResult},
    state::AppState,
    store::UserStore,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state, _me))]
pub async fn list_users(
    State(state): State<AppState>,
    _me: CurrentUser,
) -> AppResult<Json<Vec<PublicUser>>> {
    let users = state.store.list_users().await?;
    Ok(Json(users.iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state, _me))]
pub async fn get_user(
    State(state): State<AppState>,
    _me: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<PublicUser>> {
    let id = parse_id(&id, USER_NOT_FOUND)?;
    let user = state
        .store
        .find_user(id)
        .await?
        .ok_or(AppError::NotFound(USER_NOT_FOUND))?;
    Ok(Json(PublicUser::from(&user)))
}

#[instrument(skip(state, me, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> AppResult<Json<UpdateUserResponse>> {
    let id = parse_id(&id, USER_NOT_FOUND)?;
    let Json(payload) = payload?;
    let user = apply_profile_update(&state, &me, id, payload).await?;
    Ok(Json(UpdateUserResponse::new(&user)))
}

#[instrument(skip(state, me))]
pub async fn delete_user(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    ensure(can_delete_user(&me), "Not authorized as an admin")?;

    let id = parse_id(&id, USER_NOT_FOUND)?;
    if !state.store.delete_user(id).await? {
        return Err(AppError::NotFound(USER_NOT_FOUND));
    }
    info!(user_id = %id, by = %me.id, "user removed");
    Ok(Json(MessageResponse {
        message: "User removed",
    }))
}
