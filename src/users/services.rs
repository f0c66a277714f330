use tracing::info;
use uuid::Uuid;

use super::{dto::UpdateUserRequest, repo_types::User};
use crate::{
    auth::{
        password::hash_password,
        policy::{can_modify_user, ensure},
        services::{is_valid_email, normalize_email, validate_password},
        CurrentUser,
    },
    error::{AppError, AppResult},
    state::AppState,
    store::UserStore,
};

pub const USER_NOT_FOUND: &str = "User not found";

fn provided(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Applies a partial profile update to `target` on behalf of `me`.
pub async fn apply_profile_update(
    state: &AppState,
    me: &CurrentUser,
    target: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<User> {
    let mut user = state
        .store
        .find_user(target)
        .await?
        .ok_or(AppError::NotFound(USER_NOT_FOUND))?;

    ensure(
        can_modify_user(me, user.id),
        "Not authorized to update this user",
    )?;

    if let Some(name) = provided(payload.name) {
        user.name = name;
    }

    if let Some(email) = provided(payload.email) {
        let email = normalize_email(&email);
        if !is_valid_email(&email) {
            return Err(AppError::validation("Please provide a valid email"));
        }
        if email != user.email {
            if let Some(existing) = state.store.find_user_by_email(&email).await? {
                if existing.id != user.id {
                    return Err(AppError::DuplicateEmail);
                }
            }
        }
        user.email = email;
    }

    if let Some(password) = payload.password.filter(|p| !p.is_empty()) {
        validate_password(&password)?;
        user.password_hash = hash_password(&password)?;
    }

    let updated = state
        .store
        .update_user(&user)
        .await?
        .ok_or(AppError::NotFound(USER_NOT_FOUND))?;
    info!(user_id = %updated.id, by = %me.id, "user updated");
    Ok(updated)
}
