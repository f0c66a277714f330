//! Permission decisions over an already-resolved identity. Callers look the
//! resource up first, so a missing resource is a 404 before it can be a 403.

use uuid::Uuid;

use super::extractors::CurrentUser;
use crate::{
    error::{AppError, AppResult},
    tasks::repo_types::Task,
    users::repo_types::Role,
};

/// Only the owner may touch a task. Admins get no override here.
pub fn owns_task(identity: &CurrentUser, task: &Task) -> bool {
    task.user_id == identity.id
}

pub fn can_modify_user(identity: &CurrentUser, target: Uuid) -> bool {
    identity.id == target || identity.role == Role::Admin
}

/// Deletion is admin-only, including one's own account.
pub fn can_delete_user(identity: &CurrentUser) -> bool {
    identity.role == Role::Admin
}

pub fn ensure(allowed: bool, message: &'static str) -> AppResult<()> {
    if allowed {
        Ok(())
    } else {
        Err(AppError::Forbidden(message))
    }
}
