//! Persistence seam. Handlers and the auth core only see these traits; the
//! concrete backend is picked once at startup and injected through `AppState`.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    tasks::repo_types::{NewTask, Task},
    users::repo_types::{NewUser, User},
};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique email constraint violated on insert or update.
    #[error("email already registered")]
    DuplicateEmail,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Credential store. Emails are compared case-insensitively.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// Oldest first.
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn insert_user(&self, new: NewUser) -> StoreResult<User>;
    /// Writes name, email, password hash and role, and bumps `updated_at`.
    /// `None` if the user no longer exists.
    async fn update_user(&self, user: &User) -> StoreResult<Option<User>>;
    /// Removes the user together with every task they own.
    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, new: NewTask) -> StoreResult<Task>;
    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>>;
    /// Newest first.
    async fn list_tasks_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Task>>;
    /// Writes title, description and completed, and bumps `updated_at`.
    async fn update_task(&self, task: &Task) -> StoreResult<Option<Task>>;
    async fn delete_task(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait Store: UserStore + TaskStore {
    async fn ping(&self) -> StoreResult<()>;
    /// Releases the underlying connections. Called once at shutdown.
    async fn close(&self);
}
