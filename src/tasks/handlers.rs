use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Map;
use tracing::{info, instrument};

use super::{
    dto::{
        CreateTaskRequest, TaskDeletedResponse, TaskListResponse, TaskResponse,
        UpdateTaskRequest,
    },
    services::{apply_update, new_task, owned_task, TASK_NOT_FOUND},
};
use crate::{
    auth::CurrentUser,
    error::{AppError, AppResult},
    state::AppState,
    store::TaskStore,
};

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
}

#[instrument(skip(state, me, payload))]
pub async fn create_task(
    State(state): State<AppState>,
    me: CurrentUser,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<TaskResponse>)> {
    let Json(payload) = payload?;
    let task = state.store.insert_task(new_task(me.id, payload)?).await?;
    info!(task_id = %task.id, user_id = %me.id, "task created");
    Ok((StatusCode::CREATED, Json(TaskResponse::new(task))))
}

#[instrument(skip(state, me))]
pub async fn list_tasks(
    State(state): State<AppState>,
    me: CurrentUser,
) -> AppResult<Json<TaskListResponse>> {
    let tasks = state.store.list_tasks_by_owner(me.id).await?;
    Ok(Json(TaskListResponse {
        success: true,
        count: tasks.len(),
        data: tasks,
    }))
}

#[instrument(skip(state, me))]
pub async fn get_task(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<TaskResponse>> {
    let task = owned_task(&state, &me, &id, "Not authorized to access this task").await?;
    Ok(Json(TaskResponse::new(task)))
}

#[instrument(skip(state, me, payload))]
pub async fn update_task(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> AppResult<Json<TaskResponse>> {
    let mut task = owned_task(&state, &me, &id, "Not authorized to update this task").await?;
    let Json(payload) = payload?;
    apply_update(&mut task, payload)?;
    let task = state
        .store
        .update_task(&task)
        .await?
        .ok_or(AppError::NotFound(TASK_NOT_FOUND))?;
    Ok(Json(TaskResponse::new(task)))
}

#[instrument(skip(state, me))]
pub async fn delete_task(
    State(state): State<AppState>,
    me: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<TaskDeletedResponse>> {
    let task = owned_task(&state, &me, &id, "Not authorized to delete this task").await?;
    if !state.store.delete_task(task.id).await? {
        return Err(AppError::NotFound(TASK_NOT_FOUND));
    }
    info!(task_id = %task.id, user_id = %me.id, "task deleted");
    Ok(Json(TaskDeletedResponse {
        success: true,
        message: "Task deleted successfully",
        data: Map::new(),
    }))
}
