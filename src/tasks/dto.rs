use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::repo_types::Task;

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// Only the provided fields are changed.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub success: bool,
    pub data: Task,
}

impl TaskResponse {
    pub fn new(task: Task) -> Self {
        Self {
            success: true,
            data: task,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<Task>,
}

#[derive(Debug, Serialize)]
pub struct TaskDeletedResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: Map<String, Value>,
}
