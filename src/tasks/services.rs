use uuid::Uuid;

use super::{
    dto::{CreateTaskRequest, UpdateTaskRequest},
    repo_types::{NewTask, Task},
};
use crate::{
    auth::{
        policy::{ensure, owns_task},
        CurrentUser,
    },
    error::{parse_id, AppError, AppResult},
    state::AppState,
    store::TaskStore,
};

pub const TASK_NOT_FOUND: &str = "Task not found";
pub const MAX_TITLE_LEN: usize = 100;

fn validate_title(title: &str) -> AppResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::validation("Title is required"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::validation(format!(
            "Title cannot exceed {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

fn validate_description(description: &str) -> AppResult<String> {
    let description = description.trim();
    if description.is_empty() {
        return Err(AppError::validation("Description is required"));
    }
    Ok(description.to_string())
}

pub fn new_task(owner: Uuid, payload: CreateTaskRequest) -> AppResult<NewTask> {
    let (Some(title), Some(description)) = (payload.title, payload.description) else {
        return Err(AppError::validation("Title and description are required"));
    };
    Ok(NewTask {
        title: validate_title(&title)?,
        description: validate_description(&description)?,
        completed: payload.completed.unwrap_or(false),
        user_id: owner,
    })
}

pub fn apply_update(task: &mut Task, payload: UpdateTaskRequest) -> AppResult<()> {
    if let Some(title) = payload.title {
        task.title = validate_title(&title)?;
    }
    if let Some(description) = payload.description {
        task.description = validate_description(&description)?;
    }
    if let Some(completed) = payload.completed {
        task.completed = completed;
    }
    Ok(())
}

/// Loads a task the caller owns: 404 if it does not exist, then 403 if it
/// belongs to someone else.
pub async fn owned_task(
    state: &AppState,
    me: &CurrentUser,
    raw_id: &str,
    denial: &'static str,
) -> AppResult<Task> {
    let id = parse_id(raw_id, TASK_NOT_FOUND)?;
    let task = state
        .store
        .find_task(id)
        .await?
        .ok_or(AppError::NotFound(TASK_NOT_FOUND))?;
    ensure(owns_task(me, &task), denial)?;
    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(title: Option<&str>, description: Option<&str>) -> CreateTaskRequest {
        CreateTaskRequest {
            title: title.map(String::from),
            description: description.map(String::from),
            completed: None,
        }
    }

    #[test]
    fn new_task_defaults_to_incomplete_and_trims() {
        let owner = Uuid::new_v4();
        let task = new_task(owner, create(Some("  Buy milk "), Some("2%"))).unwrap();
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description, "2%");
        assert!(!task.completed);
        assert_eq!(task.user_id, owner);
    }

    #[test]
    fn new_task_requires_title_and_description() {
        let owner = Uuid::new_v4();
        for req in [
            create(None, Some("d")),
            create(Some("t"), None),
            create(Some("   "), Some("d")),
            create(Some("t"), Some("")),
        ] {
            assert!(matches!(new_task(owner, req), Err(AppError::Validation(_))));
        }
    }

    #[test]
    fn title_length_is_bounded() {
        let owner = Uuid::new_v4();
        let exact = "x".repeat(MAX_TITLE_LEN);
        assert!(new_task(owner, create(Some(&exact), Some("d"))).is_ok());
        let long = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(new_task(owner, create(Some(&long), Some("d"))).is_err());
    }

    #[test]
    fn update_changes_only_provided_fields() {
        let now = time::OffsetDateTime::now_utc();
        let mut task = Task {
            id: Uuid::new_v4(),
            title: "old".into(),
            description: "keep".into(),
            completed: false,
            user_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        };
        apply_update(
            &mut task,
            UpdateTaskRequest {
                title: Some("new".into()),
                completed: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(task.title, "new");
        assert_eq!(task.description, "keep");
        assert!(task.completed);

        let err = apply_update(
            &mut task,
            UpdateTaskRequest {
                description: Some(" ".into()),
                ..Default::default()
            },
        );
        assert!(err.is_err());
    }
}
