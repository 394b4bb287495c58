//! HTTP route handlers for the task API.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};

use taskboard_store::{NewTask, Task, TaskRepo};

use crate::error::ApiError;

/// Shared state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<TaskRepo>,
}

impl AppState {
    pub fn new(repo: TaskRepo) -> Self {
        Self {
            repo: Arc::new(repo),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Repeated `ids` query parameters: `?ids=1&ids=2`.
#[derive(Debug, Deserialize)]
pub struct DeleteManyParams {
    #[serde(default)]
    pub ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub data: Vec<Task>,
}

#[derive(Debug, Serialize)]
pub struct TaskAddedResponse {
    pub success: bool,
    pub task_id: i64,
}

#[derive(Debug, Serialize)]
pub struct TaskEditedResponse {
    pub success: bool,
    pub task: Task,
}

#[derive(Debug, Serialize)]
pub struct TaskDeletedResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct BatchDeletedResponse {
    pub success: bool,
    pub deleted_count: usize,
}

fn require_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::Validation("name must not be empty".into()));
    }
    Ok(())
}

/// GET /tasks
pub async fn list_tasks(
    State(state): State<AppState>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let data = state.repo.list()?;
    Ok(Json(TaskListResponse { data }))
}

/// POST /tasks/add
pub async fn add_task(
    State(state): State<AppState>,
    Json(body): Json<CreateTaskRequest>,
) -> Result<Json<TaskAddedResponse>, ApiError> {
    require_name(&body.name)?;

    let task_id = state.repo.add(&NewTask {
        name: body.name,
        description: body.description,
        completed: body.completed,
    })?;

    tracing::info!(task_id, "task added");
    Ok(Json(TaskAddedResponse {
        success: true,
        task_id,
    }))
}

/// PUT /tasks/{id}/edit
pub async fn edit_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTaskRequest>,
) -> Result<Json<TaskEditedResponse>, ApiError> {
    require_name(&body.name)?;

    let task = state
        .repo
        .update(id, &body.name, body.description.as_deref())?
        .ok_or_else(|| ApiError::NotFound("task not found".into()))?;

    Ok(Json(TaskEditedResponse {
        success: true,
        task,
    }))
}

/// PATCH /tasks/{id}/complete
pub async fn complete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    let task = state
        .repo
        .toggle_completed(id)?
        .ok_or_else(|| ApiError::NotFound("task not found".into()))?;

    Ok(Json(task))
}

/// DELETE /tasks/{id}/delete
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TaskDeletedResponse>, ApiError> {
    let removed = state.repo.delete(id)?;
    if !removed {
        return Err(ApiError::NotFound("task not found".into()));
    }

    Ok(Json(TaskDeletedResponse { success: true }))
}

/// DELETE /tasks/delete-many?ids=1&ids=2
///
/// All-or-nothing on the existence pre-check: if any id is absent the whole
/// request fails 404 naming that id and nothing is deleted. The pre-check
/// and the batch delete are separate statements, so a task deleted by a
/// concurrent request between them shrinks the reported count.
pub async fn delete_many_tasks(
    State(state): State<AppState>,
    Query(params): Query<DeleteManyParams>,
) -> Result<Json<BatchDeletedResponse>, ApiError> {
    if params.ids.is_empty() {
        return Err(ApiError::Validation("ids must not be empty".into()));
    }

    for &id in &params.ids {
        if state.repo.get(id)?.is_none() {
            return Err(ApiError::NotFound(format!("task {id} not found")));
        }
    }

    let deleted_count = state.repo.delete_many(&params.ids)?;
    tracing::info!(deleted_count, "batch delete");
    Ok(Json(BatchDeletedResponse {
        success: true,
        deleted_count,
    }))
}
