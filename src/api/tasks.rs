//! Handlers for `/tasks/`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::{ApiError, Validator};
use crate::db::Database;
use crate::models::{CreateTaskInput, Task, UpdateTaskInput};

const TITLE_MAX_CHARS: usize = 255;

fn check_title(v: &mut Validator, title: &str) {
    if title.is_empty() {
        v.reject("title", "This field may not be blank.");
    } else if title.chars().count() > TITLE_MAX_CHARS {
        v.reject(
            "title",
            format!("Ensure this field has no more than {TITLE_MAX_CHARS} characters."),
        );
    }
}

fn check_stage_ref(v: &mut Validator, db: &Database, stage: i64) -> Result<(), ApiError> {
    if db.get_stage(stage)?.is_none() {
        v.reject(
            "stage",
            format!("Invalid pk \"{stage}\" - object does not exist."),
        );
    }
    Ok(())
}

/// GET /tasks/
pub async fn list(State(db): State<Database>) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(db.list_tasks()?))
}

/// POST /tasks/
pub async fn create(
    State(db): State<Database>,
    Json(input): Json<CreateTaskInput>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let mut v = Validator::default();

    let title = input.title.as_deref().map(str::trim).unwrap_or("");
    match input.title {
        None => v.reject("title", "This field is required."),
        Some(_) => check_title(&mut v, title),
    }

    match input.stage {
        None => v.reject("stage", "This field is required."),
        Some(stage) => check_stage_ref(&mut v, &db, stage)?,
    }

    v.finish()?;

    // validation guarantees stage is Some at this point
    let stage = input.stage.unwrap_or_default();
    let task = db.create_task(title, stage, input.completed.unwrap_or(false))?;
    tracing::debug!(id = task.id, stage = task.stage, "created task");
    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /tasks/{id}/ — partial update; changing `stage` moves the task to
/// another column.
pub async fn update(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateTaskInput>,
) -> Result<Json<Task>, ApiError> {
    if db.get_task(id)?.is_none() {
        return Err(ApiError::NotFound);
    }

    let mut v = Validator::default();

    let title = input.title.as_deref().map(str::trim);
    if let Some(title) = title {
        check_title(&mut v, title);
    }
    if let Some(stage) = input.stage {
        check_stage_ref(&mut v, &db, stage)?;
    }

    v.finish()?;

    let task = db
        .update_task(id, title, input.completed, input.stage)?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(task))
}

/// DELETE /tasks/{id}/ — no guard, unlike stage deletion.
pub async fn remove(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !db.delete_task(id)? {
        return Err(ApiError::NotFound);
    }
    tracing::debug!(id, "deleted task");
    Ok(StatusCode::NO_CONTENT)
}
