//! Handlers for `/stages/`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::{ApiError, Validator};
use crate::db::Database;
use crate::models::{CreateStageInput, Stage, UpdateStageInput};

const NAME_MAX_CHARS: usize = 100;

/// GET /stages/
pub async fn list(State(db): State<Database>) -> Result<Json<Vec<Stage>>, ApiError> {
    Ok(Json(db.list_stages()?))
}

/// POST /stages/
pub async fn create(
    State(db): State<Database>,
    Json(input): Json<CreateStageInput>,
) -> Result<(StatusCode, Json<Stage>), ApiError> {
    let mut v = Validator::default();

    let name = input.name.as_deref().map(str::trim).unwrap_or("");
    if input.name.is_none() {
        v.reject("name", "This field is required.");
    } else if name.is_empty() {
        v.reject("name", "This field may not be blank.");
    } else if name.chars().count() > NAME_MAX_CHARS {
        v.reject(
            "name",
            format!("Ensure this field has no more than {NAME_MAX_CHARS} characters."),
        );
    } else if db.stage_name_exists(name, None)? {
        v.reject("name", "stage with this name already exists.");
    }

    let order = input.order.unwrap_or(0);
    if order < 0 {
        v.reject("order", "Ensure this value is greater than or equal to 0.");
    }

    v.finish()?;

    let stage = db.create_stage(name, order)?;
    tracing::debug!(id = stage.id, name = %stage.name, "created stage");
    Ok((StatusCode::CREATED, Json(stage)))
}

/// PUT or PATCH /stages/{id}/ — partial update of name and/or order.
pub async fn update(
    State(db): State<Database>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateStageInput>,
) -> Result<Json<Stage>, ApiError> {
    if db.get_stage(id)?.is_none() {
        return Err(ApiError::NotFound);
    }

    let mut v = Validator::default();

    let name = input.name.as_deref().map(str::trim);
    if let Some(name) = name {
        if name.is_empty() {
            v.reject("name", "This field may not be blank.");
        } else if name.chars().count() > NAME_MAX_CHARS {
            v.reject(
                "name",
                format!("Ensure this field has no more than {NAME_MAX_CHARS} characters."),
            );
        } else if db.stage_name_exists(name, Some(id))? {
            v.reject("name", "stage with this name already exists.");
        }
    }

    if let Some(order) = input.order {
        if order < 0 {
            v.reject("order", "Ensure this value is greater than or equal to 0.");
        }
    }

    v.finish()?;

    let stage = db
        .update_stage(id, name, input.order)?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(stage))
}

/// DELETE /stages/{id}/delete/ — refuses to delete a stage that still
/// has tasks.
pub async fn remove(
    State(db): State<Database>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if db.get_stage(id)?.is_none() {
        return Err(ApiError::NotFoundDetail("Stage not found".to_string()));
    }
    if db.stage_task_count(id)? > 0 {
        return Err(ApiError::Conflict(
            "Cannot delete stage with tasks. Empty it first.".to_string(),
        ));
    }

    db.delete_stage(id)?;
    tracing::debug!(id, "deleted stage");
    Ok(StatusCode::NO_CONTENT)
}
