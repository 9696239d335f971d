use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A work item belonging to exactly one [`Stage`](super::Stage).
///
/// `stage` carries the owning stage's id on the wire, matching the
/// stored foreign key.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    pub stage: i64,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /tasks/`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskInput {
    pub title: Option<String>,
    pub stage: Option<i64>,
    pub completed: Option<bool>,
}

/// Body of `PUT /tasks/{id}/`; any subset of fields may be supplied.
/// Moving a task to another stage is an ordinary update of `stage`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTaskInput {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub stage: Option<i64>,
}
