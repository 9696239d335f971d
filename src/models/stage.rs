use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named column on the board. Stages sort by `order`, then `name`.
#[derive(Debug, Clone, Serialize)]
pub struct Stage {
    pub id: i64,
    pub name: String,
    pub order: i64,
    // Internal bookkeeping, not part of the serialized shape.
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /stages/`. Fields are optional so that missing values
/// surface as field validation errors rather than body-parse failures.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStageInput {
    pub name: Option<String>,
    pub order: Option<i64>,
}

/// Body of `PUT`/`PATCH /stages/{id}/`; absent fields are left unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStageInput {
    pub name: Option<String>,
    pub order: Option<i64>,
}
