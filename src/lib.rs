//! Kanban board backend.
//!
//! Stages are ordered, uniquely named columns; Tasks are work items that
//! each belong to exactly one Stage. Both are exposed as JSON resources
//! over HTTP, backed by SQLite.
//!
//! # Usage
//!
//! ```no_run
//! use stagehand::{api, db::Database};
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let app = api::create_router(db);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod db;
pub mod models;

// Re-export commonly used types at crate root
pub use db::Database;
