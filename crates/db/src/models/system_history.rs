//! System history (audit trail) model and DTOs.
//!
//! Entries are immutable once written; there is no `updated_at`.

use campus_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `system_history` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SystemHistoryEntry {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub entity_type: String,
    pub entity_id: DbId,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
}

/// DTO for appending a history entry.
#[derive(Debug, Clone)]
pub struct CreateHistoryEntry {
    pub title: String,
    pub description: String,
    pub entity_type: &'static str,
    pub entity_id: DbId,
    pub created_by: Option<DbId>,
}

/// Filter parameters for listing history.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
