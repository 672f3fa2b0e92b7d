//! Repository for the `system_history` table.

use campus_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use sqlx::{PgExecutor, PgPool};

use crate::models::system_history::{CreateHistoryEntry, HistoryQuery, SystemHistoryEntry};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, entity_type, entity_id, created_by, created_at";

/// Append-only access to the system history trail.
pub struct SystemHistoryRepo;

impl SystemHistoryRepo {
    /// Append an entry. Accepts any executor so callers can write the entry
    /// inside the transaction of the mutation it records.
    pub async fn create<'e, E>(
        executor: E,
        input: &CreateHistoryEntry,
    ) -> Result<SystemHistoryEntry, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO system_history (title, description, entity_type, entity_id, created_by) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SystemHistoryEntry>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.entity_type)
            .bind(input.entity_id)
            .bind(input.created_by)
            .fetch_one(executor)
            .await
    }

    /// List entries newest first, optionally filtered by entity.
    pub async fn list(
        pool: &PgPool,
        params: &HistoryQuery,
    ) -> Result<Vec<SystemHistoryEntry>, sqlx::Error> {
        let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
        let offset = clamp_offset(params.offset);

        let query = format!(
            "SELECT {COLUMNS} FROM system_history \
             WHERE ($1::TEXT IS NULL OR entity_type = $1) \
               AND ($2::BIGINT IS NULL OR entity_id = $2) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, SystemHistoryEntry>(&query)
            .bind(&params.entity_type)
            .bind(params.entity_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
