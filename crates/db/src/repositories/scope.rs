//! Per-scope locking and slug lookup shared by the repositories.

use std::collections::HashSet;

use campus_core::slug::{candidate_prefix, resolve_unique_slug, slugify, validate_slug};
use campus_core::types::DbId;
use sqlx::PgConnection;

use crate::RepoResult;

/// Serialize writers of one scope for the rest of the current transaction.
///
/// `scope` names the table whose rows are being reordered or slugged and
/// `key` the parent id (0 for tables without a parent). The lock is released
/// automatically at commit or rollback.
pub async fn lock(conn: &mut PgConnection, scope: &str, key: DbId) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, $2))")
        .bind(scope)
        .bind(key)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Where slug uniqueness is checked.
#[derive(Debug, Clone, Copy)]
pub struct SlugScope<'a> {
    pub table: &'a str,
    /// `(parent column, parent id)`; `None` for globally unique slugs.
    pub parent: Option<(&'a str, DbId)>,
    /// Row to ignore, so an item never collides with itself on update.
    pub exclude_id: Option<DbId>,
}

/// Slugify `raw` and make it unique among the active rows of `scope`.
///
/// Fetches every active slug that starts with the prefix all candidates
/// share in one query, then picks the first free suffix. Long bases are cut
/// short before suffixing, so the prefix can be shorter than the base.
pub async fn unique_slug(
    conn: &mut PgConnection,
    scope: SlugScope<'_>,
    raw: &str,
) -> RepoResult<String> {
    let base = slugify(raw);
    validate_slug(&base)?;

    let table = scope.table;
    let taken: Vec<String> = match scope.parent {
        Some((column, parent_id)) => {
            let query = format!(
                "SELECT slug FROM {table} \
                 WHERE {column} = $1 AND is_active = true \
                   AND ($2::BIGINT IS NULL OR id <> $2) \
                   AND slug LIKE $3 || '%'"
            );
            sqlx::query_scalar::<_, String>(&query)
                .bind(parent_id)
                .bind(scope.exclude_id)
                .bind(candidate_prefix(&base))
                .fetch_all(&mut *conn)
                .await?
        }
        None => {
            let query = format!(
                "SELECT slug FROM {table} \
                 WHERE is_active = true \
                   AND ($1::BIGINT IS NULL OR id <> $1) \
                   AND slug LIKE $2 || '%'"
            );
            sqlx::query_scalar::<_, String>(&query)
                .bind(scope.exclude_id)
                .bind(candidate_prefix(&base))
                .fetch_all(&mut *conn)
                .await?
        }
    };

    let taken: HashSet<String> = taken.into_iter().collect();
    Ok(resolve_unique_slug(&base, &taken)?)
}
