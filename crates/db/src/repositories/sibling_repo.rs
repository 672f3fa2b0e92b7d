//! Repository for ordered sibling tables (`course_sections`, `course_classes`).
//!
//! One implementation, parameterized by [`SiblingScope`]. Every mutation runs
//! in a single transaction that first takes the parent's advisory lock and
//! share-locks the parent chain, then reads the active siblings, plans position changes with
//! [`campus_core::ordering`], applies them and appends a history entry.
//! A failure at any step rolls the whole operation back.
//!
//! An item is visible only while its whole ancestry is active: a section of
//! a deactivated course, or a class of a deactivated section or course, is
//! neither readable nor writable.

use std::marker::PhantomData;

use campus_core::error::CoreError;
use campus_core::history::{describe, HistoryAction};
use campus_core::ordering::{
    append_position, check_dense, density_report, plan_compact, plan_insert, plan_move,
    DensityReport, Reposition, Sibling,
};
use campus_core::slug::tombstone_slug;
use campus_core::text::{normalize, sanitize_title};
use campus_core::types::{DbId, Position};
use sqlx::{PgConnection, PgPool};

use super::scope::{self, SlugScope};
use super::SystemHistoryRepo;
use crate::models::ordered_item::{NewSibling, OrderedRow, SiblingScope, UpdateOrderedItem};
use crate::models::system_history::CreateHistoryEntry;
use crate::{RepoError, RepoResult};

/// CRUD and ordering operations for one ordered family.
pub struct SiblingRepo<S>(PhantomData<S>);

impl<S: SiblingScope> SiblingRepo<S> {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Find an active item by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<S::Row>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM {} t WHERE t.id = $1 AND t.is_active = true AND {}",
            S::COLUMNS,
            S::TABLE,
            S::ACTIVE_ANCESTRY
        );
        sqlx::query_as::<_, S::Row>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an active item by its slug within a parent.
    pub async fn find_by_slug(
        pool: &PgPool,
        parent_id: DbId,
        slug: &str,
    ) -> Result<Option<S::Row>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM {} t \
             WHERE t.{} = $1 AND t.slug = $2 AND t.is_active = true AND {}",
            S::COLUMNS,
            S::TABLE,
            S::PARENT_COLUMN,
            S::ACTIVE_ANCESTRY
        );
        sqlx::query_as::<_, S::Row>(&query)
            .bind(parent_id)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List every active item, grouped by parent and ordered by position.
    pub async fn list(pool: &PgPool) -> Result<Vec<S::Row>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM {} t WHERE t.is_active = true AND {} \
             ORDER BY t.{}, t.position_order, t.id",
            S::COLUMNS,
            S::TABLE,
            S::ACTIVE_ANCESTRY,
            S::PARENT_COLUMN
        );
        sqlx::query_as::<_, S::Row>(&query).fetch_all(pool).await
    }

    /// List the active items of a parent in position order.
    ///
    /// Fails with `NotFound` if the parent does not exist or is inactive.
    pub async fn list_by_parent(pool: &PgPool, parent_id: DbId) -> RepoResult<Vec<S::Row>> {
        let mut conn = pool.acquire().await?;
        Self::ensure_parent(&mut conn, parent_id, false).await?;

        let query = format!(
            "SELECT {} FROM {} WHERE {} = $1 AND is_active = true ORDER BY position_order, id",
            S::COLUMNS,
            S::TABLE,
            S::PARENT_COLUMN
        );
        Ok(sqlx::query_as::<_, S::Row>(&query)
            .bind(parent_id)
            .fetch_all(&mut *conn)
            .await?)
    }

    /// Report whether the active items of a parent hold exactly `0..n`.
    pub async fn ordering_report(pool: &PgPool, parent_id: DbId) -> RepoResult<DensityReport> {
        let mut conn = pool.acquire().await?;
        Self::ensure_parent(&mut conn, parent_id, false).await?;
        let siblings = Self::active_siblings(&mut conn, parent_id).await?;
        Ok(density_report(&siblings))
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create an item under an active parent.
    ///
    /// Without `position_order` the item is appended; with it, siblings at or
    /// after that position shift up by one. The slug comes from the explicit
    /// `slug` or the title and is suffixed until unique within the parent.
    pub async fn create(pool: &PgPool, input: &NewSibling, user_id: DbId) -> RepoResult<S::Row> {
        let title = sanitize_title(&input.title)?;
        let description = input.description.as_deref().map(normalize).unwrap_or_default();

        let mut tx = pool.begin().await?;
        scope::lock(&mut tx, S::TABLE, input.parent_id).await?;
        Self::ensure_parent(&mut tx, input.parent_id, true).await?;

        let slug = scope::unique_slug(
            &mut tx,
            Self::slug_scope(input.parent_id, None),
            input.slug.as_deref().unwrap_or(&title),
        )
        .await?;

        let siblings = Self::active_siblings(&mut tx, input.parent_id).await?;
        let position = match input.position_order {
            Some(target) => {
                let plan = plan_insert(&siblings, target)?;
                Self::apply_plan(&mut tx, &plan).await?;
                target
            }
            None => {
                check_dense(&siblings)?;
                append_position(siblings.len())
            }
        };

        let query = format!(
            "INSERT INTO {} ({}, title, slug, description, position_order, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {}",
            S::TABLE,
            S::PARENT_COLUMN,
            S::COLUMNS
        );
        let row = sqlx::query_as::<_, S::Row>(&query)
            .bind(input.parent_id)
            .bind(&title)
            .bind(&slug)
            .bind(&description)
            .bind(position)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        Self::record(&mut tx, HistoryAction::Created, &row, user_id).await?;
        tx.commit().await?;

        Ok(row)
    }

    /// Update title, description and slug, and optionally move the item.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateOrderedItem,
        user_id: DbId,
    ) -> RepoResult<S::Row> {
        let title = input.title.as_deref().map(sanitize_title).transpose()?;
        let description = input.description.as_deref().map(normalize);

        let parent_id = Self::parent_of(pool, id).await?;
        let mut tx = pool.begin().await?;
        scope::lock(&mut tx, S::TABLE, parent_id).await?;
        Self::ensure_parent(&mut tx, parent_id, true).await?;
        let current = Self::fetch_active(&mut tx, id).await?;

        let title_changed = title.as_deref().is_some_and(|t| t != current.title());
        let slug_source = match (&input.slug, &title) {
            (Some(explicit), _) => Some(explicit.as_str()),
            (None, Some(new_title)) if title_changed => Some(new_title.as_str()),
            _ => None,
        };
        let slug = match slug_source {
            Some(source) => Some(
                scope::unique_slug(&mut tx, Self::slug_scope(parent_id, Some(id)), source).await?,
            ),
            None => None,
        };

        let query = format!(
            "UPDATE {} SET \
                title = COALESCE($2, title), \
                slug = COALESCE($3, slug), \
                description = COALESCE($4, description) \
             WHERE id = $1 AND is_active = true \
             RETURNING {}",
            S::TABLE,
            S::COLUMNS
        );
        let mut row = sqlx::query_as::<_, S::Row>(&query)
            .bind(id)
            .bind(&title)
            .bind(&slug)
            .bind(&description)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(target) = input.position_order {
            if target != row.position_order() {
                Self::move_within(&mut tx, parent_id, id, target).await?;
                row = Self::fetch_active(&mut tx, id).await?;
            }
        }

        Self::record(&mut tx, HistoryAction::Updated, &row, user_id).await?;
        tx.commit().await?;

        Ok(row)
    }

    /// Move an item to `new_position` among its active siblings.
    ///
    /// The target must lie in `0..count`; anything else is a validation
    /// error and leaves every position untouched.
    pub async fn move_to(
        pool: &PgPool,
        id: DbId,
        new_position: Position,
        user_id: DbId,
    ) -> RepoResult<S::Row> {
        let parent_id = Self::parent_of(pool, id).await?;
        let mut tx = pool.begin().await?;
        scope::lock(&mut tx, S::TABLE, parent_id).await?;
        Self::ensure_parent(&mut tx, parent_id, true).await?;
        Self::fetch_active(&mut tx, id).await?;

        Self::move_within(&mut tx, parent_id, id, new_position).await?;
        let row = Self::fetch_active(&mut tx, id).await?;

        Self::record(
            &mut tx,
            HistoryAction::Reordered {
                position: new_position,
            },
            &row,
            user_id,
        )
        .await?;
        tx.commit().await?;

        Ok(row)
    }

    /// Soft-delete an item and close the gap it leaves.
    ///
    /// The slug is replaced by a tombstone in the same statement that clears
    /// `is_active`, so the readable slug is immediately reusable; the
    /// remaining siblings are then renumbered.
    pub async fn deactivate(pool: &PgPool, id: DbId, user_id: DbId) -> RepoResult<()> {
        let parent_id = Self::parent_of(pool, id).await?;
        let mut tx = pool.begin().await?;
        scope::lock(&mut tx, S::TABLE, parent_id).await?;
        Self::ensure_parent(&mut tx, parent_id, true).await?;
        let row = Self::fetch_active(&mut tx, id).await?;

        let query = format!(
            "UPDATE {} SET is_active = false, slug = $2 WHERE id = $1 AND is_active = true",
            S::TABLE
        );
        sqlx::query(&query)
            .bind(id)
            .bind(tombstone_slug())
            .execute(&mut *tx)
            .await?;

        let siblings = Self::active_siblings(&mut tx, parent_id).await?;
        let plan = plan_compact(&siblings)?;
        Self::apply_plan(&mut tx, &plan).await?;

        Self::record(&mut tx, HistoryAction::Deleted, &row, user_id).await?;
        tx.commit().await?;

        tracing::debug!(
            entity = S::ENTITY,
            id,
            parent_id,
            shifted = plan.len(),
            "Compacted siblings after deactivation"
        );
        Ok(())
    }

    /// Renumber the active items of a parent to `0..n`, keeping their order.
    ///
    /// Returns how many rows changed; zero on an already dense parent.
    pub async fn compact(pool: &PgPool, parent_id: DbId) -> RepoResult<usize> {
        let mut tx = pool.begin().await?;
        scope::lock(&mut tx, S::TABLE, parent_id).await?;
        Self::ensure_parent(&mut tx, parent_id, true).await?;

        let siblings = Self::active_siblings(&mut tx, parent_id).await?;
        let plan = plan_compact(&siblings)?;
        Self::apply_plan(&mut tx, &plan).await?;
        tx.commit().await?;

        Ok(plan.len())
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn slug_scope(parent_id: DbId, exclude_id: Option<DbId>) -> SlugScope<'static> {
        SlugScope {
            table: S::TABLE,
            parent: Some((S::PARENT_COLUMN, parent_id)),
            exclude_id,
        }
    }

    fn not_found(id: DbId) -> RepoError {
        RepoError::Core(CoreError::NotFound {
            entity: S::ENTITY,
            id,
        })
    }

    /// Parent of a visible item, read before the scope lock is taken.
    /// Parents never change, so the value stays valid once locked; the
    /// ancestry is re-checked under lock by [`Self::ensure_parent`].
    async fn parent_of(pool: &PgPool, id: DbId) -> RepoResult<DbId> {
        let query = format!(
            "SELECT t.{} FROM {} t WHERE t.id = $1 AND t.is_active = true AND {}",
            S::PARENT_COLUMN,
            S::TABLE,
            S::ACTIVE_ANCESTRY
        );
        sqlx::query_scalar::<_, DbId>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    async fn fetch_active(conn: &mut PgConnection, id: DbId) -> RepoResult<S::Row> {
        let query = format!(
            "SELECT {} FROM {} WHERE id = $1 AND is_active = true",
            S::COLUMNS,
            S::TABLE
        );
        sqlx::query_as::<_, S::Row>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    /// Fail with the parent's `NotFound` unless it and its ancestors are active.
    ///
    /// With `share_lock` the ancestor rows are taken `FOR SHARE` until the
    /// transaction ends, so a concurrent deactivation of any of them waits
    /// for this writer, or this writer sees the deactivation and stops.
    async fn ensure_parent(
        conn: &mut PgConnection,
        parent_id: DbId,
        share_lock: bool,
    ) -> RepoResult<()> {
        let query = if share_lock {
            format!("{} FOR SHARE", S::ACTIVE_PARENT)
        } else {
            S::ACTIVE_PARENT.to_string()
        };
        sqlx::query_scalar::<_, DbId>(&query)
            .bind(parent_id)
            .fetch_optional(&mut *conn)
            .await?
            .map(|_| ())
            .ok_or(RepoError::Core(CoreError::NotFound {
                entity: S::PARENT_ENTITY,
                id: parent_id,
            }))
    }

    async fn active_siblings(
        conn: &mut PgConnection,
        parent_id: DbId,
    ) -> Result<Vec<Sibling>, sqlx::Error> {
        let query = format!(
            "SELECT id, position_order FROM {} \
             WHERE {} = $1 AND is_active = true \
             ORDER BY position_order, id",
            S::TABLE,
            S::PARENT_COLUMN
        );
        let rows: Vec<(DbId, Position)> = sqlx::query_as(&query)
            .bind(parent_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(id, position)| Sibling { id, position })
            .collect())
    }

    async fn move_within(
        conn: &mut PgConnection,
        parent_id: DbId,
        id: DbId,
        new_position: Position,
    ) -> RepoResult<()> {
        let siblings = Self::active_siblings(conn, parent_id).await?;
        let plan = match plan_move(&siblings, id, new_position) {
            Ok(plan) => plan,
            Err(err @ CoreError::Integrity(_)) => {
                tracing::error!(
                    entity = S::ENTITY,
                    parent_id,
                    error = %err,
                    "Refusing to reorder over corrupt positions"
                );
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };
        Self::apply_plan(conn, &plan).await?;
        Ok(())
    }

    async fn apply_plan(conn: &mut PgConnection, plan: &[Reposition]) -> Result<(), sqlx::Error> {
        if plan.is_empty() {
            return Ok(());
        }
        let query = format!("UPDATE {} SET position_order = $2 WHERE id = $1", S::TABLE);
        for step in plan {
            sqlx::query(&query)
                .bind(step.id)
                .bind(step.to)
                .execute(&mut *conn)
                .await?;
        }
        Ok(())
    }

    async fn record(
        conn: &mut PgConnection,
        action: HistoryAction,
        row: &S::Row,
        user_id: DbId,
    ) -> Result<(), sqlx::Error> {
        let message = describe(action, S::LABEL, row.title(), user_id);
        SystemHistoryRepo::create(
            &mut *conn,
            &CreateHistoryEntry {
                title: message.title,
                description: message.description,
                entity_type: S::HISTORY_ENTITY,
                entity_id: row.id(),
                created_by: Some(user_id),
            },
        )
        .await?;
        Ok(())
    }
}
