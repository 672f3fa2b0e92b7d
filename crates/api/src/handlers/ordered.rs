//! Handlers shared by the two ordered families (course sections and course
//! classes).
//!
//! Each handler is generic over the family's [`SiblingScope`]; the route
//! modules pick the family with a turbofish, e.g.
//! `get(ordered::get_by_id::<CourseSections>)`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use campus_core::error::CoreError;
use campus_core::types::{DbId, Position};
use campus_db::models::ordered_item::{
    NewSibling, OrderedRow, ReorderRequest, SiblingScope, UpdateOrderedItem,
};
use campus_db::repositories::SiblingRepo;
use campus_db::RepoError;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireCurator};
use crate::response::DataResponse;
use crate::state::AppState;

/// Result of a compaction request.
#[derive(Debug, Serialize)]
pub struct CompactResult {
    /// Number of rows whose position changed.
    pub repositioned: usize,
}

// ---------------------------------------------------------------------------
// Reads (public)
// ---------------------------------------------------------------------------

/// GET /api/v1/course-sections, GET /api/v1/course-classes
///
/// List every active item, grouped by parent and ordered by position.
pub async fn list<S: SiblingScope>(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let items = SiblingRepo::<S>::list(&state.pool).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/course-sections/{id}, GET /api/v1/course-classes/{id}
pub async fn get_by_id<S: SiblingScope>(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let item = SiblingRepo::<S>::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: S::ENTITY,
            id,
        }))?;
    Ok(Json(DataResponse { data: item }))
}

/// GET /api/v1/courses/{id}/sections, GET /api/v1/course-sections/{id}/classes
///
/// Active children of one parent in display order.
pub async fn list_by_parent<S: SiblingScope>(
    State(state): State<AppState>,
    Path(parent_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let items = SiblingRepo::<S>::list_by_parent(&state.pool, parent_id).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/courses/{id}/sections/slug/{slug},
/// GET /api/v1/course-sections/{id}/classes/slug/{slug}
pub async fn get_by_slug<S: SiblingScope>(
    State(state): State<AppState>,
    Path((parent_id, slug)): Path<(DbId, String)>,
) -> AppResult<impl IntoResponse> {
    let item = SiblingRepo::<S>::find_by_slug(&state.pool, parent_id, &slug)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::SlugNotFound {
                entity: S::ENTITY,
                slug: slug.clone(),
            })
        })?;
    Ok(Json(DataResponse { data: item }))
}

/// GET /api/v1/courses/{id}/sections/ordering,
/// GET /api/v1/course-sections/{id}/classes/ordering
///
/// Report whether the parent's active positions are exactly `0..n`.
pub async fn ordering_report<S: SiblingScope>(
    State(state): State<AppState>,
    Path(parent_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let report = SiblingRepo::<S>::ordering_report(&state.pool, parent_id).await?;
    if !report.is_dense {
        tracing::warn!(
            entity = S::ENTITY,
            parent_id,
            gaps = ?report.gaps,
            duplicates = ?report.duplicates,
            "Ordering is not dense"
        );
    }
    Ok(Json(DataResponse { data: report }))
}

// ---------------------------------------------------------------------------
// Mutations (curator)
// ---------------------------------------------------------------------------

/// POST /api/v1/course-sections, POST /api/v1/course-classes
///
/// Append the new item, or insert it at `position_order` and shift the
/// siblings behind it.
pub async fn create<S: SiblingScope>(
    RequireCurator(user): RequireCurator,
    State(state): State<AppState>,
    Json(input): Json<S::Create>,
) -> AppResult<impl IntoResponse> {
    let input: NewSibling = input.into();
    let item = SiblingRepo::<S>::create(&state.pool, &input, user.user_id).await?;

    tracing::info!(
        entity = S::ENTITY,
        id = item.id(),
        parent_id = input.parent_id,
        user_id = user.user_id,
        "Ordered item created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

/// PUT /api/v1/course-sections/{id}, PUT /api/v1/course-classes/{id}
pub async fn update<S: SiblingScope>(
    RequireCurator(user): RequireCurator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateOrderedItem>,
) -> AppResult<impl IntoResponse> {
    let item = SiblingRepo::<S>::update(&state.pool, id, &input, user.user_id).await?;

    tracing::info!(entity = S::ENTITY, id, user_id = user.user_id, "Ordered item updated");

    Ok(Json(DataResponse { data: item }))
}

/// PATCH /api/v1/course-sections/order/{id}, PATCH /api/v1/course-classes/order/{id}
///
/// Move one item to `position_order`, shifting the siblings in between.
pub async fn reorder<S: SiblingScope>(
    RequireCurator(user): RequireCurator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReorderRequest>,
) -> AppResult<impl IntoResponse> {
    let item = SiblingRepo::<S>::move_to(&state.pool, id, input.position_order, user.user_id)
        .await
        .inspect_err(|e| log_rejected_move::<S>(id, input.position_order, e))?;

    tracing::info!(
        entity = S::ENTITY,
        id,
        position_order = input.position_order,
        user_id = user.user_id,
        "Ordered item moved"
    );

    Ok(Json(DataResponse { data: item }))
}

/// DELETE /api/v1/course-sections/{id}, DELETE /api/v1/course-classes/{id}
///
/// Soft-delete the item and close the gap it leaves.
pub async fn deactivate<S: SiblingScope>(
    RequireCurator(user): RequireCurator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    SiblingRepo::<S>::deactivate(&state.pool, id, user.user_id).await?;

    tracing::info!(entity = S::ENTITY, id, user_id = user.user_id, "Ordered item deactivated");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Maintenance (admin)
// ---------------------------------------------------------------------------

/// POST /api/v1/courses/{id}/sections/ordering/compact,
/// POST /api/v1/course-sections/{id}/classes/ordering/compact
///
/// Renumber the parent's active items to `0..n`, keeping their relative order.
pub async fn compact<S: SiblingScope>(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(parent_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let repositioned = SiblingRepo::<S>::compact(&state.pool, parent_id).await?;

    tracing::info!(
        entity = S::ENTITY,
        parent_id,
        repositioned,
        user_id = admin.user_id,
        "Ordering compacted"
    );

    Ok(Json(DataResponse {
        data: CompactResult { repositioned },
    }))
}

fn log_rejected_move<S: SiblingScope>(id: DbId, position: Position, err: &RepoError) {
    if let RepoError::Core(CoreError::Validation(msg)) = err {
        tracing::warn!(entity = S::ENTITY, id, position, reason = %msg, "Move rejected");
    }
}
