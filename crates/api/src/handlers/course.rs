//! Handlers for the `/courses` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use campus_core::error::CoreError;
use campus_core::types::DbId;
use campus_db::models::course::{CreateCourse, UpdateCourse};
use campus_db::repositories::CourseRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/courses
///
/// List all active courses, newest first.
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let courses = CourseRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: courses }))
}

/// GET /api/v1/courses/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let course = CourseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))?;
    Ok(Json(DataResponse { data: course }))
}

/// GET /api/v1/courses/slug/{slug}
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let course = CourseRepo::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::SlugNotFound {
                entity: "Course",
                slug: slug.clone(),
            })
        })?;
    Ok(Json(DataResponse { data: course }))
}

/// GET /api/v1/courses/public
///
/// List active courses marked public, newest first.
pub async fn list_public(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let courses = CourseRepo::list_public(&state.pool).await?;
    Ok(Json(DataResponse { data: courses }))
}

/// GET /api/v1/courses/public/slug/{slug}
///
/// A public course with its sections and classes in display order.
pub async fn get_public_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<impl IntoResponse> {
    let outline = CourseRepo::find_public_outline(&state.pool, &slug)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::SlugNotFound {
                entity: "Course",
                slug: slug.clone(),
            })
        })?;
    Ok(Json(DataResponse { data: outline }))
}

/// GET /api/v1/courses/public/search/{query}
pub async fn search_public(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> AppResult<impl IntoResponse> {
    let courses = CourseRepo::search_public(&state.pool, &query).await?;
    tracing::debug!(query = %query, hits = courses.len(), "Public course search");
    Ok(Json(DataResponse { data: courses }))
}

/// PATCH /api/v1/courses/toggle-public/{id}
pub async fn toggle_public(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let course = CourseRepo::toggle_public(&state.pool, id, admin.user_id).await?;

    tracing::info!(
        course_id = id,
        is_public = course.is_public,
        user_id = admin.user_id,
        "Course visibility changed"
    );

    Ok(Json(DataResponse { data: course }))
}

/// PATCH /api/v1/courses/toggle-under-construction/{id}
pub async fn toggle_under_construction(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let course = CourseRepo::toggle_under_construction(&state.pool, id, admin.user_id).await?;

    tracing::info!(
        course_id = id,
        under_construction = course.under_construction,
        user_id = admin.user_id,
        "Course construction status changed"
    );

    Ok(Json(DataResponse { data: course }))
}

/// POST /api/v1/courses
///
/// Create a course. Without `slug`, the slug is derived from the title.
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateCourse>,
) -> AppResult<impl IntoResponse> {
    let course = CourseRepo::create(&state.pool, &input, admin.user_id).await?;

    tracing::info!(course_id = course.id, slug = %course.slug, user_id = admin.user_id, "Course created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: course })))
}

/// PUT /api/v1/courses/{id}
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCourse>,
) -> AppResult<impl IntoResponse> {
    let course = CourseRepo::update(&state.pool, id, &input, admin.user_id).await?;

    tracing::info!(course_id = id, user_id = admin.user_id, "Course updated");

    Ok(Json(DataResponse { data: course }))
}

/// DELETE /api/v1/courses/{id}
///
/// Soft-delete a course. Its sections stay in place but can no longer be
/// reached through it.
pub async fn deactivate(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    CourseRepo::deactivate(&state.pool, id, admin.user_id).await?;

    tracing::info!(course_id = id, user_id = admin.user_id, "Course deactivated");

    Ok(StatusCode::NO_CONTENT)
}
