//! Handlers for the system history (audit trail).

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use campus_db::models::system_history::HistoryQuery;
use campus_db::repositories::SystemHistoryRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/history?entity_type=&entity_id=&limit=&offset=
///
/// Newest entries first. `limit` is clamped to `1..=200` (default 50).
pub async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> AppResult<impl IntoResponse> {
    let entries = SystemHistoryRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: entries }))
}
