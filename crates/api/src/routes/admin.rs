//! Route definitions for the `/admin` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::history;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET /history    -> list history entries
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/history", get(history::list))
}
