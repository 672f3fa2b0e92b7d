//! Root-level liveness endpoint for the catalog service.
//!
//! Reports whether Postgres answers, which migration the schema is at, and
//! how busy the connection pool is. Mounted outside `/api/v1` so load
//! balancers can poll it without a token.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when the database answers, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Newest applied migration; `None` when the database is unreachable.
    pub schema_version: Option<i64>,
    pub pool_size: u32,
    pub pool_idle: usize,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (db_healthy, schema_version) = match campus_db::schema_version(&state.pool).await {
        Ok(version) => (true, version),
        Err(err) => {
            tracing::warn!(error = %err, "Health check could not reach the database");
            (false, None)
        }
    };

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        schema_version,
        pool_size: state.pool.size(),
        pool_idle: state.pool.num_idle(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
