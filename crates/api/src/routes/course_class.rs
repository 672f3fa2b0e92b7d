//! Route definitions for course classes.

use axum::routing::{get, patch};
use axum::Router;
use campus_db::models::course_class::CourseClasses;

use crate::handlers::ordered;
use crate::state::AppState;

/// Routes mounted at `/course-classes`.
///
/// ```text
/// GET    /              -> list
/// POST   /              -> create (curator)
/// GET    /{id}          -> get_by_id
/// PUT    /{id}          -> update (curator)
/// DELETE /{id}          -> deactivate (curator)
/// PATCH  /order/{id}    -> reorder (curator)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(ordered::list::<CourseClasses>).post(ordered::create::<CourseClasses>),
        )
        .route(
            "/{id}",
            get(ordered::get_by_id::<CourseClasses>)
                .put(ordered::update::<CourseClasses>)
                .delete(ordered::deactivate::<CourseClasses>),
        )
        .route("/order/{id}", patch(ordered::reorder::<CourseClasses>))
}
