//! Route definitions for courses and the sections nested under them.

use axum::routing::{get, patch, post};
use axum::Router;
use campus_db::models::course_section::CourseSections;

use crate::handlers::{course, ordered};
use crate::state::AppState;

/// Routes mounted at `/courses`.
///
/// ```text
/// GET    /                                  -> list
/// POST   /                                  -> create (admin)
/// GET    /slug/{slug}                       -> get_by_slug
/// GET    /public                            -> public courses
/// GET    /public/slug/{slug}                -> public course with outline
/// GET    /public/search/{query}             -> search public courses
/// PATCH  /toggle-public/{id}                -> flip visibility (admin)
/// PATCH  /toggle-under-construction/{id}    -> flip construction flag (admin)
/// GET    /{id}                              -> get_by_id
/// PUT    /{id}                              -> update (admin)
/// DELETE /{id}                              -> deactivate (admin)
/// GET    /{id}/sections                     -> sections in order
/// GET    /{id}/sections/slug/{slug}         -> section by slug
/// GET    /{id}/sections/ordering            -> density report
/// POST   /{id}/sections/ordering/compact    -> renumber (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(course::list).post(course::create))
        .route("/slug/{slug}", get(course::get_by_slug))
        .route("/public", get(course::list_public))
        .route("/public/slug/{slug}", get(course::get_public_by_slug))
        .route("/public/search/{query}", get(course::search_public))
        .route("/toggle-public/{id}", patch(course::toggle_public))
        .route(
            "/toggle-under-construction/{id}",
            patch(course::toggle_under_construction),
        )
        .route(
            "/{id}",
            get(course::get_by_id)
                .put(course::update)
                .delete(course::deactivate),
        )
        .route(
            "/{id}/sections",
            get(ordered::list_by_parent::<CourseSections>),
        )
        .route(
            "/{id}/sections/slug/{slug}",
            get(ordered::get_by_slug::<CourseSections>),
        )
        .route(
            "/{id}/sections/ordering",
            get(ordered::ordering_report::<CourseSections>),
        )
        .route(
            "/{id}/sections/ordering/compact",
            post(ordered::compact::<CourseSections>),
        )
}
