//! Route definitions for course sections and the classes nested under them.

use axum::routing::{get, patch, post};
use axum::Router;
use campus_db::models::course_class::CourseClasses;
use campus_db::models::course_section::CourseSections;

use crate::handlers::ordered;
use crate::state::AppState;

/// Routes mounted at `/course-sections`.
///
/// ```text
/// GET    /                                  -> list
/// POST   /                                  -> create (curator)
/// GET    /{id}                              -> get_by_id
/// PUT    /{id}                              -> update (curator)
/// DELETE /{id}                              -> deactivate (curator)
/// PATCH  /order/{id}                        -> reorder (curator)
/// GET    /{id}/classes                      -> classes in order
/// GET    /{id}/classes/slug/{slug}          -> class by slug
/// GET    /{id}/classes/ordering             -> density report
/// POST   /{id}/classes/ordering/compact     -> renumber (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(ordered::list::<CourseSections>).post(ordered::create::<CourseSections>),
        )
        .route(
            "/{id}",
            get(ordered::get_by_id::<CourseSections>)
                .put(ordered::update::<CourseSections>)
                .delete(ordered::deactivate::<CourseSections>),
        )
        .route("/order/{id}", patch(ordered::reorder::<CourseSections>))
        .route(
            "/{id}/classes",
            get(ordered::list_by_parent::<CourseClasses>),
        )
        .route(
            "/{id}/classes/slug/{slug}",
            get(ordered::get_by_slug::<CourseClasses>),
        )
        .route(
            "/{id}/classes/ordering",
            get(ordered::ordering_report::<CourseClasses>),
        )
        .route(
            "/{id}/classes/ordering/compact",
            post(ordered::compact::<CourseClasses>),
        )
}
