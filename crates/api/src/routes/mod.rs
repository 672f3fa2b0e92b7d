pub mod admin;
pub mod course;
pub mod course_class;
pub mod course_section;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /courses                                         list, create
/// /courses/slug/{slug}                             get by slug
/// /courses/{id}                                    get, update, deactivate
/// /courses/{id}/sections                           sections in order
/// /courses/{id}/sections/slug/{slug}               section by slug
/// /courses/{id}/sections/ordering                  density report
/// /courses/{id}/sections/ordering/compact          renumber (POST)
///
/// /course-sections                                 list, create
/// /course-sections/{id}                            get, update, deactivate
/// /course-sections/order/{id}                      move (PATCH)
/// /course-sections/{id}/classes                    classes in order
/// /course-sections/{id}/classes/slug/{slug}        class by slug
/// /course-sections/{id}/classes/ordering           density report
/// /course-sections/{id}/classes/ordering/compact   renumber (POST)
///
/// /course-classes                                  list, create
/// /course-classes/{id}                             get, update, deactivate
/// /course-classes/order/{id}                       move (PATCH)
///
/// /admin/history                                   audit trail (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/courses", course::router())
        .nest("/course-sections", course_section::router())
        .nest("/course-classes", course_class::router())
        .nest("/admin", admin::router())
}
