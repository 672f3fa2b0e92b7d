//! Course entity model and DTOs.
//!
//! Courses are the parent scope of course sections. Their slugs are unique
//! among all active courses.

use campus_core::activity::ActivityState;
use campus_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::course_class::CourseClass;
use super::course_section::CourseSection;

/// A row from the `courses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub description: String,
    /// Soft-delete tag, stored as the `is_active` column.
    #[sqlx(rename = "is_active", try_from = "bool")]
    pub state: ActivityState,
    /// Listed by the public endpoints.
    pub is_public: bool,
    pub under_construction: bool,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new course. The slug defaults to one derived from the title.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourse {
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
}

/// DTO for updating a course. All fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCourse {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
}

/// A public course with its active sections and their active classes, all
/// in position order.
#[derive(Debug, Clone, Serialize)]
pub struct CourseOutline {
    #[serde(flatten)]
    pub course: Course,
    pub sections: Vec<SectionOutline>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionOutline {
    #[serde(flatten)]
    pub section: CourseSection,
    pub classes: Vec<CourseClass>,
}
