//! Course section entity model and DTOs.

use campus_core::activity::ActivityState;
use campus_core::history::ENTITY_COURSE_SECTION;
use campus_core::types::{DbId, Position, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ordered_item::{NewSibling, OrderedRow, SiblingScope, UpdateOrderedItem};

/// A row from the `course_sections` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseSection {
    pub id: DbId,
    pub course_id: DbId,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub position_order: Position,
    /// Soft-delete tag, stored as the `is_active` column.
    #[sqlx(rename = "is_active", try_from = "bool")]
    pub state: ActivityState,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OrderedRow for CourseSection {
    fn id(&self) -> DbId {
        self.id
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn position_order(&self) -> Position {
        self.position_order
    }
}

/// DTO for creating a section.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourseSection {
    pub course_id: DbId,
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "positionOrder")]
    pub position_order: Option<Position>,
}

impl From<CreateCourseSection> for NewSibling {
    fn from(input: CreateCourseSection) -> Self {
        NewSibling {
            parent_id: input.course_id,
            title: input.title,
            slug: input.slug,
            description: input.description,
            position_order: input.position_order,
        }
    }
}

pub type UpdateCourseSection = UpdateOrderedItem;

/// Sections ordered within their course.
pub struct CourseSections;

impl SiblingScope for CourseSections {
    type Create = CreateCourseSection;
    type Row = CourseSection;

    const ENTITY: &'static str = "CourseSection";
    const LABEL: &'static str = "Section";
    const HISTORY_ENTITY: &'static str = ENTITY_COURSE_SECTION;
    const TABLE: &'static str = "course_sections";
    const PARENT_COLUMN: &'static str = "course_id";
    const PARENT_ENTITY: &'static str = "Course";
    const COLUMNS: &'static str = "id, course_id, title, slug, description, position_order, \
        is_active, created_by, created_at, updated_at";
    const ACTIVE_ANCESTRY: &'static str = "EXISTS (SELECT 1 FROM courses c \
        WHERE c.id = t.course_id AND c.is_active = true)";
    const ACTIVE_PARENT: &'static str = "SELECT c.id FROM courses c \
        WHERE c.id = $1 AND c.is_active = true";
}
