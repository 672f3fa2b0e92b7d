//! Course class entity model and DTOs.

use campus_core::activity::ActivityState;
use campus_core::history::ENTITY_COURSE_CLASS;
use campus_core::types::{DbId, Position, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ordered_item::{NewSibling, OrderedRow, SiblingScope, UpdateOrderedItem};

/// A row from the `course_classes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseClass {
    pub id: DbId,
    pub course_section_id: DbId,
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

impl OrderedRow for CourseClass {
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

/// DTO for creating a class. Without `slug`, the slug is derived from the title.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourseClass {
    pub course_section_id: DbId,
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "positionOrder")]
    pub position_order: Option<Position>,
}

impl From<CreateCourseClass> for NewSibling {
    fn from(input: CreateCourseClass) -> Self {
        NewSibling {
            parent_id: input.course_section_id,
            title: input.title,
            slug: input.slug,
            description: input.description,
            position_order: input.position_order,
        }
    }
}

pub type UpdateCourseClass = UpdateOrderedItem;

/// Classes ordered within their section.
pub struct CourseClasses;

impl SiblingScope for CourseClasses {
    type Create = CreateCourseClass;
    type Row = CourseClass;

    const ENTITY: &'static str = "CourseClass";
    const LABEL: &'static str = "Class";
    const HISTORY_ENTITY: &'static str = ENTITY_COURSE_CLASS;
    const TABLE: &'static str = "course_classes";
    const PARENT_COLUMN: &'static str = "course_section_id";
    const PARENT_ENTITY: &'static str = "CourseSection";
    const COLUMNS: &'static str = "id, course_section_id, title, slug, description, position_order, \
        is_active, created_by, created_at, updated_at";
    const ACTIVE_ANCESTRY: &'static str = "EXISTS (SELECT 1 FROM course_sections s \
        JOIN courses c ON c.id = s.course_id \
        WHERE s.id = t.course_section_id AND s.is_active = true AND c.is_active = true)";
    const ACTIVE_PARENT: &'static str = "SELECT s.id FROM course_sections s \
        JOIN courses c ON c.id = s.course_id \
        WHERE s.id = $1 AND s.is_active = true AND c.is_active = true";
}
