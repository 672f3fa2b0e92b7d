//! Shared shape of items kept in a dense per-parent order.
//!
//! Course sections (under a course) and course classes (under a section) are
//! the same kind of record with a different parent. [`SiblingScope`] names
//! the table, parent column and labels of one family so a single repository
//! implementation serves both.

use campus_core::types::{DbId, Position};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::FromRow;

/// Accessors the ordered-sibling repository needs from a row.
pub trait OrderedRow {
    fn id(&self) -> DbId;
    fn title(&self) -> &str;
    fn position_order(&self) -> Position;
}

/// Static description of one ordered family.
pub trait SiblingScope: Send + Sync + 'static {
    type Row: for<'r> FromRow<'r, PgRow> + OrderedRow + Serialize + Send + Unpin;
    /// Family-specific create DTO, naming the parent by its own column.
    type Create: DeserializeOwned + Into<NewSibling> + Send;

    /// Entity name used in not-found errors, e.g. `"CourseSection"`.
    const ENTITY: &'static str;
    /// Human label used in history entries, e.g. `"Section"`.
    const LABEL: &'static str;
    /// `entity_type` stored in `system_history`.
    const HISTORY_ENTITY: &'static str;
    const TABLE: &'static str;
    const PARENT_COLUMN: &'static str;
    /// Entity name of the parent, used in not-found errors.
    const PARENT_ENTITY: &'static str;
    /// Column list selected into [`Self::Row`].
    const COLUMNS: &'static str;
    /// Predicate over the item aliased `t`: every ancestor is active.
    const ACTIVE_ANCESTRY: &'static str;
    /// Selects the parent id bound as `$1` when it and its ancestors are active.
    const ACTIVE_PARENT: &'static str;
}

/// Family-independent create input.
#[derive(Debug, Clone)]
pub struct NewSibling {
    pub parent_id: DbId,
    pub title: String,
    /// Explicit slug source; the title is used when absent.
    pub slug: Option<String>,
    pub description: Option<String>,
    /// Explicit insert position; appended when absent.
    pub position_order: Option<Position>,
}

/// DTO for updating a section or class. All fields optional.
///
/// The slug is regenerated when `slug` is sent or when the title changes.
/// A `position_order` different from the current one moves the item.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOrderedItem {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "positionOrder")]
    pub position_order: Option<Position>,
}

/// Body of `PATCH .../order/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderRequest {
    #[serde(alias = "positionOrder")]
    pub position_order: Position,
}
