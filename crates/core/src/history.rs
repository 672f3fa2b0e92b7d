//! System history (audit trail) entry construction.
//!
//! Every mutation of a course, section or class appends one entry. Titles are
//! fixed per action; descriptions name the record and the acting user and are
//! passed through [`normalize`] before storage.

use crate::text::normalize;
use crate::types::{DbId, Position};

pub const ENTITY_COURSE: &str = "course";
pub const ENTITY_COURSE_SECTION: &str = "course_section";
pub const ENTITY_COURSE_CLASS: &str = "course_class";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Created,
    Updated,
    Reordered { position: Position },
    Deleted,
    /// Course visibility flipped; `public` is the new value.
    VisibilityChanged { public: bool },
    /// Course construction flag flipped; carries the new value.
    ConstructionChanged { under_construction: bool },
}

impl HistoryAction {
    fn verb(self) -> &'static str {
        match self {
            HistoryAction::Created => "created",
            HistoryAction::Updated => "updated",
            HistoryAction::Reordered { .. } => "reordered",
            HistoryAction::Deleted => "deleted",
            HistoryAction::VisibilityChanged { .. } => "visibility changed",
            HistoryAction::ConstructionChanged { .. } => "construction status changed",
        }
    }
}

/// Title and sanitized description for one history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryMessage {
    pub title: String,
    pub description: String,
}

/// Build the history message for `action` on a record labelled `label`
/// (e.g. `"Section"`) titled `record_title`, performed by `user_id`.
pub fn describe(
    action: HistoryAction,
    label: &str,
    record_title: &str,
    user_id: DbId,
) -> HistoryMessage {
    let title = format!("{label} {}", action.verb());
    let description = match action {
        HistoryAction::Reordered { position } => format!(
            "The {} \"{record_title}\" was moved to position {position} by user {user_id}.",
            label.to_lowercase()
        ),
        HistoryAction::VisibilityChanged { public } => format!(
            "The {} \"{record_title}\" was made {} by user {user_id}.",
            label.to_lowercase(),
            if public { "public" } else { "private" }
        ),
        HistoryAction::ConstructionChanged { under_construction } => format!(
            "The {} \"{record_title}\" was marked as {} by user {user_id}.",
            label.to_lowercase(),
            if under_construction { "under construction" } else { "finished" }
        ),
        other => format!(
            "The {} \"{record_title}\" was {} by user {user_id}.",
            label.to_lowercase(),
            other.verb()
        ),
    };
    HistoryMessage {
        title,
        description: normalize(&description),
    }
}
