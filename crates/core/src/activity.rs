//! Soft-delete state tag.
//!
//! Rows keep an `is_active` column; code reasons about [`ActivityState`] so
//! "inactive" is an explicit variant rather than a convention on a bool.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityState {
    Active,
    /// Soft-deleted. The row keeps a tombstone slug and no position guarantee.
    Inactive,
}

impl ActivityState {
    pub fn is_active(self) -> bool {
        matches!(self, ActivityState::Active)
    }
}

impl From<bool> for ActivityState {
    fn from(is_active: bool) -> Self {
        if is_active {
            ActivityState::Active
        } else {
            ActivityState::Inactive
        }
    }
}
