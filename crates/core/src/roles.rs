//! Well-known role name constants.
//!
//! Tokens are issued by the identity service; these must match the `role`
//! claim it embeds.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_INSTRUCTOR: &str = "instructor";
pub const ROLE_STUDENT: &str = "student";

/// Roles allowed to curate course content (sections and classes).
pub const CURATOR_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_INSTRUCTOR];

/// Whether `role` may create, edit, reorder or remove sections and classes.
pub fn is_curator(role: &str) -> bool {
    CURATOR_ROLES.contains(&role)
}
