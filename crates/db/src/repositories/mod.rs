//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument. Operations that touch more than one row
//! open their own transaction.

pub mod course_repo;
pub mod scope;
pub mod sibling_repo;
pub mod system_history_repo;

pub use course_repo::CourseRepo;
pub use sibling_repo::SiblingRepo;
pub use system_history_repo::SystemHistoryRepo;

use crate::models::course_class::CourseClasses;
use crate::models::course_section::CourseSections;

/// Sections ordered within a course.
pub type CourseSectionRepo = SiblingRepo<CourseSections>;

/// Classes ordered within a section.
pub type CourseClassRepo = SiblingRepo<CourseClasses>;
