//! Repository for the `courses` table.

use std::collections::HashMap;

use campus_core::error::CoreError;
use campus_core::history::{describe, HistoryAction, ENTITY_COURSE};
use campus_core::slug::tombstone_slug;
use campus_core::text::{normalize, sanitize_title, search_pattern};
use campus_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use super::scope::{self, SlugScope};
use super::SystemHistoryRepo;
use crate::models::course::{Course, CourseOutline, CreateCourse, SectionOutline, UpdateCourse};
use crate::models::course_class::{CourseClass, CourseClasses};
use crate::models::course_section::{CourseSection, CourseSections};
use crate::models::ordered_item::SiblingScope;
use crate::models::system_history::CreateHistoryEntry;
use crate::{RepoError, RepoResult};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, slug, description, is_active, is_public, under_construction, \
    created_by, created_at, updated_at";

/// Course slugs are unique across the whole table, so one lock key covers them.
const SLUG_LOCK_KEY: DbId = 0;

/// Provides CRUD operations for courses.
pub struct CourseRepo;

impl CourseRepo {
    /// Insert a new course with a slug unique among active courses.
    pub async fn create(pool: &PgPool, input: &CreateCourse, user_id: DbId) -> RepoResult<Course> {
        let title = sanitize_title(&input.title)?;
        let description = input.description.as_deref().map(normalize).unwrap_or_default();

        let mut tx = pool.begin().await?;
        scope::lock(&mut tx, "courses", SLUG_LOCK_KEY).await?;
        let slug = scope::unique_slug(
            &mut tx,
            slug_scope(None),
            input.slug.as_deref().unwrap_or(&title),
        )
        .await?;

        let query = format!(
            "INSERT INTO courses (title, slug, description, created_by) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let course = sqlx::query_as::<_, Course>(&query)
            .bind(&title)
            .bind(&slug)
            .bind(&description)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        record(&mut tx, HistoryAction::Created, &course, user_id).await?;
        tx.commit().await?;
        Ok(course)
    }

    /// Find an active course by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE id = $1 AND is_active = true");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an active course by slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE slug = $1 AND is_active = true");
        sqlx::query_as::<_, Course>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List all active courses, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Course>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM courses WHERE is_active = true ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Course>(&query).fetch_all(pool).await
    }

    /// Update a course. Only non-`None` fields are applied.
    ///
    /// The slug is regenerated when `slug` is sent or the title changes.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCourse,
        user_id: DbId,
    ) -> RepoResult<Course> {
        let title = input.title.as_deref().map(sanitize_title).transpose()?;
        let description = input.description.as_deref().map(normalize);

        let mut tx = pool.begin().await?;
        scope::lock(&mut tx, "courses", SLUG_LOCK_KEY).await?;
        let current = fetch_active(&mut tx, id).await?;

        let title_changed = title.as_deref().is_some_and(|t| t != current.title);
        let slug_source = match (&input.slug, &title) {
            (Some(explicit), _) => Some(explicit.as_str()),
            (None, Some(new_title)) if title_changed => Some(new_title.as_str()),
            _ => None,
        };
        let slug = match slug_source {
            Some(source) => Some(scope::unique_slug(&mut tx, slug_scope(Some(id)), source).await?),
            None => None,
        };

        let query = format!(
            "UPDATE courses SET \
                title = COALESCE($2, title), \
                slug = COALESCE($3, slug), \
                description = COALESCE($4, description) \
             WHERE id = $1 AND is_active = true \
             RETURNING {COLUMNS}"
        );
        let course = sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .bind(&title)
            .bind(&slug)
            .bind(&description)
            .fetch_one(&mut *tx)
            .await?;

        record(&mut tx, HistoryAction::Updated, &course, user_id).await?;
        tx.commit().await?;
        Ok(course)
    }

    /// Flip whether the course is listed by the public endpoints.
    pub async fn toggle_public(pool: &PgPool, id: DbId, user_id: DbId) -> RepoResult<Course> {
        let mut tx = pool.begin().await?;
        let course = flip_flag(&mut tx, id, "is_public").await?;
        let action = HistoryAction::VisibilityChanged {
            public: course.is_public,
        };
        record(&mut tx, action, &course, user_id).await?;
        tx.commit().await?;
        Ok(course)
    }

    /// Flip the course's under-construction marker.
    pub async fn toggle_under_construction(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> RepoResult<Course> {
        let mut tx = pool.begin().await?;
        let course = flip_flag(&mut tx, id, "under_construction").await?;
        let action = HistoryAction::ConstructionChanged {
            under_construction: course.under_construction,
        };
        record(&mut tx, action, &course, user_id).await?;
        tx.commit().await?;
        Ok(course)
    }

    /// List active public courses, newest first.
    pub async fn list_public(pool: &PgPool) -> Result<Vec<Course>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM courses WHERE is_active = true AND is_public = true \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Course>(&query).fetch_all(pool).await
    }

    /// Find an active public course by slug, with its active sections and
    /// classes in position order.
    pub async fn find_public_outline(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<CourseOutline>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM courses \
             WHERE slug = $1 AND is_active = true AND is_public = true"
        );
        let Some(course) = sqlx::query_as::<_, Course>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };

        let query = format!(
            "SELECT {} FROM course_sections \
             WHERE course_id = $1 AND is_active = true \
             ORDER BY position_order, id",
            CourseSections::COLUMNS
        );
        let sections = sqlx::query_as::<_, CourseSection>(&query)
            .bind(course.id)
            .fetch_all(pool)
            .await?;

        let query = format!(
            "SELECT {} FROM course_classes \
             WHERE course_section_id = ANY($1) AND is_active = true \
             ORDER BY course_section_id, position_order, id",
            CourseClasses::COLUMNS
        );
        let section_ids: Vec<DbId> = sections.iter().map(|s| s.id).collect();
        let classes = sqlx::query_as::<_, CourseClass>(&query)
            .bind(section_ids)
            .fetch_all(pool)
            .await?;

        let mut by_section: HashMap<DbId, Vec<CourseClass>> = HashMap::new();
        for class in classes {
            by_section
                .entry(class.course_section_id)
                .or_default()
                .push(class);
        }
        let sections = sections
            .into_iter()
            .map(|section| SectionOutline {
                classes: by_section.remove(&section.id).unwrap_or_default(),
                section,
            })
            .collect();

        Ok(Some(CourseOutline { course, sections }))
    }

    /// Search active public courses by title, description or slug, or by the
    /// title of one of their active sections or classes. Newest first.
    pub async fn search_public(pool: &PgPool, query: &str) -> RepoResult<Vec<Course>> {
        let pattern = search_pattern(query)?;
        let sql = format!(
            "SELECT {COLUMNS} FROM courses c \
             WHERE c.is_active = true AND c.is_public = true AND ( \
                lower(c.title) LIKE $1 \
                OR lower(c.description) LIKE $1 \
                OR c.slug LIKE $1 \
                OR EXISTS (SELECT 1 FROM course_sections s \
                           WHERE s.course_id = c.id AND s.is_active = true \
                             AND lower(s.title) LIKE $1) \
                OR EXISTS (SELECT 1 FROM course_classes k \
                           JOIN course_sections s ON s.id = k.course_section_id \
                           WHERE s.course_id = c.id AND s.is_active = true \
                             AND k.is_active = true AND lower(k.title) LIKE $1)) \
             ORDER BY c.created_at DESC, c.id DESC"
        );
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(&pattern)
            .fetch_all(pool)
            .await?)
    }

    /// Soft-delete a course and free its slug.
    ///
    /// Sections are left as they are; with the course inactive they can no
    /// longer be listed or modified through it.
    pub async fn deactivate(pool: &PgPool, id: DbId, user_id: DbId) -> RepoResult<()> {
        let mut tx = pool.begin().await?;
        let course = fetch_active(&mut tx, id).await?;

        sqlx::query("UPDATE courses SET is_active = false, slug = $2 WHERE id = $1 AND is_active = true")
            .bind(id)
            .bind(tombstone_slug())
            .execute(&mut *tx)
            .await?;

        record(&mut tx, HistoryAction::Deleted, &course, user_id).await?;
        tx.commit().await?;
        Ok(())
    }
}

/// Negate a boolean column of an active course in place.
async fn flip_flag(conn: &mut PgConnection, id: DbId, column: &'static str) -> RepoResult<Course> {
    let query = format!(
        "UPDATE courses SET {column} = NOT {column} \
         WHERE id = $1 AND is_active = true \
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Course>(&query)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(RepoError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))
}

fn slug_scope(exclude_id: Option<DbId>) -> SlugScope<'static> {
    SlugScope {
        table: "courses",
        parent: None,
        exclude_id,
    }
}

async fn fetch_active(conn: &mut PgConnection, id: DbId) -> RepoResult<Course> {
    let query = format!("SELECT {COLUMNS} FROM courses WHERE id = $1 AND is_active = true");
    sqlx::query_as::<_, Course>(&query)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(RepoError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))
}

async fn record(
    conn: &mut PgConnection,
    action: HistoryAction,
    course: &Course,
    user_id: DbId,
) -> Result<(), sqlx::Error> {
    let message = describe(action, "Course", &course.title, user_id);
    SystemHistoryRepo::create(
        &mut *conn,
        &CreateHistoryEntry {
            title: message.title,
            description: message.description,
            entity_type: ENTITY_COURSE,
            entity_id: course.id,
            created_by: Some(user_id),
        },
    )
    .await?;
    Ok(())
}
