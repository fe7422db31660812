//! SQLite adapter for the course catalog port.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::ports::{
    CourseDeletion, CoursePersistenceError, CourseRepository, CourseUpdate,
};
use crate::domain::{
    Course, CourseDraft, CoursePage, CourseQuery, CourseWithCount, SortBy, SortDirection,
};
use crate::outbound::persistence::sqlite_student_repository::{parse_timestamp, parse_uuid};

/// Catalog rows stored in the `courses` table.
#[derive(Clone)]
pub struct SqliteCourseRepository {
    pool: SqlitePool,
}

impl SqliteCourseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_sqlx_error(error: sqlx::Error) -> CoursePersistenceError {
    match error {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            CoursePersistenceError::Connection {
                message: error.to_string(),
            }
        }
        other => CoursePersistenceError::Query {
            message: other.to_string(),
        },
    }
}

fn course_from_row(row: &SqliteRow) -> Result<CourseWithCount, CoursePersistenceError> {
    let map_column = |message: String| CoursePersistenceError::Query { message };

    let id: String = row.try_get("id").map_err(map_sqlx_error)?;
    let created_at: String = row.try_get("created_at").map_err(map_sqlx_error)?;

    Ok(CourseWithCount {
        course: Course {
            id: parse_uuid(&id, "courses.id").map_err(map_column)?,
            name: row.try_get("name").map_err(map_sqlx_error)?,
            description: row.try_get("description").map_err(map_sqlx_error)?,
            capacity: row.try_get("capacity").map_err(map_sqlx_error)?,
            created_at: parse_timestamp(&created_at, "courses.created_at").map_err(map_column)?,
        },
        current_enrollments: row.try_get("current_enrollments").map_err(map_sqlx_error)?,
    })
}

/// LIKE pattern matching the search term anywhere, with LIKE wildcards in
/// the term treated literally.
fn search_pattern(term: &str) -> String {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn order_clause(sort_by: SortBy, direction: SortDirection) -> String {
    let column = match sort_by {
        SortBy::Name => "c.name",
        SortBy::Capacity => "c.capacity",
        SortBy::CreatedAt => "c.created_at",
    };
    let dir = match direction {
        SortDirection::Ascending => "ASC",
        SortDirection::Descending => "DESC",
    };
    format!(" ORDER BY {column} {dir}, c.id ASC")
}

const SEARCH_FILTER: &str =
    " WHERE lower(c.name) LIKE ?1 ESCAPE '\\' OR lower(c.description) LIKE ?1 ESCAPE '\\'";

const COURSE_COLUMNS: &str = r#"
    SELECT c.id, c.name, c.description, c.capacity, c.created_at,
           (SELECT COUNT(*) FROM enrollments e WHERE e.course_id = c.id)
               AS current_enrollments
    FROM courses c
"#;

#[async_trait]
impl CourseRepository for SqliteCourseRepository {
    async fn list(&self, query: &CourseQuery) -> Result<CoursePage, CoursePersistenceError> {
        let pattern = query.search.as_deref().map(search_pattern);

        let mut count_sql = String::from("SELECT COUNT(*) FROM courses c");
        let mut page_sql = String::from(COURSE_COLUMNS);
        if pattern.is_some() {
            count_sql.push_str(SEARCH_FILTER);
            page_sql.push_str(SEARCH_FILTER);
        }
        page_sql.push_str(&order_clause(query.sort_by, query.sort_direction));
        // sqlx misnumbers a bare `?` that follows the filter's `?1`, so the
        // limit/offset placeholders are numbered whenever the filter is on.
        page_sql.push_str(if pattern.is_some() {
            " LIMIT ?2 OFFSET ?3"
        } else {
            " LIMIT ? OFFSET ?"
        });

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut page_query = sqlx::query(&page_sql);
        if let Some(pattern) = &pattern {
            count_query = count_query.bind(pattern);
            page_query = page_query.bind(pattern);
        }
        page_query = page_query
            .bind(i64::from(query.page_size))
            .bind(query.offset());

        let total_items = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        let rows = page_query
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        let items = rows
            .iter()
            .map(course_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CoursePage { items, total_items })
    }

    async fn find_with_count(
        &self,
        id: Uuid,
    ) -> Result<Option<CourseWithCount>, CoursePersistenceError> {
        let sql = format!("{COURSE_COLUMNS} WHERE c.id = ?1");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        row.as_ref().map(course_from_row).transpose()
    }

    async fn insert(&self, course: &Course) -> Result<(), CoursePersistenceError> {
        sqlx::query(
            r#"
            INSERT INTO courses (id, name, description, capacity, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(course.id.to_string())
        .bind(&course.name)
        .bind(&course.description)
        .bind(course.capacity)
        .bind(course.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn update(
        &self,
        id: Uuid,
        draft: &CourseDraft,
    ) -> Result<CourseUpdate, CoursePersistenceError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let existing = sqlx::query(
            r#"
            SELECT created_at,
                   (SELECT COUNT(*) FROM enrollments e WHERE e.course_id = courses.id)
                       AS current_enrollments
            FROM courses WHERE id = ?1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = existing else {
            return Ok(CourseUpdate::NotFound);
        };
        let current: i64 = row.try_get("current_enrollments").map_err(map_sqlx_error)?;
        if draft.capacity < current {
            return Ok(CourseUpdate::CapacityBelowEnrollment { current });
        }
        let created_at: String = row.try_get("created_at").map_err(map_sqlx_error)?;
        let created_at = parse_timestamp(&created_at, "courses.created_at")
            .map_err(|message| CoursePersistenceError::Query { message })?;

        sqlx::query(
            "UPDATE courses SET name = ?2, description = ?3, capacity = ?4 WHERE id = ?1",
        )
        .bind(id.to_string())
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.capacity)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(CourseUpdate::Updated(CourseWithCount {
            course: Course {
                id,
                name: draft.name.clone(),
                description: draft.description.clone(),
                capacity: draft.capacity,
                created_at,
            },
            current_enrollments: current,
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<CourseDeletion, CoursePersistenceError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let existing = sqlx::query(
            r#"
            SELECT name,
                   (SELECT COUNT(*) FROM enrollments e WHERE e.course_id = courses.id)
                       AS current_enrollments
            FROM courses WHERE id = ?1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = existing else {
            return Ok(CourseDeletion::NotFound);
        };
        let name: String = row.try_get("name").map_err(map_sqlx_error)?;
        let count: i64 = row.try_get("current_enrollments").map_err(map_sqlx_error)?;
        if count > 0 {
            return Ok(CourseDeletion::HasEnrollments { name, count });
        }

        sqlx::query("DELETE FROM courses WHERE id = ?1")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(CourseDeletion::Deleted { name })
    }

    async fn count(&self) -> Result<i64, CoursePersistenceError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}
