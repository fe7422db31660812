//! SQLite adapter for the enrollment port.
//!
//! The seat reservation runs its existence, duplicate, and capacity checks
//! in the same transaction as the insert. The unique
//! `(student_id, course_id)` index backs the duplicate check against races
//! the transaction does not see.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::ports::{EnrollmentPersistenceError, EnrollmentRepository, SeatOutcome};
use crate::domain::{CourseRoster, Enrollment, EnrollmentWithCourse, RosterEntry};
use crate::outbound::persistence::sqlite_student_repository::{parse_timestamp, parse_uuid};

/// Enrollment rows stored in the `enrollments` table.
#[derive(Clone)]
pub struct SqliteEnrollmentRepository {
    pool: SqlitePool,
}

impl SqliteEnrollmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_sqlx_error(error: sqlx::Error) -> EnrollmentPersistenceError {
    match error {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            EnrollmentPersistenceError::Connection {
                message: error.to_string(),
            }
        }
        other => EnrollmentPersistenceError::Query {
            message: other.to_string(),
        },
    }
}

fn map_column(message: String) -> EnrollmentPersistenceError {
    EnrollmentPersistenceError::Query { message }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .is_some_and(|db| matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation))
}

fn roster_entry_from_row(row: &SqliteRow) -> Result<RosterEntry, EnrollmentPersistenceError> {
    let enrollment_id: String = row.try_get("enrollment_id").map_err(map_sqlx_error)?;
    let student_id: String = row.try_get("student_id").map_err(map_sqlx_error)?;
    let enrolled_at: String = row.try_get("enrolled_at").map_err(map_sqlx_error)?;

    Ok(RosterEntry {
        enrollment_id: parse_uuid(&enrollment_id, "enrollments.id").map_err(map_column)?,
        student_id: parse_uuid(&student_id, "enrollments.student_id").map_err(map_column)?,
        student_first_name: row.try_get("first_name").map_err(map_sqlx_error)?,
        student_last_name: row.try_get("last_name").map_err(map_sqlx_error)?,
        student_email: row.try_get("email").map_err(map_sqlx_error)?,
        enrolled_at: parse_timestamp(&enrolled_at, "enrollments.enrolled_at")
            .map_err(map_column)?,
    })
}

#[async_trait]
impl EnrollmentRepository for SqliteEnrollmentRepository {
    async fn enroll(&self, new: &Enrollment) -> Result<SeatOutcome, EnrollmentPersistenceError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let capacity: Option<i64> =
            sqlx::query_scalar("SELECT capacity FROM courses WHERE id = ?1")
                .bind(new.course_id.to_string())
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        let Some(capacity) = capacity else {
            return Ok(SeatOutcome::CourseMissing);
        };

        let duplicate: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM enrollments WHERE student_id = ?1 AND course_id = ?2",
        )
        .bind(new.student_id.to_string())
        .bind(new.course_id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
        if duplicate.is_some() {
            return Ok(SeatOutcome::AlreadyEnrolled);
        }

        let taken: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE course_id = ?1")
                .bind(new.course_id.to_string())
                .fetch_one(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        if taken >= capacity {
            return Ok(SeatOutcome::CourseFull { capacity });
        }

        let insert = sqlx::query(
            r#"
            INSERT INTO enrollments (id, student_id, course_id, enrolled_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(new.id.to_string())
        .bind(new.student_id.to_string())
        .bind(new.course_id.to_string())
        .bind(new.enrolled_at.to_rfc3339())
        .execute(&mut *tx)
        .await;

        match insert {
            Ok(_) => {
                tx.commit().await.map_err(map_sqlx_error)?;
                Ok(SeatOutcome::Enrolled(new.clone()))
            }
            Err(err) if is_unique_violation(&err) => Ok(SeatOutcome::AlreadyEnrolled),
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn delete_owned(
        &self,
        enrollment_id: Uuid,
        student_id: Uuid,
    ) -> Result<bool, EnrollmentPersistenceError> {
        let result = sqlx::query("DELETE FROM enrollments WHERE id = ?1 AND student_id = ?2")
            .bind(enrollment_id.to_string())
            .bind(student_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<EnrollmentWithCourse>, EnrollmentPersistenceError> {
        let rows = sqlx::query(
            r#"
            SELECT e.id, e.student_id, e.course_id, e.enrolled_at,
                   c.name AS course_name, c.description AS course_description
            FROM enrollments e
            JOIN courses c ON c.id = e.course_id
            WHERE e.student_id = ?1
            ORDER BY e.enrolled_at DESC, e.id ASC
            "#,
        )
        .bind(student_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter()
            .map(|row| {
                let id: String = row.try_get("id").map_err(map_sqlx_error)?;
                let course_id: String = row.try_get("course_id").map_err(map_sqlx_error)?;
                let enrolled_at: String = row.try_get("enrolled_at").map_err(map_sqlx_error)?;
                Ok(EnrollmentWithCourse {
                    enrollment: Enrollment {
                        id: parse_uuid(&id, "enrollments.id").map_err(map_column)?,
                        student_id,
                        course_id: parse_uuid(&course_id, "enrollments.course_id")
                            .map_err(map_column)?,
                        enrolled_at: parse_timestamp(&enrolled_at, "enrollments.enrolled_at")
                            .map_err(map_column)?,
                    },
                    course_name: row.try_get("course_name").map_err(map_sqlx_error)?,
                    course_description: row
                        .try_get("course_description")
                        .map_err(map_sqlx_error)?,
                })
            })
            .collect()
    }

    async fn list_for_course(
        &self,
        course_id: Uuid,
    ) -> Result<Vec<RosterEntry>, EnrollmentPersistenceError> {
        let rows = sqlx::query(
            r#"
            SELECT e.id AS enrollment_id, e.student_id, e.enrolled_at,
                   s.first_name, s.last_name, s.email
            FROM enrollments e
            JOIN students s ON s.id = e.student_id
            WHERE e.course_id = ?1
            ORDER BY e.enrolled_at ASC, e.id ASC
            "#,
        )
        .bind(course_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(roster_entry_from_row).collect()
    }

    async fn list_course_rosters(&self) -> Result<Vec<CourseRoster>, EnrollmentPersistenceError> {
        let rows = sqlx::query(
            r#"
            SELECT e.id AS enrollment_id, e.student_id, e.enrolled_at,
                   s.first_name, s.last_name, s.email,
                   c.id AS course_id, c.name AS course_name,
                   c.description AS course_description, c.capacity, c.created_at
            FROM enrollments e
            JOIN courses c ON c.id = e.course_id
            JOIN students s ON s.id = e.student_id
            ORDER BY c.name ASC, e.enrolled_at ASC, e.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        // Rows arrive grouped by course; fold them into rosters in order.
        let mut rosters: Vec<CourseRoster> = Vec::new();
        for row in &rows {
            let course_id: String = row.try_get("course_id").map_err(map_sqlx_error)?;
            let course_id = parse_uuid(&course_id, "courses.id").map_err(map_column)?;

            if rosters.last().map(|r| r.course_id) != Some(course_id) {
                let created_at: String = row.try_get("created_at").map_err(map_sqlx_error)?;
                rosters.push(CourseRoster {
                    course_id,
                    course_name: row.try_get("course_name").map_err(map_sqlx_error)?,
                    course_description: row
                        .try_get("course_description")
                        .map_err(map_sqlx_error)?,
                    capacity: row.try_get("capacity").map_err(map_sqlx_error)?,
                    created_at: parse_timestamp(&created_at, "courses.created_at")
                        .map_err(map_column)?,
                    entries: Vec::new(),
                });
            }
            let entry = roster_entry_from_row(row)?;
            if let Some(roster) = rosters.last_mut() {
                roster.entries.push(entry);
            }
        }
        Ok(rosters)
    }
}
