//! SQLite adapter for the student repository port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::ports::{StudentPersistenceError, StudentRepository};
use crate::domain::{Role, Student};

/// Student accounts stored in the `students` table.
#[derive(Clone)]
pub struct SqliteStudentRepository {
    pool: SqlitePool,
}

impl SqliteStudentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_sqlx_error(error: sqlx::Error) -> StudentPersistenceError {
    match error {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StudentPersistenceError::Connection {
                message: error.to_string(),
            }
        }
        other => StudentPersistenceError::Query {
            message: other.to_string(),
        },
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .is_some_and(|db| matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation))
}

pub(crate) fn parse_uuid(raw: &str, column: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw).map_err(|_| format!("{column} holds a malformed uuid: {raw}"))
}

pub(crate) fn parse_timestamp(raw: &str, column: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| format!("{column} holds a malformed timestamp: {raw}"))
}

fn student_from_row(row: &SqliteRow) -> Result<Student, StudentPersistenceError> {
    let map_column = |message: String| StudentPersistenceError::Query { message };

    let id: String = row.try_get("id").map_err(map_sqlx_error)?;
    let role: String = row.try_get("role").map_err(map_sqlx_error)?;
    let created_at: String = row.try_get("created_at").map_err(map_sqlx_error)?;

    Ok(Student {
        id: parse_uuid(&id, "students.id").map_err(map_column)?,
        email: row.try_get("email").map_err(map_sqlx_error)?,
        first_name: row.try_get("first_name").map_err(map_sqlx_error)?,
        last_name: row.try_get("last_name").map_err(map_sqlx_error)?,
        password_hash: row.try_get("password_hash").map_err(map_sqlx_error)?,
        role: role
            .parse::<Role>()
            .map_err(|err| map_column(err.to_string()))?,
        created_at: parse_timestamp(&created_at, "students.created_at").map_err(map_column)?,
    })
}

#[async_trait]
impl StudentRepository for SqliteStudentRepository {
    async fn insert(&self, student: &Student) -> Result<(), StudentPersistenceError> {
        let result = sqlx::query(
            r#"
            INSERT INTO students (id, email, first_name, last_name, password_hash, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(student.id.to_string())
        .bind(&student.email)
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(&student.password_hash)
        .bind(student.role.as_str())
        .bind(student.created_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(StudentPersistenceError::DuplicateEmail {
                    email: student.email.clone(),
                })
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Student>, StudentPersistenceError> {
        let row = sqlx::query("SELECT * FROM students WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        row.as_ref().map(student_from_row).transpose()
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Student>, StudentPersistenceError> {
        let row = sqlx::query("SELECT * FROM students WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        row.as_ref().map(student_from_row).transpose()
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<(), StudentPersistenceError> {
        sqlx::query("UPDATE students SET role = ?2 WHERE id = ?1")
            .bind(id.to_string())
            .bind(role.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}
