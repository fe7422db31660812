//! Registration and password login.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{StudentPersistenceError, StudentRepository};
use crate::domain::{Error, Role, Student, password};

fn map_persistence_error(error: StudentPersistenceError) -> Error {
    match error {
        StudentPersistenceError::DuplicateEmail { .. } => {
            Error::conflict("Email already registered")
                .with_details(json!({ "code": "email_taken" }))
        }
        other => Error::internal(other.to_string()),
    }
}

/// Validated registration input (field shapes checked by the HTTP layer).
#[derive(Debug, Clone)]
pub struct Registration {
    /// Unique email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
}

/// Registration and login use-cases over the student repository.
#[derive(Clone)]
pub struct IdentityService {
    students: Arc<dyn StudentRepository>,
}

impl IdentityService {
    /// Create the service over a student repository.
    pub fn new(students: Arc<dyn StudentRepository>) -> Self {
        Self { students }
    }

    /// Register a new student account with role `Student`.
    ///
    /// A duplicate email is rejected whether caught by the pre-check or by
    /// the storage layer's unique index.
    pub async fn register(&self, registration: Registration) -> Result<Student, Error> {
        if self
            .students
            .find_by_email(&registration.email)
            .await
            .map_err(map_persistence_error)?
            .is_some()
        {
            return Err(Error::conflict("Email already registered")
                .with_details(json!({ "code": "email_taken" })));
        }

        let student = Student {
            id: Uuid::new_v4(),
            email: registration.email,
            first_name: registration.first_name,
            last_name: registration.last_name,
            password_hash: password::hash_password(&registration.password)?,
            role: Role::Student,
            created_at: Utc::now(),
        };
        self.students
            .insert(&student)
            .await
            .map_err(map_persistence_error)?;

        info!(student_id = %student.id, "registered new student");
        Ok(student)
    }

    /// Authenticate an email/password pair.
    ///
    /// Externally-provisioned accounts carry an empty password hash and
    /// therefore never authenticate here.
    pub async fn login(&self, email: &str, password_attempt: &str) -> Result<Student, Error> {
        let student = self
            .students
            .find_by_email(email)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| {
                Error::unauthorized(
                    "You do not have a valid account. Please register for a new account.",
                )
            })?;

        if !password::verify_password(&student.password_hash, password_attempt) {
            return Err(Error::unauthorized("Incorrect password. Please try again."));
        }

        Ok(student)
    }
}
