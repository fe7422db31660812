//! Port for student persistence adapters.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Role, Student};

/// Persistence errors raised by student repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StudentPersistenceError {
    /// Repository connection could not be established.
    #[error("student repository connection failed: {message}")]
    Connection {
        /// Driver-level description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("student repository query failed: {message}")]
    Query {
        /// Driver-level description.
        message: String,
    },
    /// Insert violated the unique email index.
    #[error("email already registered: {email}")]
    DuplicateEmail {
        /// The conflicting address.
        email: String,
    },
}

/// Port for reading and writing student accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Insert a new student. Fails with
    /// [`StudentPersistenceError::DuplicateEmail`] when the address is
    /// already registered.
    async fn insert(&self, student: &Student) -> Result<(), StudentPersistenceError>;

    /// Fetch a student by identifier.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Student>, StudentPersistenceError>;

    /// Fetch a student by exact (case-sensitive) email.
    async fn find_by_email(&self, email: &str)
    -> Result<Option<Student>, StudentPersistenceError>;

    /// Overwrite a student's role. Used by startup seeding to correct a
    /// drifted admin account.
    async fn set_role(&self, id: Uuid, role: Role) -> Result<(), StudentPersistenceError>;
}
