//! Port for course catalog persistence adapters.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Course, CourseDraft, CoursePage, CourseQuery, CourseWithCount};

/// Persistence errors raised by course repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoursePersistenceError {
    /// Repository connection could not be established.
    #[error("course repository connection failed: {message}")]
    Connection {
        /// Driver-level description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("course repository query failed: {message}")]
    Query {
        /// Driver-level description.
        message: String,
    },
}

/// Outcome of a full-replace course update.
///
/// The capacity re-check runs in the same transaction as the write so a
/// concurrent enrollment cannot slip under a shrinking ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseUpdate {
    /// Update applied; the stored course with its enrollment count.
    Updated(CourseWithCount),
    /// No course with the given id.
    NotFound,
    /// Requested capacity is below the current enrollment count.
    CapacityBelowEnrollment {
        /// Active enrollments at the time of the check.
        current: i64,
    },
}

/// Outcome of a course deletion attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseDeletion {
    /// Row removed.
    Deleted {
        /// Name of the deleted course, for logging.
        name: String,
    },
    /// No course with the given id.
    NotFound,
    /// Deletion refused: enrollments still reference the course.
    HasEnrollments {
        /// Course name, echoed in the client-facing message.
        name: String,
        /// Number of blocking enrollments.
        count: i64,
    },
}

/// Port for course catalog reads and writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// List a validated page of courses with enrollment counts and the
    /// unpaged match total.
    async fn list(&self, query: &CourseQuery) -> Result<CoursePage, CoursePersistenceError>;

    /// Fetch a course and its enrollment count.
    async fn find_with_count(
        &self,
        id: Uuid,
    ) -> Result<Option<CourseWithCount>, CoursePersistenceError>;

    /// Insert a new course.
    async fn insert(&self, course: &Course) -> Result<(), CoursePersistenceError>;

    /// Replace name, description, and capacity, refusing capacities below
    /// the current enrollment count.
    async fn update(
        &self,
        id: Uuid,
        draft: &CourseDraft,
    ) -> Result<CourseUpdate, CoursePersistenceError>;

    /// Delete a course unless enrollments still reference it.
    async fn delete(&self, id: Uuid) -> Result<CourseDeletion, CoursePersistenceError>;

    /// Total number of courses. Drives the idempotent startup seeding.
    async fn count(&self) -> Result<i64, CoursePersistenceError>;
}
