//! Port for enrollment persistence adapters.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{CourseRoster, Enrollment, EnrollmentWithCourse, RosterEntry};

/// Persistence errors raised by enrollment repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnrollmentPersistenceError {
    /// Repository connection could not be established.
    #[error("enrollment repository connection failed: {message}")]
    Connection {
        /// Driver-level description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("enrollment repository query failed: {message}")]
    Query {
        /// Driver-level description.
        message: String,
    },
}

/// Outcome of an atomic seat reservation.
///
/// Adapters must evaluate course existence, the duplicate check, the
/// capacity check, and the insert as one atomic unit so concurrent enroll
/// attempts cannot both pass the capacity check before either inserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatOutcome {
    /// Seat taken; the stored enrollment row.
    Enrolled(Enrollment),
    /// The course does not exist.
    CourseMissing,
    /// The student already holds an enrollment in the course.
    AlreadyEnrolled,
    /// The course is at capacity.
    CourseFull {
        /// The course's capacity, echoed in the client-facing message.
        capacity: i64,
    },
}

/// Port for enrollment writes and roster reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Atomically reserve a seat: verify the course exists, the student is
    /// not already enrolled, and capacity remains, then insert.
    async fn enroll(&self, new: &Enrollment) -> Result<SeatOutcome, EnrollmentPersistenceError>;

    /// Delete an enrollment only when it belongs to the given student.
    /// Returns `false` (without deleting) when the row is missing or owned
    /// by someone else.
    async fn delete_owned(
        &self,
        enrollment_id: Uuid,
        student_id: Uuid,
    ) -> Result<bool, EnrollmentPersistenceError>;

    /// A student's enrollments joined with course content, newest first.
    async fn list_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<EnrollmentWithCourse>, EnrollmentPersistenceError>;

    /// A course's roster joined with student identity, oldest first.
    async fn list_for_course(
        &self,
        course_id: Uuid,
    ) -> Result<Vec<RosterEntry>, EnrollmentPersistenceError>;

    /// Every course with at least one enrollment, grouped with its roster,
    /// ordered by course name then enrollment time.
    async fn list_course_rosters(&self) -> Result<Vec<CourseRoster>, EnrollmentPersistenceError>;
}
