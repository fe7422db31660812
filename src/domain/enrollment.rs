//! Enrollment join entity and read projections.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A record linking one student to one course at a point in time.
///
/// The `(student_id, course_id)` pair is unique: the storage layer carries
/// a unique index and the enrollment engine re-checks before inserting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    /// Server-assigned identifier.
    pub id: Uuid,
    /// Enrolled student.
    pub student_id: Uuid,
    /// Target course.
    pub course_id: Uuid,
    /// Enrollment timestamp.
    pub enrolled_at: DateTime<Utc>,
}

/// A student's enrollment joined with course content, for the "my
/// enrollments" listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentWithCourse {
    /// The enrollment record.
    pub enrollment: Enrollment,
    /// Name of the enrolled course.
    pub course_name: String,
    /// Description of the enrolled course.
    pub course_description: String,
}

/// A course roster entry joined with student identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    /// Enrollment identifier.
    pub enrollment_id: Uuid,
    /// Enrolled student's identifier.
    pub student_id: Uuid,
    /// Student's given name.
    pub student_first_name: String,
    /// Student's family name.
    pub student_last_name: String,
    /// Student's email.
    pub student_email: String,
    /// Enrollment timestamp.
    pub enrolled_at: DateTime<Utc>,
}

/// A course paired with its full roster, for the admin overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRoster {
    /// Course identifier.
    pub course_id: Uuid,
    /// Course name.
    pub course_name: String,
    /// Course description.
    pub course_description: String,
    /// Course capacity.
    pub capacity: i64,
    /// Course creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Roster ordered by enrollment time ascending.
    pub entries: Vec<RosterEntry>,
}
