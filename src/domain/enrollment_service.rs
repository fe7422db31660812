//! Enrollment engine: seat claims, deregistration, and rosters.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{EnrollmentPersistenceError, EnrollmentRepository, SeatOutcome};
use crate::domain::{CourseRoster, Enrollment, EnrollmentWithCourse, Error, RosterEntry};

fn map_persistence_error(error: EnrollmentPersistenceError) -> Error {
    Error::internal(error.to_string())
}

/// Seat-claim and roster service over the enrollment repository.
///
/// The repository's `enroll` evaluates existence, duplicate, and capacity
/// checks together with the insert, so two racing claims for a last seat
/// cannot both succeed.
#[derive(Clone)]
pub struct EnrollmentService {
    enrollments: Arc<dyn EnrollmentRepository>,
}

impl EnrollmentService {
    /// Create the service over an enrollment repository.
    pub fn new(enrollments: Arc<dyn EnrollmentRepository>) -> Self {
        Self { enrollments }
    }

    /// Claim a seat in a course for a student.
    pub async fn enroll(&self, student_id: Uuid, course_id: Uuid) -> Result<Enrollment, Error> {
        let enrollment = Enrollment {
            id: Uuid::new_v4(),
            student_id,
            course_id,
            enrolled_at: Utc::now(),
        };
        match self
            .enrollments
            .enroll(&enrollment)
            .await
            .map_err(map_persistence_error)?
        {
            SeatOutcome::Enrolled(enrollment) => {
                info!(
                    enrollment_id = %enrollment.id,
                    student_id = %enrollment.student_id,
                    course_id = %enrollment.course_id,
                    "enrolled student"
                );
                Ok(enrollment)
            }
            SeatOutcome::CourseMissing => {
                Err(Error::not_found("This course is no longer available."))
            }
            SeatOutcome::AlreadyEnrolled => {
                Err(Error::conflict("You are already enrolled in this course.")
                    .with_details(json!({ "code": "duplicate_enrollment" })))
            }
            SeatOutcome::CourseFull { capacity } => Err(Error::conflict(format!(
                "This course is full. Capacity: {capacity} students."
            ))
            .with_details(json!({ "code": "course_full" }))),
        }
    }

    /// Drop an enrollment owned by the caller.
    ///
    /// An enrollment that does not exist and one owned by another student
    /// are indistinguishable to the caller; both report not found.
    pub async fn deregister(&self, enrollment_id: Uuid, student_id: Uuid) -> Result<(), Error> {
        let deleted = self
            .enrollments
            .delete_owned(enrollment_id, student_id)
            .await
            .map_err(map_persistence_error)?;
        if deleted {
            info!(enrollment_id = %enrollment_id, student_id = %student_id, "deregistered");
            Ok(())
        } else {
            Err(Error::not_found("Enrollment not found"))
        }
    }

    /// List a student's enrollments with the course name and description.
    pub async fn list_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<EnrollmentWithCourse>, Error> {
        self.enrollments
            .list_for_student(student_id)
            .await
            .map_err(map_persistence_error)
    }

    /// List the students enrolled in one course.
    pub async fn list_for_course(&self, course_id: Uuid) -> Result<Vec<RosterEntry>, Error> {
        self.enrollments
            .list_for_course(course_id)
            .await
            .map_err(map_persistence_error)
    }

    /// List every course that has at least one enrollment, with its roster.
    pub async fn list_course_rosters(&self) -> Result<Vec<CourseRoster>, Error> {
        self.enrollments
            .list_course_rosters()
            .await
            .map_err(map_persistence_error)
    }
}
