//! Ports (trait seams) between the domain and its adapters.
//!
//! Repository traits are implemented by the SQLite adapters in
//! `outbound::persistence` and mocked with `mockall` in service tests.

mod course_repository;
mod enrollment_repository;
mod student_repository;

pub use course_repository::{
    CourseDeletion, CoursePersistenceError, CourseRepository, CourseUpdate,
};
pub use enrollment_repository::{
    EnrollmentPersistenceError, EnrollmentRepository, SeatOutcome,
};
pub use student_repository::{StudentPersistenceError, StudentRepository};

#[cfg(test)]
pub use course_repository::MockCourseRepository;
#[cfg(test)]
pub use enrollment_repository::MockEnrollmentRepository;
#[cfg(test)]
pub use student_repository::MockStudentRepository;
