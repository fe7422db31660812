//! Domain model and use-case services.
//!
//! Entities and services live here; the [`ports`] module holds the trait
//! seams the outbound adapters implement. Nothing in this module touches
//! HTTP or storage directly.

pub mod catalog;
pub mod claims;
pub mod course;
pub mod enrollment;
pub mod enrollment_service;
pub mod error;
pub mod identity;
pub mod password;
pub mod ports;
pub mod provisioning;
pub mod student;
pub mod token;

pub use catalog::CatalogService;
pub use claims::ClaimSet;
pub use course::{
    CAPACITY_RANGE, Course, CourseDraft, CoursePage, CourseQuery, CourseQueryError,
    CourseWithCount, MAX_PAGE_SIZE, SortBy, SortDirection,
};
pub use enrollment::{CourseRoster, Enrollment, EnrollmentWithCourse, RosterEntry};
pub use enrollment_service::EnrollmentService;
pub use error::{Error, ErrorCode};
pub use identity::{IdentityService, Registration};
pub use provisioning::ProvisioningService;
pub use student::{Role, RoleParseError, Student};
pub use token::{JwtConfig, JwtConfigError, MIN_SECRET_LEN, TokenIssuer};
