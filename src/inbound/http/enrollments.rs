//! Enrollment API handlers.
//!
//! ```text
//! GET    /api/enrollments/me             (authenticated)
//! POST   /api/enrollments                (student)
//! DELETE /api/enrollments/{id}           (student)
//! GET    /api/enrollments/admin/courses  (admin)
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{CourseRoster, Enrollment, EnrollmentWithCourse, RosterEntry};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::AuthContext;
use crate::inbound::http::state::HttpState;

/// Enrollment request body.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub course_id: Uuid,
}

/// A newly claimed seat.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub enrolled_at: DateTime<Utc>,
}

impl From<Enrollment> for EnrollResponse {
    fn from(enrollment: Enrollment) -> Self {
        Self {
            id: enrollment.id,
            student_id: enrollment.student_id,
            course_id: enrollment.course_id,
            enrolled_at: enrollment.enrolled_at,
        }
    }
}

/// One of the caller's enrollments with its course details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentDto {
    pub id: Uuid,
    pub course_id: Uuid,
    pub course_name: String,
    pub course_description: String,
    pub enrolled_at: DateTime<Utc>,
}

impl From<EnrollmentWithCourse> for EnrollmentDto {
    fn from(value: EnrollmentWithCourse) -> Self {
        Self {
            id: value.enrollment.id,
            course_id: value.enrollment.course_id,
            course_name: value.course_name,
            course_description: value.course_description,
            enrolled_at: value.enrollment.enrolled_at,
        }
    }
}

/// A roster line in the admin view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentEnrollmentDto {
    pub enrollment_id: Uuid,
    pub student_id: Uuid,
    pub student_first_name: String,
    pub student_last_name: String,
    pub student_email: String,
    pub enrolled_at: DateTime<Utc>,
}

impl From<RosterEntry> for StudentEnrollmentDto {
    fn from(entry: RosterEntry) -> Self {
        Self {
            enrollment_id: entry.enrollment_id,
            student_id: entry.student_id,
            student_first_name: entry.student_first_name,
            student_last_name: entry.student_last_name,
            student_email: entry.student_email,
            enrolled_at: entry.enrolled_at,
        }
    }
}

/// Admin view of a course with its full roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseWithEnrollmentsDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub capacity: i64,
    pub current_enrollments: i64,
    pub created_at: DateTime<Utc>,
    pub enrollments: Vec<StudentEnrollmentDto>,
}

impl From<CourseRoster> for CourseWithEnrollmentsDto {
    fn from(roster: CourseRoster) -> Self {
        let enrollments: Vec<StudentEnrollmentDto> = roster
            .entries
            .into_iter()
            .map(StudentEnrollmentDto::from)
            .collect();
        Self {
            id: roster.course_id,
            name: roster.course_name,
            description: roster.course_description,
            capacity: roster.capacity,
            current_enrollments: enrollments.len() as i64,
            created_at: roster.created_at,
            enrollments,
        }
    }
}

/// List the caller's enrollments, newest first.
#[get("/me")]
pub async fn my_enrollments(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<web::Json<Vec<EnrollmentDto>>> {
    let student_id = auth.student_id()?;
    let enrollments = state.enrollments.list_for_student(student_id).await?;
    Ok(web::Json(
        enrollments.into_iter().map(EnrollmentDto::from).collect(),
    ))
}

/// Claim a seat in a course for the calling student.
#[post("")]
pub async fn enroll(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<EnrollRequest>,
) -> ApiResult<web::Json<EnrollResponse>> {
    let student_id = auth.require_student()?;
    let enrollment = state
        .enrollments
        .enroll(student_id, payload.course_id)
        .await?;
    Ok(web::Json(enrollment.into()))
}

/// Drop one of the caller's own enrollments.
#[delete("/{enrollmentId}")]
pub async fn deregister(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let student_id = auth.require_student()?;
    state
        .enrollments
        .deregister(path.into_inner(), student_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Admin view: every course with at least one enrollment, with rosters.
#[get("/admin/courses")]
pub async fn courses_with_enrollments(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<web::Json<Vec<CourseWithEnrollmentsDto>>> {
    auth.require_admin()?;
    let rosters = state.enrollments.list_course_rosters().await?;
    Ok(web::Json(
        rosters
            .into_iter()
            .map(CourseWithEnrollmentsDto::from)
            .collect(),
    ))
}
