//! Course catalog API handlers.
//!
//! ```text
//! GET    /api/courses?page=0&pageSize=10&searchString=rust&sortBy=name&sortDirection=asc
//! GET    /api/courses/{id}
//! POST   /api/courses          (admin)
//! PUT    /api/courses/{id}     (admin)
//! DELETE /api/courses/{id}     (admin)
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Course, CourseDraft, CourseQuery, CourseWithCount, Error, SortBy, SortDirection,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::AuthContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::FieldErrors;

/// Catalog listing query parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCoursesQuery {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    pub search_string: Option<String>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
}

fn default_page_size() -> u32 {
    10
}

impl ListCoursesQuery {
    fn into_domain(self) -> Result<CourseQuery, Error> {
        let sort_by = self
            .sort_by
            .as_deref()
            .map(|raw| {
                raw.parse::<SortBy>().map_err(|()| {
                    Error::invalid_request(format!("unsupported sortBy value: {raw}"))
                })
            })
            .transpose()?;
        let sort_direction = self
            .sort_direction
            .as_deref()
            .map(|raw| {
                raw.parse::<SortDirection>().map_err(|()| {
                    Error::invalid_request(format!("unsupported sortDirection value: {raw}"))
                })
            })
            .transpose()?;
        CourseQuery::new(
            self.page,
            self.page_size,
            self.search_string,
            sort_by,
            sort_direction,
        )
        .map_err(|err| Error::invalid_request(err.to_string()))
    }
}

/// Course create/update request body.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRequest {
    pub name: String,
    pub description: String,
    pub capacity: i64,
}

impl CourseRequest {
    fn validate(&self) -> Result<(), Error> {
        let mut errors = FieldErrors::new();
        errors.require_min_len("name", &self.name, 2);
        errors.require_non_empty("description", &self.description);
        errors.require_capacity("capacity", self.capacity);
        errors.finish()
    }

    fn into_draft(self) -> CourseDraft {
        CourseDraft {
            name: self.name,
            description: self.description,
            capacity: self.capacity,
        }
    }
}

/// Course representation with its live enrollment count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub capacity: i64,
    pub current_enrollments: i64,
    pub created_at: DateTime<Utc>,
}

impl CourseDto {
    fn from_course(course: Course, current_enrollments: i64) -> Self {
        Self {
            id: course.id,
            name: course.name,
            description: course.description,
            capacity: course.capacity,
            current_enrollments,
            created_at: course.created_at,
        }
    }
}

impl From<CourseWithCount> for CourseDto {
    fn from(value: CourseWithCount) -> Self {
        Self::from_course(value.course, value.current_enrollments)
    }
}

/// One page of catalog results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePageDto {
    pub items: Vec<CourseDto>,
    pub total_items: i64,
}

/// List courses with paging, search, and sorting.
#[get("")]
pub async fn list_courses(
    state: web::Data<HttpState>,
    query: web::Query<ListCoursesQuery>,
) -> ApiResult<web::Json<CoursePageDto>> {
    let query = query.into_inner().into_domain()?;
    let page = state.catalog.list(&query).await?;
    Ok(web::Json(CoursePageDto {
        items: page.items.into_iter().map(CourseDto::from).collect(),
        total_items: page.total_items,
    }))
}

/// Fetch one course.
#[get("/{id}")]
pub async fn get_course(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<CourseDto>> {
    let course = state.catalog.get(path.into_inner()).await?;
    Ok(web::Json(course.into()))
}

/// Create a course (admin only).
#[post("")]
pub async fn create_course(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<CourseRequest>,
) -> ApiResult<HttpResponse> {
    auth.require_admin()?;
    let request = payload.into_inner();
    request.validate()?;
    let course = state.catalog.create(request.into_draft()).await?;
    let location = format!("/api/courses/{}", course.id);
    // A fresh course has no enrollments yet.
    let dto = CourseDto::from_course(course, 0);
    Ok(HttpResponse::Created()
        .insert_header(("Location", location))
        .json(dto))
}

/// Replace a course's details (admin only).
#[put("/{id}")]
pub async fn update_course(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
    payload: web::Json<CourseRequest>,
) -> ApiResult<web::Json<CourseDto>> {
    auth.require_admin()?;
    let request = payload.into_inner();
    request.validate()?;
    let updated = state
        .catalog
        .update(path.into_inner(), request.into_draft())
        .await?;
    Ok(web::Json(updated.into()))
}

/// Delete a course (admin only, refused while enrollments exist).
#[delete("/{id}")]
pub async fn delete_course(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    auth.require_admin()?;
    state.catalog.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
