//! Course catalog use-cases.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{
    CourseDeletion, CoursePersistenceError, CourseRepository, CourseUpdate,
};
use crate::domain::{Course, CourseDraft, CoursePage, CourseQuery, CourseWithCount, Error};

fn map_persistence_error(error: CoursePersistenceError) -> Error {
    Error::internal(error.to_string())
}

/// Catalog CRUD service over the course repository.
#[derive(Clone)]
pub struct CatalogService {
    courses: Arc<dyn CourseRepository>,
}

impl CatalogService {
    /// Create the service over a course repository.
    pub fn new(courses: Arc<dyn CourseRepository>) -> Self {
        Self { courses }
    }

    /// List a page of courses. Paging bounds were validated when the
    /// [`CourseQuery`] was constructed.
    pub async fn list(&self, query: &CourseQuery) -> Result<CoursePage, Error> {
        self.courses.list(query).await.map_err(map_persistence_error)
    }

    /// Fetch a course with its enrollment count.
    pub async fn get(&self, id: Uuid) -> Result<CourseWithCount, Error> {
        self.courses
            .find_with_count(id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::not_found("Course not found"))
    }

    /// Create a course with a server-assigned id and timestamp.
    pub async fn create(&self, draft: CourseDraft) -> Result<Course, Error> {
        let course = Course {
            id: Uuid::new_v4(),
            name: draft.name,
            description: draft.description,
            capacity: draft.capacity,
            created_at: Utc::now(),
        };
        self.courses
            .insert(&course)
            .await
            .map_err(map_persistence_error)?;
        info!(course_id = %course.id, name = %course.name, "created course");
        Ok(course)
    }

    /// Replace a course's name, description, and capacity.
    ///
    /// Rejected when the new capacity is below the current enrollment
    /// count; the count cited in the error is read in the same storage
    /// transaction as the write.
    pub async fn update(&self, id: Uuid, draft: CourseDraft) -> Result<CourseWithCount, Error> {
        match self
            .courses
            .update(id, &draft)
            .await
            .map_err(map_persistence_error)?
        {
            CourseUpdate::Updated(updated) => Ok(updated),
            CourseUpdate::NotFound => Err(Error::not_found("Course not found")),
            CourseUpdate::CapacityBelowEnrollment { current } => Err(Error::conflict(format!(
                "Cannot set capacity to {}. Course currently has {current} enrolled students.",
                draft.capacity
            ))
            .with_details(json!({ "code": "capacity_below_enrollment" }))),
        }
    }

    /// Delete a course, refused while enrollments reference it.
    pub async fn delete(&self, id: Uuid) -> Result<(), Error> {
        match self.courses.delete(id).await.map_err(map_persistence_error)? {
            CourseDeletion::Deleted { name } => {
                info!(course_id = %id, name = %name, "deleted course");
                Ok(())
            }
            CourseDeletion::NotFound => Err(Error::not_found("Course not found")),
            CourseDeletion::HasEnrollments { name, count } => Err(Error::conflict(format!(
                "Cannot delete course '{name}' because it has {count} active enrollment(s). \
                 Please remove all enrollments first."
            ))
            .with_details(json!({ "code": "course_has_enrollments" }))),
        }
    }
}
