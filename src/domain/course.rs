//! Course aggregate and catalog query types.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Maximum accepted page size for catalog listings.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Inclusive capacity bounds accepted for a course.
pub const CAPACITY_RANGE: std::ops::RangeInclusive<i64> = 1..=1000;

/// A course offered in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    /// Server-assigned identifier.
    pub id: Uuid,
    /// Course name.
    pub name: String,
    /// Course description.
    pub description: String,
    /// Ceiling on concurrent active enrollments.
    pub capacity: i64,
    /// Creation timestamp; default catalog sort key.
    pub created_at: DateTime<Utc>,
}

/// New or replacement course content supplied by an administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDraft {
    /// Course name, at least two characters.
    pub name: String,
    /// Non-empty description.
    pub description: String,
    /// Capacity within [`CAPACITY_RANGE`].
    pub capacity: i64,
}

/// A course joined with its active enrollment count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseWithCount {
    /// The course record.
    pub course: Course,
    /// Number of active enrollment rows referencing the course.
    pub current_enrollments: i64,
}

/// Catalog sort fields accepted by the list operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    /// Sort by course name.
    Name,
    /// Sort by capacity.
    Capacity,
    /// Sort by creation timestamp (the default).
    CreatedAt,
}

impl std::str::FromStr for SortBy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "capacity" => Ok(Self::Capacity),
            "createdAt" => Ok(Self::CreatedAt),
            _ => Err(()),
        }
    }
}

/// Sort direction for catalog listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl std::str::FromStr for SortDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ascending" | "asc" => Ok(Self::Ascending),
            "descending" | "desc" => Ok(Self::Descending),
            _ => Err(()),
        }
    }
}

/// Validated catalog listing parameters.
///
/// Construct via [`CourseQuery::new`], which rejects out-of-range paging
/// before any storage is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseQuery {
    /// Zero-based page index.
    pub page: u32,
    /// Items per page, `1..=MAX_PAGE_SIZE`.
    pub page_size: u32,
    /// Optional case-insensitive substring matched against name and
    /// description.
    pub search: Option<String>,
    /// Sort field; `CreatedAt` when unspecified.
    pub sort_by: SortBy,
    /// Sort direction; ascending when unspecified.
    pub sort_direction: SortDirection,
}

/// Paging bounds rejected by [`CourseQuery::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CourseQueryError {
    /// Page size was zero or exceeded [`MAX_PAGE_SIZE`].
    #[error("pageSize must be between 1 and {MAX_PAGE_SIZE}")]
    PageSizeOutOfRange,
}

impl CourseQuery {
    /// Validate listing parameters.
    pub fn new(
        page: u32,
        page_size: u32,
        search: Option<String>,
        sort_by: Option<SortBy>,
        sort_direction: Option<SortDirection>,
    ) -> Result<Self, CourseQueryError> {
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(CourseQueryError::PageSizeOutOfRange);
        }
        Ok(Self {
            page,
            page_size,
            search,
            sort_by: sort_by.unwrap_or(SortBy::CreatedAt),
            sort_direction: sort_direction.unwrap_or_default(),
        })
    }

    /// Rows skipped before the requested page.
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.page_size)
    }
}

/// One page of catalog results plus the unpaged match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoursePage {
    /// Courses on this page, each with its enrollment count.
    pub items: Vec<CourseWithCount>,
    /// Total matching courses across all pages.
    pub total_items: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(100, true)]
    #[case(101, false)]
    fn query_enforces_page_size_bounds(#[case] page_size: u32, #[case] ok: bool) {
        let result = CourseQuery::new(0, page_size, None, None, None);
        assert_eq!(result.is_ok(), ok);
    }

    #[test]
    fn query_defaults_to_created_at_ascending() {
        let query = CourseQuery::new(0, 10, None, None, None).expect("valid query");
        assert_eq!(query.sort_by, SortBy::CreatedAt);
        assert_eq!(query.sort_direction, SortDirection::Ascending);
    }

    #[test]
    fn offset_multiplies_page_by_size() {
        let query = CourseQuery::new(3, 25, None, None, None).expect("valid query");
        assert_eq!(query.offset(), 75);
    }

    #[rstest]
    #[case("name", SortBy::Name)]
    #[case("capacity", SortBy::Capacity)]
    #[case("createdAt", SortBy::CreatedAt)]
    fn sort_by_parses_known_fields(#[case] raw: &str, #[case] expected: SortBy) {
        assert_eq!(raw.parse::<SortBy>().expect("known field"), expected);
    }

    #[test]
    fn sort_by_rejects_unknown_fields() {
        assert!("enrolledAt".parse::<SortBy>().is_err());
    }
}
