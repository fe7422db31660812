//! HTTP adapter: handlers, extractors, and the error mapping.

pub mod auth;
pub mod bearer;
pub mod courses;
pub mod enrollments;
pub mod error;
pub mod health;
pub mod state;
pub mod validation;

pub use error::ApiResult;
pub use state::HttpState;
