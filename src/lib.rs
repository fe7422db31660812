//! Student course-enrollment service library.
//!
//! Modules follow a hexagonal layout: `domain` holds transport-agnostic
//! entities, services, and ports; `inbound` adapts HTTP requests onto the
//! domain; `outbound` implements the persistence ports over SQLite.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use middleware::trace::Trace;
