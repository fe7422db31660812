//! Server construction and middleware wiring.

pub mod config;
pub mod seed;

pub use config::{AppConfig, ConfigError};

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use crate::Trace;
use crate::domain::{Error, TokenIssuer};
use crate::domain::ports::{CourseRepository, EnrollmentRepository, StudentRepository};
use crate::inbound::http::HttpState;
use crate::inbound::http::auth::{login, provision, register};
use crate::inbound::http::courses::{
    create_course, delete_course, get_course, list_courses, update_course,
};
use crate::inbound::http::enrollments::{
    courses_with_enrollments, deregister, enroll, my_enrollments,
};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::outbound::persistence::{
    self, SqliteCourseRepository, SqliteEnrollmentRepository, SqliteStudentRepository,
};

/// Open the database, run migrations and seeding, and wire the services.
///
/// # Errors
/// Returns [`std::io::Error`] when the database cannot be opened, migrated,
/// or seeded.
pub async fn init_state(config: &AppConfig) -> std::io::Result<HttpState> {
    let pool = persistence::connect(&config.database_url)
        .await
        .map_err(std::io::Error::other)?;

    let students: Arc<dyn StudentRepository> = Arc::new(SqliteStudentRepository::new(pool.clone()));
    let courses: Arc<dyn CourseRepository> = Arc::new(SqliteCourseRepository::new(pool.clone()));
    let enrollments: Arc<dyn EnrollmentRepository> =
        Arc::new(SqliteEnrollmentRepository::new(pool));

    seed::run(Arc::clone(&students), Arc::clone(&courses))
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    Ok(HttpState::new(
        students,
        courses,
        enrollments,
        TokenIssuer::new(config.jwt.clone()),
    ))
}

/// Extractor configs routing deserialization failures through the JSON
/// error envelope instead of actix's plain-text defaults.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| Error::invalid_request(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| Error::invalid_request(err.to_string()).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| Error::invalid_request(err.to_string()).into())
}

/// Assemble the application: shared state, tracing middleware, and the
/// `/api` scopes plus health probes.
pub fn build_app(
    http_state: web::Data<HttpState>,
    health_state: web::Data<HealthState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let auth = web::scope("/api/auth")
        .service(register)
        .service(login)
        .service(provision);

    let courses = web::scope("/api/courses")
        .service(list_courses)
        .service(get_course)
        .service(create_course)
        .service(update_course)
        .service(delete_course);

    let enrollments = web::scope("/api/enrollments")
        .service(my_enrollments)
        .service(courses_with_enrollments)
        .service(enroll)
        .service(deregister);

    App::new()
        .app_data(http_state)
        .app_data(health_state)
        .app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .wrap(Trace)
        .service(auth)
        .service(courses)
        .service(enrollments)
        .service(ready)
        .service(live)
}

/// Construct the HTTP server from pre-built state and configuration.
///
/// Readiness is flipped only after the socket is bound, so probes stay
/// negative while startup can still fail.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    http_state: HttpState,
    health_state: web::Data<HealthState>,
    config: &AppConfig,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(http_state);
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(http_state.clone(), server_health_state.clone())
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
