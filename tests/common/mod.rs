//! Shared fixtures and request helpers for the HTTP integration suites.
//!
//! Every suite drives the real application assembled by `server::build_app`
//! over an in-memory SQLite database, so routing, extractors, the error
//! envelope, and persistence are all exercised together.

// Each suite uses a different subset of these helpers.
#![allow(dead_code)]

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header;
use actix_web::{test as actix_test, web};
use chrono::Utc;
use serde_json::{Value, json};
use uuid::Uuid;

use enrollment_api::domain::ports::{CourseRepository, EnrollmentRepository, StudentRepository};
use enrollment_api::domain::{JwtConfig, Role, Student, TokenIssuer};
use enrollment_api::inbound::http::HttpState;
use enrollment_api::inbound::http::health::HealthState;
use enrollment_api::outbound::persistence::{
    SqliteCourseRepository, SqliteEnrollmentRepository, SqliteStudentRepository, connect_in_memory,
};
use enrollment_api::server::seed;

const SECRET: &str = "0123456789abcdef0123456789abcdef";

/// The startup-seeded admin credentials.
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "Admin123!";

/// Default password used for accounts registered by the suites.
pub const PASSWORD: &str = "Passw0rd!";

/// State pair for `server::build_app`.
pub struct TestApp {
    pub http_state: web::Data<HttpState>,
    pub health_state: web::Data<HealthState>,
}

/// Build application state over a fresh in-memory database.
///
/// With `seeded` the startup seeding runs first, so the admin account and
/// the sample catalog are present; without it the database starts empty.
pub async fn test_app(seeded: bool) -> TestApp {
    let pool = connect_in_memory().await.expect("open in-memory database");
    let students: Arc<dyn StudentRepository> = Arc::new(SqliteStudentRepository::new(pool.clone()));
    let courses: Arc<dyn CourseRepository> = Arc::new(SqliteCourseRepository::new(pool.clone()));
    let enrollments: Arc<dyn EnrollmentRepository> =
        Arc::new(SqliteEnrollmentRepository::new(pool));

    if seeded {
        seed::run(Arc::clone(&students), Arc::clone(&courses))
            .await
            .expect("seed database");
    }

    let tokens = TokenIssuer::new(
        JwtConfig::new("enrollment-api", "enrollment-ui", SECRET).expect("jwt config"),
    );
    let health_state = web::Data::new(HealthState::new());
    health_state.mark_ready();

    TestApp {
        http_state: web::Data::new(HttpState::new(students, courses, enrollments, tokens)),
        health_state,
    }
}

pub fn get(uri: &str) -> Request {
    actix_test::TestRequest::get().uri(uri).to_request()
}

pub fn get_authed(uri: &str, token: &str) -> Request {
    actix_test::TestRequest::get()
        .uri(uri)
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request()
}

pub fn post_json(uri: &str, body: &Value) -> Request {
    actix_test::TestRequest::post()
        .uri(uri)
        .set_json(body)
        .to_request()
}

pub fn post_json_authed(uri: &str, token: &str, body: &Value) -> Request {
    actix_test::TestRequest::post()
        .uri(uri)
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .set_json(body)
        .to_request()
}

pub fn put_json_authed(uri: &str, token: &str, body: &Value) -> Request {
    actix_test::TestRequest::put()
        .uri(uri)
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .set_json(body)
        .to_request()
}

pub fn delete_authed(uri: &str, token: &str) -> Request {
    actix_test::TestRequest::delete()
        .uri(uri)
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request()
}

/// Read the response body as JSON.
pub async fn body_json<B: MessageBody>(response: ServiceResponse<B>) -> Value {
    actix_test::read_body_json(response).await
}

/// Register an account and log it in, returning the bearer token.
pub async fn student_token<S, B>(app: &S, email: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let registered = actix_test::call_service(
        app,
        post_json(
            "/api/auth/register",
            &json!({
                "email": email,
                "firstName": "Test",
                "lastName": "Student",
                "password": PASSWORD,
            }),
        ),
    )
    .await;
    assert!(registered.status().is_success(), "registration failed");
    login_token(app, email, PASSWORD).await
}

/// Log an existing account in, returning the bearer token.
pub async fn login_token<S, B>(app: &S, email: &str, password: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = actix_test::call_service(
        app,
        post_json(
            "/api/auth/login",
            &json!({ "email": email, "password": password }),
        ),
    )
    .await;
    assert!(response.status().is_success(), "login failed");
    let body = body_json(response).await;
    body["token"].as_str().expect("login token").to_owned()
}

/// Mint an admin bearer token directly, without a database account.
///
/// Role enforcement reads the token claims only, so catalog management
/// works without provisioning the admin row first.
pub fn admin_token(state: &web::Data<HttpState>) -> String {
    let admin = Student {
        id: Uuid::new_v4(),
        email: "ops.admin@example.com".into(),
        first_name: "Ops".into(),
        last_name: "Admin".into(),
        password_hash: String::new(),
        role: Role::Admin,
        created_at: Utc::now(),
    };
    state.tokens.issue(&admin).expect("issue admin token")
}

/// Create a course through the API, returning its id.
pub async fn create_course<S, B>(app: &S, admin: &str, name: &str, capacity: i64) -> Uuid
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = actix_test::call_service(
        app,
        post_json_authed(
            "/api/courses",
            admin,
            &json!({
                "name": name,
                "description": format!("{name} course"),
                "capacity": capacity,
            }),
        ),
    )
    .await;
    assert_eq!(response.status().as_u16(), 201, "course creation failed");
    let body = body_json(response).await;
    body["id"]
        .as_str()
        .and_then(|raw| raw.parse().ok())
        .expect("created course id")
}
