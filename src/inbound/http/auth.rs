//! Authentication API handlers.
//!
//! ```text
//! POST /api/auth/register  {"email":"...","firstName":"...","lastName":"...","password":"..."}
//! POST /api/auth/login     {"email":"...","password":"..."}
//! POST /api/auth/provision (bearer token)
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Registration, Student};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::AuthContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::FieldErrors;

/// Registration request body.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl RegisterRequest {
    fn validate(&self) -> Result<(), crate::domain::Error> {
        let mut errors = FieldErrors::new();
        errors.require_email("email", &self.email);
        errors.require_min_len("firstName", &self.first_name, 2);
        errors.require_min_len("lastName", &self.last_name, 2);
        errors.require_min_len("password", &self.password, 6);
        errors.finish()
    }
}

/// Registered account, without any credential material.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<Student> for RegisterResponse {
    fn from(student: Student) -> Self {
        Self {
            id: student.id,
            email: student.email,
            first_name: student.first_name,
            last_name: student.last_name,
        }
    }
}

/// Login request body.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    fn validate(&self) -> Result<(), crate::domain::Error> {
        let mut errors = FieldErrors::new();
        errors.require_email("email", &self.email);
        errors.require_non_empty("password", &self.password);
        errors.finish()
    }
}

/// Successful login: a signed token plus the account profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Provisioned account including its resolved role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

impl From<Student> for ProvisionResponse {
    fn from(student: Student) -> Self {
        Self {
            id: student.id,
            email: student.email,
            first_name: student.first_name,
            last_name: student.last_name,
            role: student.role.to_string(),
        }
    }
}

/// Create a student account.
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<web::Json<RegisterResponse>> {
    let request = payload.into_inner();
    request.validate()?;
    let student = state
        .identity
        .register(Registration {
            email: request.email,
            first_name: request.first_name,
            last_name: request.last_name,
            password: request.password,
        })
        .await?;
    Ok(web::Json(student.into()))
}

/// Authenticate and issue a bearer token.
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let request = payload.into_inner();
    request.validate()?;
    let student = state.identity.login(&request.email, &request.password).await?;
    let token = state.tokens.issue(&student)?;
    Ok(web::Json(LoginResponse {
        token,
        id: student.id,
        email: student.email,
        first_name: student.first_name,
        last_name: student.last_name,
    }))
}

/// Find or create a local account for the verified caller's claims.
///
/// Any authenticated principal may call this; the account is keyed by the
/// email claim, so repeated calls return the same record.
#[post("/provision")]
pub async fn provision(
    state: web::Data<HttpState>,
    auth: AuthContext,
) -> ApiResult<web::Json<ProvisionResponse>> {
    let student = state.provisioning.provision(auth.claims()).await?;
    Ok(web::Json(student.into()))
}
