//! Bearer-token authentication context for handlers.
//!
//! [`AuthContext`] extracts and verifies the `Authorization: Bearer` header
//! against the configured token issuer. Handlers then assert the access they
//! need; routes without the extractor stay public.

use std::future::{Ready, ready};

use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use uuid::Uuid;

use crate::domain::{ClaimSet, Error, Role};
use crate::inbound::http::state::HttpState;

/// Verified claims of the calling user.
#[derive(Debug, Clone)]
pub struct AuthContext {
    claims: ClaimSet,
}

impl AuthContext {
    #[cfg(test)]
    pub fn from_claims(claims: ClaimSet) -> Self {
        Self { claims }
    }

    /// The verified claim set.
    pub fn claims(&self) -> &ClaimSet {
        &self.claims
    }

    /// The caller's student id from the `sub` claim.
    pub fn student_id(&self) -> Result<Uuid, Error> {
        let sub = self
            .claims
            .first("sub")
            .ok_or_else(|| Error::unauthorized("token has no subject"))?;
        Uuid::parse_str(sub).map_err(|_| Error::unauthorized("token subject is not a valid id"))
    }

    /// Assert the caller holds the student role, returning their id.
    pub fn require_student(&self) -> Result<Uuid, Error> {
        if !self.claims.has_role(Role::Student) {
            return Err(Error::forbidden("student role required"));
        }
        self.student_id()
    }

    /// Assert the caller holds the admin role.
    pub fn require_admin(&self) -> Result<(), Error> {
        if self.claims.has_role(Role::Admin) {
            Ok(())
        } else {
            Err(Error::forbidden("admin role required"))
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, Error> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("missing bearer token"))
}

fn extract(req: &HttpRequest) -> Result<AuthContext, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("token issuer not configured"))?;
    let claims = state.tokens.verify(bearer_token(req)?)?;
    Ok(AuthContext { claims })
}

impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;

    fn context(role: &str) -> AuthContext {
        AuthContext::from_claims(
            ClaimSet::new()
                .with("sub", "7f1c9a52-1234-4cde-9f00-aaaaaaaaaaaa")
                .with("role", role),
        )
    }

    #[test]
    fn student_id_parses_subject() {
        let id = context("Student").student_id().expect("student id");
        assert_eq!(id.to_string(), "7f1c9a52-1234-4cde-9f00-aaaaaaaaaaaa");
    }

    #[test]
    fn student_id_rejects_missing_subject() {
        let ctx = AuthContext::from_claims(ClaimSet::new());
        let err = ctx.student_id().unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[test]
    fn require_student_rejects_admin_only_caller() {
        let err = context("Admin").require_student().unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[test]
    fn require_admin_rejects_student() {
        let err = context("Student").require_admin().unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[test]
    fn require_admin_accepts_admin() {
        context("Admin").require_admin().expect("admin allowed");
    }
}
