//! JWT issuing and verification.
//!
//! Tokens are HS256-signed and carry the subject id, email, display name,
//! given/family names, and role as claims, bounded by the configured
//! issuer, audience, and lifetime. Signing configuration is validated once
//! at startup; a missing or short secret fails the process, never a
//! per-request call.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ClaimSet, Error, Student};

/// Minimum accepted HMAC secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Default token lifetime.
const DEFAULT_TTL_HOURS: i64 = 24;

/// Validated JWT signing configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    issuer: String,
    audience: String,
    secret: String,
    ttl: Duration,
}

/// Configuration problems detected at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JwtConfigError {
    /// Issuer is missing or blank.
    #[error("jwt issuer is required")]
    MissingIssuer,
    /// Audience is missing or blank.
    #[error("jwt audience is required")]
    MissingAudience,
    /// Secret is missing or shorter than [`MIN_SECRET_LEN`] bytes.
    #[error("jwt secret must be at least {MIN_SECRET_LEN} bytes")]
    WeakSecret,
}

impl JwtConfig {
    /// Validate signing settings, with the default 24h lifetime.
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self, JwtConfigError> {
        let issuer = issuer.into();
        let audience = audience.into();
        let secret = secret.into();
        if issuer.trim().is_empty() {
            return Err(JwtConfigError::MissingIssuer);
        }
        if audience.trim().is_empty() {
            return Err(JwtConfigError::MissingAudience);
        }
        if secret.len() < MIN_SECRET_LEN {
            return Err(JwtConfigError::WeakSecret);
        }
        Ok(Self {
            issuer,
            audience,
            secret,
            ttl: Duration::hours(DEFAULT_TTL_HOURS),
        })
    }

    /// Override the token lifetime.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Claims written into locally issued tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IssuedClaims {
    sub: String,
    email: String,
    name: String,
    given_name: String,
    family_name: String,
    role: String,
    iss: String,
    aud: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies HS256 bearer tokens.
///
/// Verification decodes into a [`ClaimSet`] rather than a fixed claims
/// struct so externally issued tokens with sparse claims still pass
/// authentication and can be provisioned.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl TokenIssuer {
    /// Build an issuer from validated configuration.
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer,
            audience: config.audience,
            ttl: config.ttl,
        }
    }

    /// Mint a signed token for a student.
    pub fn issue(&self, student: &Student) -> Result<String, Error> {
        let now = Utc::now();
        let claims = IssuedClaims {
            sub: student.id.to_string(),
            email: student.email.clone(),
            name: student.full_name(),
            given_name: student.first_name.clone(),
            family_name: student.last_name.clone(),
            role: student.role.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| Error::internal(format!("token signing failed: {err}")))
    }

    /// Verify a presented token (signature, expiry, issuer, audience) and
    /// expose its payload as a claim set.
    pub fn verify(&self, token: &str) -> Result<ClaimSet, Error> {
        decode::<Value>(token, &self.decoding, &self.validation)
            .map(|data| ClaimSet::from_json(&data.claims))
            .map_err(|_| Error::unauthorized("invalid or expired token"))
    }
}
