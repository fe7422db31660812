//! Environment-driven application configuration.
//!
//! Everything that can be misconfigured fails at startup: the bind address
//! must parse and the JWT settings must pass [`JwtConfig`] validation
//! before any socket is bound.

use std::net::SocketAddr;

use crate::domain::{JwtConfig, JwtConfigError};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DATABASE_URL: &str = "sqlite:enrollment.db";

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Socket the HTTP server binds to (`BIND_ADDR`).
    pub bind_addr: SocketAddr,
    /// sqlx SQLite URL (`DATABASE_URL`).
    pub database_url: String,
    /// Token signing settings (`JWT_ISSUER`, `JWT_AUDIENCE`, `JWT_SECRET`).
    pub jwt: JwtConfig,
}

/// Configuration problems detected at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is absent.
    #[error("missing required environment variable {name}")]
    MissingVar {
        /// The variable's name.
        name: &'static str,
    },
    /// `BIND_ADDR` did not parse as a socket address.
    #[error("invalid bind address: {value}")]
    InvalidBindAddr {
        /// The rejected value.
        value: String,
    },
    /// JWT settings failed validation.
    #[error(transparent)]
    Jwt(#[from] JwtConfigError),
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let bind_addr = bind_raw
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr { value: bind_raw })?;

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned());

        let require = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::MissingVar { name })
        };
        let jwt = JwtConfig::new(
            require("JWT_ISSUER")?,
            require("JWT_AUDIENCE")?,
            require("JWT_SECRET")?,
        )?;

        Ok(Self {
            bind_addr,
            database_url,
            jwt,
        })
    }
}
