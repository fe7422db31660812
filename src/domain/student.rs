//! Student aggregate and roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role granted to a student account.
///
/// Serialised as `"Student"` / `"Admin"`, matching the values carried in
/// token role claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Regular student: may enroll and deregister.
    Student,
    /// Administrator: may manage courses and view rosters.
    Admin,
}

impl Role {
    /// Stable string form used in storage and token claims.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Admin => "Admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Student" => Ok(Self::Student),
            "Admin" => Ok(Self::Admin),
            other => Err(RoleParseError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Raised when a stored role string is neither `Student` nor `Admin`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {value}")]
pub struct RoleParseError {
    /// The rejected value.
    pub value: String,
}

/// A registered (or externally provisioned) student account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    /// Server-assigned identifier.
    pub id: Uuid,
    /// Unique email address (case-sensitive).
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Argon2 PHC string; empty for externally-provisioned accounts,
    /// which therefore cannot log in with a password.
    pub password_hash: String,
    /// Granted role.
    pub role: Role,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Student {
    /// Full display name, `"First Last"`.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
