//! User model for devlink.
//!
//! Defines the public [`User`] projection, the [`UserCredential`]
//! projection used only by the authentication core, and the [`Role`] enum.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

/// User role for permission management.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    /// Regular member.
    #[default]
    Member,
    /// Moderator.
    Moderator,
    /// Administrator.
    Admin,
}

impl Role {
    /// Convert role to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "member" => Ok(Role::Member),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

/// Decode a role column, mapping parse failures to a column decode error.
fn role_column(row: &SqliteRow) -> Result<Role, sqlx::Error> {
    let raw: String = row.try_get("role")?;
    raw.parse().map_err(|e: String| sqlx::Error::ColumnDecode {
        index: "role".to_string(),
        source: e.into(),
    })
}

/// Public user projection.
///
/// Excludes the password hash and all refresh-token / lockout columns;
/// those are only available through [`UserCredential`].
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Email address (unique, case-insensitive).
    pub email: String,
    /// Display name.
    pub name: String,
    /// User role for permissions.
    pub role: Role,
    /// Account creation timestamp.
    pub created_at: String,
    /// Last successful login timestamp.
    pub last_login: Option<DateTime<Utc>>,
}

impl<'r> FromRow<'r, SqliteRow> for User {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            name: row.try_get("name")?,
            role: role_column(row)?,
            created_at: row.try_get("created_at")?,
            last_login: row.try_get("last_login")?,
        })
    }
}

/// Credential projection of a user record.
///
/// Carries everything the session core needs: the stored password hash,
/// the currently valid refresh token, the token version counter, and
/// the lockout state. Never serialized outward.
#[derive(Debug, Clone)]
pub struct UserCredential {
    /// Unique user ID.
    pub id: i64,
    /// Email address.
    pub email: String,
    /// Password hash (Argon2 PHC string).
    pub password: String,
    /// User role.
    pub role: Role,
    /// Last-issued refresh token, if one is active.
    pub refresh_token: Option<String>,
    /// Monotonically increasing refresh-token version.
    pub token_version: i64,
    /// Consecutive failed login attempts.
    pub login_attempts: i64,
    /// Whether the account is locked.
    pub is_locked: bool,
    /// When the lock expires.
    pub lock_until: Option<DateTime<Utc>>,
}

impl<'r> FromRow<'r, SqliteRow> for UserCredential {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password: row.try_get("password")?,
            role: role_column(row)?,
            refresh_token: row.try_get("refresh_token")?,
            token_version: row.try_get("token_version")?,
            login_attempts: row.try_get("login_attempts")?,
            is_locked: row.try_get("is_locked")?,
            lock_until: row.try_get("lock_until")?,
        })
    }
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Email address.
    pub email: String,
    /// Password hash (must be pre-hashed with Argon2).
    pub password: String,
    /// Display name.
    pub name: String,
    /// User role (defaults to Member).
    pub role: Role,
}

impl NewUser {
    /// Create a new user with minimal required fields.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            name: name.into(),
            role: Role::Member,
        }
    }

    /// Set the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}
