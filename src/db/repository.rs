//! User repository for devlink.
//!
//! Provides the default-projection lookups used by the API surface and
//! the credential operations the session core depends on. The
//! `token_version` bump is a single UPDATE so concurrent logins can
//! never observe the same version twice.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::user::{NewUser, User, UserCredential};
use crate::{DevlinkError, Result};

/// Columns of the default (public) user projection.
const USER_COLUMNS: &str = "id, email, name, role, created_at, last_login";

/// Columns of the credential projection.
const CREDENTIAL_COLUMNS: &str =
    "id, email, password, role, refresh_token, token_version, login_attempts, is_locked, lock_until";

/// Repository for user records.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user in the database.
    ///
    /// Returns the created user with the assigned ID. The credential
    /// fields start fresh: version 0, zero attempts, unlocked.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let result = sqlx::query("INSERT INTO users (email, password, name, role) VALUES (?, ?, ?, ?)")
            .bind(&new_user.email)
            .bind(&new_user.password)
            .bind(&new_user.name)
            .bind(new_user.role.as_str())
            .execute(self.pool)
            .await
            .map_err(|e| DevlinkError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DevlinkError::NotFound("user".to_string()))
    }

    /// Get a user by ID (public projection).
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let result = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| DevlinkError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Get a user by email, case-insensitively (public projection).
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let result = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ? COLLATE NOCASE"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| DevlinkError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Get the credential projection of a user by ID.
    pub async fn get_credential_by_id(&self, id: i64) -> Result<Option<UserCredential>> {
        let result = sqlx::query_as::<_, UserCredential>(&format!(
            "SELECT {CREDENTIAL_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| DevlinkError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Get the credential projection of a user by email (case-insensitive).
    pub async fn get_credential_by_email(&self, email: &str) -> Result<Option<UserCredential>> {
        let result = sqlx::query_as::<_, UserCredential>(&format!(
            "SELECT {CREDENTIAL_COLUMNS} FROM users WHERE email = ? COLLATE NOCASE"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| DevlinkError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Atomically increment a user's token version.
    ///
    /// Read-modify-write happens inside the database, so two concurrent
    /// logins for the same account always see distinct versions.
    /// Returns the new version.
    pub async fn bump_token_version(&self, id: i64) -> Result<i64> {
        let version: i64 = sqlx::query_scalar(
            "UPDATE users SET token_version = token_version + 1 WHERE id = ? RETURNING token_version",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| DevlinkError::Database(e.to_string()))?
        .ok_or_else(|| DevlinkError::NotFound("user".to_string()))?;

        Ok(version)
    }

    /// Persist the raw refresh token string on the user record.
    pub async fn set_refresh_token(&self, id: i64, token: &str) -> Result<()> {
        sqlx::query("UPDATE users SET refresh_token = ? WHERE id = ?")
            .bind(token)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| DevlinkError::Database(e.to_string()))?;
        Ok(())
    }

    /// Clear the stored refresh token (logout).
    pub async fn clear_refresh_token(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE users SET refresh_token = NULL WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| DevlinkError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment the failed-login counter, returning the new count.
    pub async fn increment_login_attempts(&self, id: i64) -> Result<i64> {
        let attempts: i64 = sqlx::query_scalar(
            "UPDATE users SET login_attempts = login_attempts + 1 WHERE id = ? RETURNING login_attempts",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| DevlinkError::Database(e.to_string()))?
        .ok_or_else(|| DevlinkError::NotFound("user".to_string()))?;

        Ok(attempts)
    }

    /// Lock the account until the given time.
    pub async fn lock_account(&self, id: i64, until: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE users SET is_locked = 1, lock_until = ? WHERE id = ?")
            .bind(until)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| DevlinkError::Database(e.to_string()))?;
        Ok(())
    }

    /// Record a successful login: reset the attempt counter, clear the
    /// lock, and stamp the last-login time.
    pub async fn record_login_success(&self, id: i64, now: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            "UPDATE users SET login_attempts = 0, is_locked = 0, lock_until = NULL, last_login = ?
             WHERE id = ?",
        )
        .bind(now)
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| DevlinkError::Database(e.to_string()))?;
        Ok(())
    }

    /// Overwrite the lock expiry directly.
    ///
    /// Test hook for simulating an elapsed lock window without waiting.
    pub async fn set_lock_until(&self, id: i64, until: Option<DateTime<Utc>>) -> Result<()> {
        sqlx::query("UPDATE users SET lock_until = ? WHERE id = ?")
            .bind(until)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| DevlinkError::Database(e.to_string()))?;
        Ok(())
    }
}
