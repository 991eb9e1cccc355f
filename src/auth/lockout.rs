//! Brute-force lockout tracking for devlink.
//!
//! Failed-attempt counts and the lock window live on the user record,
//! so the lock survives restarts and is shared across instances.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::db::{UserCredential, UserRepository};
use crate::Result;

/// Tracks failed logins and enforces a temporary lock window.
#[derive(Debug, Clone, Copy)]
pub struct LockoutTracker {
    max_attempts: i64,
    lockout_minutes: i64,
}

impl LockoutTracker {
    /// Create a tracker with the given threshold and window.
    pub fn new(max_attempts: i64, lockout_minutes: i64) -> Self {
        Self {
            max_attempts,
            lockout_minutes,
        }
    }

    /// Return the lock expiry if the account is currently locked.
    ///
    /// Locked means the flag is set AND `lock_until` is strictly in the
    /// future; a past `lock_until` counts as unlocked even while the
    /// flag is still physically set.
    pub fn currently_locked_until(&self, credential: &UserCredential) -> Option<DateTime<Utc>> {
        if !credential.is_locked {
            return None;
        }
        match credential.lock_until {
            Some(until) if until > Utc::now() => Some(until),
            _ => None,
        }
    }

    /// Record a failed login attempt.
    ///
    /// Increments the persistent counter and locks the account once the
    /// threshold is reached.
    pub async fn record_failure(&self, repo: &UserRepository<'_>, user_id: i64) -> Result<()> {
        let attempts = repo.increment_login_attempts(user_id).await?;

        if attempts >= self.max_attempts {
            let until = Utc::now() + Duration::minutes(self.lockout_minutes);
            repo.lock_account(user_id, until).await?;
            warn!(
                user_id,
                attempts,
                lock_until = %until,
                "account locked after repeated failed logins"
            );
        } else {
            info!(user_id, attempts, "failed login attempt recorded");
        }

        Ok(())
    }

    /// Record a successful login: reset the counter, clear the lock,
    /// stamp the last-login time.
    pub async fn record_success(&self, repo: &UserRepository<'_>, user_id: i64) -> Result<()> {
        repo.record_login_success(user_id, Utc::now()).await
    }
}
