//! Session lifecycle orchestration for devlink.
//!
//! [`SessionService`] drives the three session operations: login
//! (lock check, password verification, token issuance), refresh
//! (signature, stored-token and version validation), and logout
//! (server-side invalidation). It owns no mutable state; every call
//! takes the store handle explicitly.

use tracing::{info, warn};

use super::error::{AuthError, TokenErrorReason};
use super::lockout::LockoutTracker;
use super::password::verify_password;
use super::token::TokenIssuer;
use crate::config::AuthConfig;
use crate::db::{User, UserRepository};
use crate::{DevlinkError, Result};

/// Result of a successful login.
#[derive(Debug)]
pub struct LoginOutcome {
    /// The authenticated user (public projection).
    pub user: User,
    /// Newly issued access token.
    pub access_token: String,
    /// Newly issued refresh token.
    pub refresh_token: String,
}

/// Orchestrates login, refresh, and logout.
pub struct SessionService {
    issuer: TokenIssuer,
    lockout: LockoutTracker,
}

impl SessionService {
    /// Build the session service from the auth configuration.
    ///
    /// Fails fast on invalid token secrets.
    pub fn new(config: &AuthConfig) -> Result<Self> {
        Ok(Self {
            issuer: TokenIssuer::new(config)?,
            lockout: LockoutTracker::new(config.max_login_attempts, config.lockout_minutes),
        })
    }

    /// Access the token issuer (for access-token verification at the
    /// request boundary and for expiry metadata).
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Attempt a login with email and password.
    ///
    /// Lock state is checked before the password is ever verified, and
    /// a locked account does not advance the attempt counter. Unknown
    /// email and wrong password produce the same generic error.
    pub async fn login(
        &self,
        repo: &UserRepository<'_>,
        email: &str,
        password: &str,
    ) -> std::result::Result<LoginOutcome, AuthError> {
        let Some(credential) = repo.get_credential_by_email(email).await? else {
            info!("login attempt for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if let Some(until) = self.lockout.currently_locked_until(&credential) {
            warn!(user_id = credential.id, lock_until = %until, "login attempt on locked account");
            return Err(AuthError::AccountLocked { until });
        }

        if !verify_password(password, &credential.password) {
            self.lockout.record_failure(repo, credential.id).await?;
            return Err(AuthError::InvalidCredentials);
        }

        self.lockout.record_success(repo, credential.id).await?;

        let access_token = self.issuer.issue_access(credential.id, credential.role)?;
        let refresh_token = self.issuer.issue_refresh(repo, credential.id).await?;

        let user = repo
            .get_by_id(credential.id)
            .await?
            .ok_or_else(|| DevlinkError::NotFound("user".to_string()))?;

        info!(user_id = user.id, "login succeeded");

        Ok(LoginOutcome {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Validate a presented refresh token and issue a new access token.
    ///
    /// The refresh token itself is not rotated here; rotation happens
    /// at login. Validation order: presence, structure, signature and
    /// expiry, stored-token equality, version equality.
    pub async fn refresh(
        &self,
        repo: &UserRepository<'_>,
        presented: Option<&str>,
    ) -> std::result::Result<String, AuthError> {
        let token = match presented {
            Some(t) if !t.is_empty() => t,
            _ => return Err(AuthError::TokenVerification(TokenErrorReason::Missing)),
        };

        if token.split('.').count() != 3 {
            warn!("refresh rejected: not a three-segment signed token");
            return Err(AuthError::TokenVerification(TokenErrorReason::Malformed));
        }

        let claims = match self.issuer.verify_refresh(token) {
            Ok(claims) => claims,
            Err(AuthError::TokenExpired) => {
                info!("refresh rejected: token expired");
                return Err(AuthError::TokenExpired);
            }
            Err(e) => {
                warn!("refresh rejected: invalid token signature or structure");
                return Err(e);
            }
        };

        let Some(credential) = repo.get_credential_by_id(claims.sub).await? else {
            warn!(user_id = claims.sub, "refresh rejected: unknown subject");
            return Err(AuthError::TokenVerification(TokenErrorReason::Mismatch));
        };

        // A newer token issued since this one invalidates it.
        if credential.refresh_token.as_deref() != Some(token) {
            warn!(user_id = credential.id, "refresh rejected: token mismatch");
            return Err(AuthError::TokenVerification(TokenErrorReason::Mismatch));
        }

        // Redundant with the equality check above under normal
        // operation; sole defense if the stored-token comparison is
        // ever bypassed by a stale cache.
        if claims.token_version != credential.token_version {
            warn!(
                user_id = credential.id,
                embedded = claims.token_version,
                current = credential.token_version,
                "refresh rejected: version mismatch"
            );
            return Err(AuthError::TokenVerification(
                TokenErrorReason::VersionMismatch,
            ));
        }

        let access_token = self.issuer.issue_access(credential.id, credential.role)?;
        info!(user_id = credential.id, "refresh succeeded");

        Ok(access_token)
    }

    /// Log out: clear the stored refresh token.
    ///
    /// The server-side equality check during refresh is what makes this
    /// effective; the cookie clearing at the HTTP layer is best-effort.
    pub async fn logout(
        &self,
        repo: &UserRepository<'_>,
        user_id: i64,
    ) -> std::result::Result<(), AuthError> {
        repo.clear_refresh_token(user_id).await?;
        info!(user_id, "logout: refresh token invalidated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::db::{Database, NewUser};

    async fn setup() -> (Database, SessionService) {
        let db = Database::connect_in_memory().await.unwrap();
        let config = AuthConfig {
            access_token_secret: "access-secret-for-tests".to_string(),
            refresh_token_secret: "refresh-secret-for-tests".to_string(),
            ..AuthConfig::default()
        };
        let service = SessionService::new(&config).unwrap();
        (db, service)
    }

    async fn register(db: &Database, email: &str, password: &str) -> i64 {
        let repo = UserRepository::new(db.pool());
        let hash = hash_password(password).unwrap();
        repo.create(&NewUser::new(email, hash, "Test User"))
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_login_success_returns_tokens() {
        let (db, service) = setup().await;
        register(&db, "dev@example.com", "hunter2hunter2").await;
        let repo = UserRepository::new(db.pool());

        let outcome = service
            .login(&repo, "dev@example.com", "hunter2hunter2")
            .await
            .unwrap();
        assert_eq!(outcome.user.email, "dev@example.com");
        assert!(!outcome.access_token.is_empty());
        assert_eq!(outcome.refresh_token.split('.').count(), 3);
    }

    #[tokio::test]
    async fn test_unknown_email_and_wrong_password_look_alike() {
        let (db, service) = setup().await;
        register(&db, "dev@example.com", "hunter2hunter2").await;
        let repo = UserRepository::new(db.pool());

        let unknown = service
            .login(&repo, "nobody@example.com", "hunter2hunter2")
            .await
            .unwrap_err();
        let wrong = service
            .login(&repo, "dev@example.com", "wrong password")
            .await
            .unwrap_err();

        assert_eq!(unknown.to_string(), wrong.to_string());
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_refresh_with_missing_token() {
        let (db, service) = setup().await;
        let repo = UserRepository::new(db.pool());

        let err = service.refresh(&repo, None).await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::TokenVerification(TokenErrorReason::Missing)
        ));

        let err = service.refresh(&repo, Some("")).await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::TokenVerification(TokenErrorReason::Missing)
        ));
    }

    #[tokio::test]
    async fn test_refresh_with_two_segment_token() {
        let (db, service) = setup().await;
        let repo = UserRepository::new(db.pool());

        let err = service.refresh(&repo, Some("abc.def")).await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::TokenVerification(TokenErrorReason::Malformed)
        ));
    }

    #[tokio::test]
    async fn test_refresh_does_not_rotate() {
        let (db, service) = setup().await;
        let user_id = register(&db, "dev@example.com", "hunter2hunter2").await;
        let repo = UserRepository::new(db.pool());

        let outcome = service
            .login(&repo, "dev@example.com", "hunter2hunter2")
            .await
            .unwrap();

        let access = service
            .refresh(&repo, Some(&outcome.refresh_token))
            .await
            .unwrap();
        assert!(!access.is_empty());

        // Stored token unchanged: the same refresh token keeps working.
        let cred = repo.get_credential_by_id(user_id).await.unwrap().unwrap();
        assert_eq!(cred.refresh_token.as_deref(), Some(outcome.refresh_token.as_str()));
        assert!(service
            .refresh(&repo, Some(&outcome.refresh_token))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_logout_invalidates_refresh() {
        let (db, service) = setup().await;
        let user_id = register(&db, "dev@example.com", "hunter2hunter2").await;
        let repo = UserRepository::new(db.pool());

        let outcome = service
            .login(&repo, "dev@example.com", "hunter2hunter2")
            .await
            .unwrap();
        service.logout(&repo, user_id).await.unwrap();

        let err = service
            .refresh(&repo, Some(&outcome.refresh_token))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::TokenVerification(TokenErrorReason::Mismatch)
        ));
    }
}
