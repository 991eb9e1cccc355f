//! Access and refresh token issuance for devlink.
//!
//! Two independent HMAC-SHA256 signing keys: one for short-lived access
//! tokens, one for long-lived refresh tokens. [`TokenIssuer::new`]
//! refuses equal or missing secrets, since a shared key would let a
//! refresh token pass as an access token.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::error::{AuthError, TokenErrorReason};
use crate::config::AuthConfig;
use crate::db::{Role, UserRepository};
use crate::Result;

/// Audience claim carried by refresh tokens.
pub const REFRESH_AUDIENCE: &str = "refresh";

/// Claims embedded in access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID).
    pub sub: i64,
    /// User role.
    pub role: String,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiration (unix seconds).
    pub exp: i64,
}

/// Claims embedded in refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject (user ID).
    pub sub: i64,
    /// Token version at issuance time.
    pub token_version: i64,
    /// Issuer.
    pub iss: String,
    /// Audience (always [`REFRESH_AUDIENCE`]).
    pub aud: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiration (unix seconds).
    pub exp: i64,
}

/// Issues and verifies access and refresh tokens.
pub struct TokenIssuer {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_expiry_secs: i64,
    refresh_expiry_days: i64,
    issuer: String,
    audience: String,
}

impl TokenIssuer {
    /// Create a token issuer from the auth configuration.
    ///
    /// Fails fast if either secret is unset or the two secrets are equal.
    pub fn new(config: &AuthConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            access_encoding: EncodingKey::from_secret(config.access_token_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_token_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            access_expiry_secs: config.access_token_expiry_secs,
            refresh_expiry_days: config.refresh_token_expiry_days,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        })
    }

    /// Access token lifetime in seconds.
    pub fn access_expiry_secs(&self) -> i64 {
        self.access_expiry_secs
    }

    /// Refresh token lifetime in days.
    pub fn refresh_expiry_days(&self) -> i64 {
        self.refresh_expiry_days
    }

    /// Issue a stateless access token for the given user.
    pub fn issue_access(&self, user_id: i64, role: Role) -> std::result::Result<String, AuthError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user_id,
            role: role.as_str().to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_expiry_secs)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.access_encoding)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Sign a refresh token embedding the given version.
    ///
    /// Pure signing half of refresh issuance; callers almost always
    /// want [`TokenIssuer::issue_refresh`] instead.
    pub fn sign_refresh(
        &self,
        user_id: i64,
        token_version: i64,
    ) -> std::result::Result<String, AuthError> {
        let now = Utc::now();
        let claims = RefreshClaims {
            sub: user_id,
            token_version,
            iss: self.issuer.clone(),
            aud: REFRESH_AUDIENCE.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(self.refresh_expiry_days)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.refresh_encoding)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Issue a refresh token for the given user.
    ///
    /// Stateful, and the order matters: the stored `token_version` is
    /// bumped first (one atomic UPDATE), the new version is embedded in
    /// the token, and the raw token string is persisted on the user
    /// record. A concurrent re-issuance is therefore always detectable
    /// as a version mismatch.
    pub async fn issue_refresh(
        &self,
        repo: &UserRepository<'_>,
        user_id: i64,
    ) -> std::result::Result<String, AuthError> {
        let version = repo.bump_token_version(user_id).await?;
        let token = self.sign_refresh(user_id, version)?;
        repo.set_refresh_token(user_id, &token).await?;
        Ok(token)
    }

    /// Verify an access token and return its claims.
    pub fn verify_access(&self, token: &str) -> std::result::Result<AccessClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        decode::<AccessClaims>(token, &self.access_decoding, &validation)
            .map(|data| data.claims)
            .map_err(map_decode_error)
    }

    /// Verify a refresh token and return its claims.
    ///
    /// Checks signature, expiry, issuer, and the refresh audience. The
    /// stored-token and version checks are the session controller's job.
    pub fn verify_refresh(&self, token: &str) -> std::result::Result<RefreshClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[REFRESH_AUDIENCE]);

        decode::<RefreshClaims>(token, &self.refresh_decoding, &validation)
            .map(|data| data.claims)
            .map_err(map_decode_error)
    }
}

/// Classify a jsonwebtoken error: expiry is its own outcome, everything
/// else (bad signature, wrong audience, garbage input) is malformed.
fn map_decode_error(e: jsonwebtoken::errors::Error) -> AuthError {
    match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::TokenVerification(TokenErrorReason::Malformed),
    }
}
