//! Error taxonomy for the authentication core.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::DevlinkError;

/// Reason codes for refresh-token verification failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenErrorReason {
    /// No token was presented.
    Missing,
    /// The token is not a structurally valid signed token, or its
    /// signature does not verify.
    Malformed,
    /// The token does not match the currently stored refresh token.
    Mismatch,
    /// The embedded version differs from the user's current token version.
    VersionMismatch,
}

impl TokenErrorReason {
    /// Stable string form used in logs and API error codes.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenErrorReason::Missing => "missing",
            TokenErrorReason::Malformed => "malformed",
            TokenErrorReason::Mismatch => "mismatch",
            TokenErrorReason::VersionMismatch => "version-mismatch",
        }
    }
}

/// Authentication and session-lifecycle errors.
///
/// Every failure path in the core surfaces one of these variants; the
/// web boundary matches exhaustively to produce the HTTP response.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Wrong email or password. Deliberately generic: the same variant
    /// covers unknown email and wrong password so responses cannot be
    /// used for account enumeration.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Account is locked after repeated failed logins.
    #[error("account locked until {until}")]
    AccountLocked {
        /// When the lock expires.
        until: DateTime<Utc>,
    },

    /// Refresh token failed verification.
    #[error("invalid refresh token: {0}")]
    TokenVerification(TokenErrorReason),

    /// Token signature is valid but the token has expired.
    #[error("token expired")]
    TokenExpired,

    /// Token signing failed (configuration or signing error). Fatal to
    /// the request, never retried.
    #[error("token generation failed: {0}")]
    TokenGeneration(String),

    /// Backing store failure.
    #[error(transparent)]
    Store(#[from] DevlinkError),
}

impl std::fmt::Display for TokenErrorReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_strings() {
        assert_eq!(TokenErrorReason::Missing.as_str(), "missing");
        assert_eq!(TokenErrorReason::VersionMismatch.as_str(), "version-mismatch");
    }

    #[test]
    fn test_error_display_is_generic_for_credentials() {
        let err = AuthError::InvalidCredentials;
        assert_eq!(err.to_string(), "invalid credentials");
    }

    #[test]
    fn test_locked_display_includes_time() {
        let until = Utc::now();
        let err = AuthError::AccountLocked { until };
        assert!(err.to_string().contains("account locked"));
    }
}
