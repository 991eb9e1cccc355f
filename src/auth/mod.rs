//! Authentication core for devlink.
//!
//! Credential verification, brute-force lockout, token issuance, and
//! session lifecycle orchestration.

mod error;
mod lockout;
mod password;
mod session;
mod token;

pub use error::{AuthError, TokenErrorReason};
pub use lockout::LockoutTracker;
pub use password::{
    hash_password, validate_password, verify_password, PasswordError, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH,
};
pub use session::{LoginOutcome, SessionService};
pub use token::{AccessClaims, RefreshClaims, TokenIssuer, REFRESH_AUDIENCE};
