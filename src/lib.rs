//! devlink - REST backend for a developer community.
//!
//! This crate implements the authentication and session-lifecycle core:
//! JWT access tokens, a single rotating refresh token per user carried
//! in a path-scoped cookie, server-side invalidation via a version
//! counter, and brute-force lockout.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod web;

pub use auth::{
    hash_password, validate_password, verify_password, AuthError, LockoutTracker, LoginOutcome,
    PasswordError, SessionService, TokenErrorReason, TokenIssuer, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH,
};
pub use config::Config;
pub use db::{Database, NewUser, Role, User, UserCredential, UserRepository};
pub use error::{DevlinkError, Result};
