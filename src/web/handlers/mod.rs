//! HTTP handlers for the devlink API.

pub mod auth;

pub use auth::{login, logout, me, refresh, register, AppState, REFRESH_COOKIE, REFRESH_COOKIE_PATH};
