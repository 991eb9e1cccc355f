//! Database schema and migrations for devlink.
//!
//! This module contains all database migrations that will be applied
//! sequentially when the database is first opened or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Initial schema - users table with credential fields
    r#"
-- Users table. The auth columns (password, refresh_token, token_version,
-- login_attempts, is_locked, lock_until) are only selected by the
-- credential projection, never by default queries.
CREATE TABLE users (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    email           TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password        TEXT NOT NULL,           -- Argon2 hash
    name            TEXT NOT NULL,
    role            TEXT NOT NULL DEFAULT 'member',  -- 'member', 'moderator', 'admin'
    refresh_token   TEXT,                    -- currently valid refresh token, if any
    token_version   INTEGER NOT NULL DEFAULT 0,
    login_attempts  INTEGER NOT NULL DEFAULT 0,
    is_locked       INTEGER NOT NULL DEFAULT 0,
    lock_until      TEXT,
    created_at      TEXT NOT NULL DEFAULT (datetime('now')),
    last_login      TEXT
);

CREATE INDEX idx_users_email ON users(email);
"#,
];
