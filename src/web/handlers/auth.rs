//! Authentication handlers.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;
use validator::Validate;

use crate::auth::{hash_password, validate_password, SessionService};
use crate::config::AuthConfig;
use crate::db::{Database, NewUser, UserRepository};
use crate::web::dto::{
    ApiResponse, LoginRequest, LoginResponse, MeResponse, RefreshResponse, RegisterRequest,
    UserInfo,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;
use crate::{DevlinkError, Result};

/// Name of the refresh-token cookie.
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Cookie path: the refresh endpoint only, so the browser never sends
/// the refresh token anywhere else.
pub const REFRESH_COOKIE_PATH: &str = "/api/auth/refresh";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle.
    pub db: Database,
    /// Session lifecycle service.
    pub session: Arc<SessionService>,
    /// Whether refresh cookies are marked Secure (and SameSite=Strict).
    pub cookie_secure: bool,
}

impl AppState {
    /// Create application state from the database and auth config.
    ///
    /// Fails fast on invalid token secrets.
    pub fn new(db: Database, config: &AuthConfig) -> Result<Self> {
        Ok(Self {
            db,
            session: Arc::new(SessionService::new(config)?),
            cookie_secure: config.cookie_secure,
        })
    }

    /// Build the scoped refresh cookie for a newly issued token.
    fn refresh_cookie(&self, token: String) -> Cookie<'static> {
        let mut cookie = Cookie::new(REFRESH_COOKIE, token);
        cookie.set_path(REFRESH_COOKIE_PATH);
        cookie.set_http_only(true);
        cookie.set_secure(self.cookie_secure);
        cookie.set_same_site(if self.cookie_secure {
            SameSite::Strict
        } else {
            SameSite::Lax
        });
        cookie.set_max_age(time::Duration::days(
            self.session.issuer().refresh_expiry_days(),
        ));
        cookie
    }

    /// Build an already-expired refresh cookie.
    ///
    /// Overwrites the client's copy on logout; the server-side token
    /// clearing is what actually ends the session.
    fn expired_refresh_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::new(REFRESH_COOKIE, "");
        cookie.set_path(REFRESH_COOKIE_PATH);
        cookie.set_http_only(true);
        cookie.set_secure(self.cookie_secure);
        cookie.set_max_age(time::Duration::ZERO);
        cookie.set_expires(time::OffsetDateTime::UNIX_EPOCH);
        cookie
    }
}

/// POST /api/auth/register - Create a new account and log it in.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> std::result::Result<(CookieJar, Json<ApiResponse<LoginResponse>>), ApiError> {
    req.validate()
        .map_err(|e| ApiError::unprocessable(e.to_string()))?;
    validate_password(&req.password).map_err(|e| ApiError::unprocessable(e.to_string()))?;

    let password_hash =
        hash_password(&req.password).map_err(|_| ApiError::internal("Failed to hash password"))?;

    let repo = UserRepository::new(state.db.pool());
    let user = repo
        .create(&NewUser::new(&req.email, password_hash, &req.name))
        .await
        .map_err(|e| match e {
            DevlinkError::UniqueViolation(_) => ApiError::conflict("Email already registered"),
            other => {
                tracing::error!("user creation failed: {}", other);
                ApiError::internal("Failed to create user")
            }
        })?;

    let access_token = state.session.issuer().issue_access(user.id, user.role)?;
    let refresh_token = state.session.issuer().issue_refresh(&repo, user.id).await?;

    let response = LoginResponse {
        access_token,
        expires_in: state.session.issuer().access_expiry_secs(),
        user: UserInfo::from(user),
    };

    let jar = jar.add(state.refresh_cookie(refresh_token));
    Ok((jar, Json(ApiResponse::new(response))))
}

/// POST /api/auth/login - Authenticate with email and password.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> std::result::Result<(CookieJar, Json<ApiResponse<LoginResponse>>), ApiError> {
    req.validate()
        .map_err(|_| ApiError::unauthorized("Invalid email or password"))?;

    let repo = UserRepository::new(state.db.pool());
    let outcome = state.session.login(&repo, &req.email, &req.password).await?;

    let response = LoginResponse {
        access_token: outcome.access_token,
        expires_in: state.session.issuer().access_expiry_secs(),
        user: UserInfo::from(outcome.user),
    };

    let jar = jar.add(state.refresh_cookie(outcome.refresh_token));
    Ok((jar, Json(ApiResponse::new(response))))
}

/// POST /api/auth/refresh - Exchange the refresh cookie for a new
/// access token.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> std::result::Result<Json<ApiResponse<RefreshResponse>>, ApiError> {
    let token = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string());

    let repo = UserRepository::new(state.db.pool());
    let access_token = state.session.refresh(&repo, token.as_deref()).await?;

    let response = RefreshResponse {
        access_token,
        expires_in: state.session.issuer().access_expiry_secs(),
    };

    Ok(Json(ApiResponse::new(response)))
}

/// POST /api/auth/logout - Invalidate the current refresh token.
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    jar: CookieJar,
) -> std::result::Result<(CookieJar, Json<ApiResponse<()>>), ApiError> {
    let repo = UserRepository::new(state.db.pool());
    state.session.logout(&repo, claims.sub).await?;

    let jar = jar.add(state.expired_refresh_cookie());
    Ok((jar, Json(ApiResponse::new(()))))
}

/// GET /api/auth/me - Current user info.
pub async fn me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> std::result::Result<Json<ApiResponse<MeResponse>>, ApiError> {
    let repo = UserRepository::new(state.db.pool());
    let user = repo
        .get_by_id(claims.sub)
        .await
        .map_err(|_| ApiError::internal("Database error"))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let response = MeResponse {
        id: user.id,
        email: user.email,
        name: user.name,
        role: user.role.as_str().to_string(),
        created_at: user.created_at,
        last_login: user.last_login.map(|t| t.to_rfc3339()),
    };

    Ok(Json(ApiResponse::new(response)))
}
