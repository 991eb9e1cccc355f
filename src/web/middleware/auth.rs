//! Access-token authentication extractor.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;

use crate::auth::{AccessClaims, SessionService};
use crate::web::error::ApiError;

/// Extractor for authenticated users.
///
/// Reads the `Authorization: Bearer` header, verifies the access token
/// against the access-token key, and hands the handler the claims. The
/// session service is injected into request extensions by the router.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AccessClaims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let token = parts
                .headers
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|header| header.strip_prefix("Bearer "))
                .ok_or_else(|| ApiError::unauthorized("Missing authorization"))?;

            let session = parts
                .extensions
                .get::<Arc<SessionService>>()
                .ok_or_else(|| ApiError::internal("Session service not configured"))?;

            let claims = session.issuer().verify_access(token).map_err(|e| {
                tracing::debug!("access token rejected: {}", e);
                ApiError::from(e)
            })?;

            Ok(AuthUser(claims))
        })
    }
}
