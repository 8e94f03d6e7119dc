use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::auth::cookies::{read_cookie, ACCESS_COOKIE};
use crate::auth::tokens::TokenService;
use crate::error::AppError;

/// Authenticated user id, taken from the `accessToken` cookie or a Bearer header.
#[derive(Debug)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenService: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")))
            .map(|t| t.trim().to_string());

        let cookie = read_cookie(&parts.headers, ACCESS_COOKIE);
        if cookie.is_none() && bearer.is_none() {
            return Err(AppError::Unauthorized("Unauthorized request".into()));
        }

        // A stale cookie must not shadow a valid Bearer token.
        let tokens = TokenService::from_ref(state);
        let mut last_err = None;
        for token in cookie.iter().chain(bearer.iter()) {
            match tokens.verify_access_token(token) {
                Ok(user_id) => return Ok(AuthUser(user_id)),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| AppError::Unauthorized("Invalid access token".into())))
    }
}
