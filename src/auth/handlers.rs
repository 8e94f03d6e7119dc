use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Multipart, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use tracing::{instrument, warn};

use crate::{
    auth::{
        cookies::{cleared_session_cookies, read_cookie, session_cookies, REFRESH_COOKIE},
        dto::{LoginRequest, LoginResponse, PublicUser, RefreshRequest, RegisterInput},
        extractors::AuthUser,
        services::{login_user, register_user},
        tokens::TokenPair,
    },
    error::{AppError, AppResult},
    images::services::UploadItem,
    response::ApiResponse,
    state::AppState,
};

const PROFILE_IMAGE_LIMIT: usize = 5 * 1024 * 1024;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/register",
            post(register).layer(DefaultBodyLimit::max(PROFILE_IMAGE_LIMIT)),
        )
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/refresh-token", post(refresh_access_token))
        .route("/current-user", get(current_user))
}

fn malformed(e: impl std::fmt::Display) -> AppError {
    AppError::Validation(format!("Malformed request body: {e}"))
}

async fn read_register_form(mut mp: Multipart) -> AppResult<RegisterInput> {
    let mut input = RegisterInput::default();
    while let Some(field) = mp.next_field().await.map_err(malformed)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("username") => input.username = field.text().await.map_err(malformed)?,
            Some("email") => input.email = field.text().await.map_err(malformed)?,
            Some("password") => input.password = field.text().await.map_err(malformed)?,
            Some("profileImage") => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".into());
                let body: Bytes = field.bytes().await.map_err(malformed)?;
                if !body.is_empty() {
                    input.profile_image = Some(UploadItem { body, content_type });
                }
            }
            other => warn!(field = ?other, "ignoring unknown register field"),
        }
    }
    Ok(input)
}

#[instrument(skip(state, mp))]
pub async fn register(
    State(state): State<AppState>,
    mp: Multipart,
) -> AppResult<ApiResponse<PublicUser>> {
    let input = read_register_form(mp).await?;
    let user = register_user(&state, input).await?;
    Ok(ApiResponse::new(
        StatusCode::CREATED,
        PublicUser::from(user),
        "User registered successfully",
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<(HeaderMap, ApiResponse<LoginResponse>)> {
    let Json(payload) = payload.map_err(malformed)?;
    let (user, pair) = login_user(&state, payload).await?;

    let cookies = session_cookies(&pair, state.tokens.keys());
    Ok((
        cookies,
        ApiResponse::ok(
            LoginResponse {
                user: PublicUser::from(user),
                access_token: pair.access_token,
                refresh_token: pair.refresh_token,
            },
            "User logged in successfully",
        ),
    ))
}

#[instrument(skip(state))]
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<(HeaderMap, ApiResponse<serde_json::Value>)> {
    state.tokens.revoke_session(user_id).await?;
    Ok((
        cleared_session_cookies(),
        ApiResponse::ok(serde_json::json!({}), "User logged out"),
    ))
}

#[instrument(skip(state, headers, body))]
pub async fn refresh_access_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> AppResult<(HeaderMap, ApiResponse<TokenPair>)> {
    let presented = read_cookie(&headers, REFRESH_COOKIE)
        .or_else(|| body.and_then(|Json(b)| b.refresh_token))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Unauthorized request".into()))?;

    let pair = state.tokens.rotate_refresh_token(&presented).await?;
    let cookies = session_cookies(&pair, state.tokens.keys());
    Ok((cookies, ApiResponse::ok(pair, "Access token refreshed")))
}

#[instrument(skip(state))]
pub async fn current_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<ApiResponse<PublicUser>> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid access token".into()))?;
    Ok(ApiResponse::ok(
        PublicUser::from(user),
        "Current user fetched successfully",
    ))
}
