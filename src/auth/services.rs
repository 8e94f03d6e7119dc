use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::auth::dto::{LoginRequest, RegisterInput};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo_types::{NewUser, User};
use crate::auth::tokens::TokenPair;
use crate::error::{AppError, AppResult};
use crate::images::services::{discard_profile_image, upload_profile_image};
use crate::state::AppState;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Usernames and emails are stored and looked up trimmed and lowercased.
fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(normalize).filter(|v| !v.is_empty())
}

pub async fn register_user(state: &AppState, input: RegisterInput) -> AppResult<User> {
    let username = normalize(&input.username);
    let email = normalize(&input.email);
    if username.is_empty() || email.is_empty() || input.password.trim().is_empty() {
        return Err(AppError::Validation("All fields are required".into()));
    }
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }

    if state
        .users
        .find_by_username_or_email(Some(&username), Some(&email))
        .await?
        .is_some()
    {
        warn!(username = %username, email = %email, "user already exists");
        return Err(AppError::Conflict(
            "User with email or username already exists".into(),
        ));
    }

    let image = input
        .profile_image
        .ok_or_else(|| AppError::Validation("Profile image is required".into()))?;
    let stored = upload_profile_image(state.storage.as_ref(), image).await?;

    let created = match hash_password(&input.password) {
        Ok(password_hash) => {
            state
                .users
                .create(NewUser {
                    username,
                    email,
                    profile_image: stored.url.clone(),
                    password_hash,
                })
                .await
        }
        Err(e) => Err(AppError::Internal(e)),
    };

    match created {
        Ok(user) => {
            info!(user_id = %user.id, username = %user.username, "user registered");
            Ok(user)
        }
        Err(e) => {
            discard_profile_image(state.storage.as_ref(), &stored).await;
            Err(e)
        }
    }
}

pub async fn login_user(state: &AppState, req: LoginRequest) -> AppResult<(User, TokenPair)> {
    let username = non_empty(req.username.as_deref());
    let email = non_empty(req.email.as_deref());
    if username.is_none() && email.is_none() {
        return Err(AppError::Validation("Username or email is required".into()));
    }
    let password = req
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("Password is required".into()))?;

    let user = state
        .users
        .find_by_username_or_email(username.as_deref(), email.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound("User does not exist".into()))?;

    if !verify_password(&password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized("Invalid user credentials".into()));
    }

    let pair = state.tokens.issue_token_pair(user.id).await?;
    info!(user_id = %user.id, "user logged in");
    Ok((user, pair))
}
