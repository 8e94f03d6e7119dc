use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::jwt::JwtKeys;
use crate::auth::repo::UserStore;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues, verifies, rotates and revokes session tokens.
///
/// The current refresh token of each user is mirrored on the user record;
/// a presented refresh token is only honoured while it equals that value.
#[derive(Clone)]
pub struct TokenService {
    keys: JwtKeys,
    users: Arc<dyn UserStore>,
}

impl TokenService {
    pub fn new(keys: JwtKeys, users: Arc<dyn UserStore>) -> Self {
        Self { keys, users }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    pub async fn issue_token_pair(&self, user_id: Uuid) -> AppResult<TokenPair> {
        let access_token = self.keys.sign_access(user_id)?;
        let refresh_token = self.keys.sign_refresh(user_id)?;

        let stored = self
            .users
            .set_refresh_token(user_id, Some(&refresh_token))
            .await
            .map_err(|e| match e {
                AppError::Database(db) => AppError::Internal(
                    anyhow::Error::new(db).context("persist refresh token"),
                ),
                other => other,
            })?;
        if !stored {
            return Err(AppError::NotFound("User not found".into()));
        }

        info!(user_id = %user_id, "token pair issued");
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    pub fn verify_access_token(&self, token: &str) -> AppResult<Uuid> {
        self.keys
            .verify_access(token)
            .map(|claims| claims.sub)
            .map_err(|e| {
                warn!(error = %e, "access token rejected");
                AppError::Unauthorized("Invalid access token".into())
            })
    }

    pub async fn rotate_refresh_token(&self, presented: &str) -> AppResult<TokenPair> {
        let claims = self.keys.verify_refresh(presented).map_err(|e| {
            warn!(error = %e, "refresh token rejected");
            AppError::Unauthorized(format!("Invalid refresh token: {e}"))
        })?;

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".into()))?;

        if user.refresh_token.as_deref() != Some(presented) {
            warn!(user_id = %user.id, "stale refresh token presented");
            return Err(AppError::Unauthorized(
                "Refresh token is expired or used".into(),
            ));
        }

        self.issue_token_pair(user.id).await.map_err(|e| match e {
            AppError::NotFound(_) => AppError::Unauthorized("Invalid refresh token".into()),
            other => other,
        })
    }

    /// Clears the stored refresh token. Succeeds whether or not a session exists.
    pub async fn revoke_session(&self, user_id: Uuid) -> AppResult<()> {
        self.users.set_refresh_token(user_id, None).await?;
        info!(user_id = %user_id, "session revoked");
        Ok(())
    }
}
