use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::images::services::UploadItem;

/// Registration form, collected from the multipart body.
#[derive(Default)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub profile_image: Option<UploadItem>,
}

/// Request body for login. Either `username` or `email` identifies the user.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for token refresh, for clients that do not send cookies.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub profile_image: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            profile_image: u.profile_image,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Response returned after login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: PublicUser,
    pub access_token: String,
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_never_carries_secrets() {
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            username: "ana".into(),
            email: "ana@example.com".into(),
            profile_image: "https://fake.local/p.png".into(),
            password_hash: "$argon2id$secret".into(),
            refresh_token: Some("refresh.secret.token".into()),
            created_at: now,
            updated_at: now,
        };

        let raw = serde_json::to_value(&user).unwrap();
        assert!(raw.get("password_hash").is_none());
        assert!(raw.get("refresh_token").is_none());

        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains("ana@example.com"));
        assert!(json.contains("profileImage"));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("refresh.secret.token"));
    }
}
