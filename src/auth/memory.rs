use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::repo::UserStore;
use crate::auth::repo_types::{NewUser, User};
use crate::error::{AppError, AppResult};

/// In-process user store with the same uniqueness rules as the `users` table.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        let mut matches: Vec<&User> = users
            .values()
            .filter(|u| {
                username.is_some_and(|name| u.username == name)
                    || email.is_some_and(|mail| u.email == mail)
            })
            .collect();
        matches.sort_by_key(|u| u.created_at);
        Ok(matches.first().map(|u| (*u).clone()))
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.username == new_user.username || u.email == new_user.email)
        {
            return Err(AppError::Conflict(
                "User with email or username already exists".into(),
            ));
        }

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            profile_image: new_user.profile_image,
            password_hash: new_user.password_hash,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> AppResult<bool> {
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(user) => {
                user.refresh_token = token.map(str::to_string);
                user.updated_at = OffsetDateTime::now_utc();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.into(),
            email: email.into(),
            profile_image: "https://fake.local/p.png".into(),
            password_hash: "hash".into(),
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicate_username_or_email() {
        let store = MemoryUserStore::new();
        store.create(new_user("ana", "ana@example.com")).await.unwrap();

        let err = store.create(new_user("ana", "other@example.com")).await.unwrap_err();
        assert_matches!(err, AppError::Conflict(_));
        let err = store.create(new_user("bea", "ana@example.com")).await.unwrap_err();
        assert_matches!(err, AppError::Conflict(_));
    }

    #[tokio::test]
    async fn lookup_by_either_key() {
        let store = MemoryUserStore::new();
        let user = store.create(new_user("ana", "ana@example.com")).await.unwrap();

        let by_name = store.find_by_username_or_email(Some("ana"), None).await.unwrap();
        assert_eq!(by_name.map(|u| u.id), Some(user.id));
        let by_mail = store
            .find_by_username_or_email(None, Some("ana@example.com"))
            .await
            .unwrap();
        assert_eq!(by_mail.map(|u| u.id), Some(user.id));
        assert!(store
            .find_by_username_or_email(Some("nobody"), Some("nobody@example.com"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn set_refresh_token_reports_missing_user() {
        let store = MemoryUserStore::new();
        assert!(!store.set_refresh_token(Uuid::new_v4(), Some("t")).await.unwrap());

        let user = store.create(new_user("ana", "ana@example.com")).await.unwrap();
        assert!(store.set_refresh_token(user.id, Some("t")).await.unwrap());
        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some("t"));
    }
}
