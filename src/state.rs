use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::jwt::JwtKeys;
use crate::auth::memory::MemoryUserStore;
use crate::auth::repo::{PgUserStore, UserStore};
use crate::auth::tokens::TokenService;
use crate::config::AppConfig;
use crate::db;
use crate::storage::{MemoryStorage, Storage, StorageClient};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub storage: Arc<dyn StorageClient>,
    pub tokens: TokenService,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let pool = db::connect(&config).await?;
        db::migrate(&pool).await;
        let users = Arc::new(PgUserStore::new(pool)) as Arc<dyn UserStore>;

        // S3 / MinIO
        let storage = Arc::new(Storage::new(&config.storage).await?) as Arc<dyn StorageClient>;

        Ok(Self::from_parts(config, users, storage))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        storage: Arc<dyn StorageClient>,
    ) -> Self {
        let tokens = TokenService::new(JwtKeys::from(&config.jwt), users.clone());
        Self {
            config,
            users,
            storage,
            tokens,
        }
    }

    /// In-memory store and storage with test settings.
    pub fn fake() -> Self {
        Self::from_parts(
            Arc::new(AppConfig::for_tests()),
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryStorage::default()),
        )
    }
}

impl FromRef<AppState> for TokenService {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}
