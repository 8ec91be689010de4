use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::jwt::TokenService;
use crate::config::AppConfig;
use crate::db::{PgRepository, Repository};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    pub tokens: Arc<TokenService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: PgPool, config: Arc<AppConfig>) -> Self {
        let repo = Arc::new(PgRepository::new(db)) as Arc<dyn Repository>;
        Self::from_parts(repo, config)
    }

    pub fn from_parts(repo: Arc<dyn Repository>, config: Arc<AppConfig>) -> Self {
        let tokens = Arc::new(TokenService::new(&config.jwt));
        Self {
            repo,
            tokens,
            config,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State over an empty in-memory store.
    pub fn fake() -> Self {
        Self::fake_with(crate::db::memory::MemoryRepository::default())
    }

    pub fn fake_with(repo: crate::db::memory::MemoryRepository) -> Self {
        let config = AppConfig::from_lookup(|key| match key {
            "JWT_SECRET" => Some("test-secret".into()),
            "JWT_ISSUER" => Some("test-issuer".into()),
            "JWT_AUDIENCE" => Some("test-aud".into()),
            _ => None,
        })
        .expect("test config");
        Self::from_parts(Arc::new(repo), Arc::new(config))
    }
}
