use std::sync::Arc;

use crate::auth::repo::{AccountStore, PgAccountStore};
use crate::config::AppConfig;
use crate::db;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub accounts: Arc<dyn AccountStore>,
}

impl AppState {
    /// Reads the environment, connects to Postgres and applies migrations.
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let pool = db::connect(&config.db, &config.db.name).await?;
        db::migrate(&pool).await?;

        let accounts = Arc::new(PgAccountStore::new(pool)) as Arc<dyn AccountStore>;
        Ok(Self { config, accounts })
    }

    pub fn from_parts(config: Arc<AppConfig>, accounts: Arc<dyn AccountStore>) -> Self {
        Self { config, accounts }
    }
}
