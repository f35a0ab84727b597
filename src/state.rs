use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{
    accounts::repo::{AccountStore, PgAccountStore},
    auth::jwt::JwtKeys,
    config::AppConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AccountStore>,
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
}

impl AppState {
    /// Connects to Postgres and makes sure the account table exists. Keys are
    /// derived from the already validated config and never change afterwards.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let keys = JwtKeys::new(&config.jwt).context("build jwt keys")?;

        let db = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let store = PgAccountStore::new(db);
        store.init().await.context("create account table")?;

        Ok(Self::from_parts(Arc::new(store), Arc::new(config), keys))
    }

    pub fn from_parts(store: Arc<dyn AccountStore>, config: Arc<AppConfig>, keys: JwtKeys) -> Self {
        Self {
            store,
            config,
            keys,
        }
    }
}
