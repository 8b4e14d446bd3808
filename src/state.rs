use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::AppConfig;
use crate::users::password::BcryptHasher;
use crate::users::repo::PgUserStore;
use crate::users::service::UserService;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub users: UserService,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let users = UserService::new(
            Arc::new(PgUserStore::new(db.clone())),
            Arc::new(BcryptHasher::new()),
        );

        Ok(Self { db, config, users })
    }
}
