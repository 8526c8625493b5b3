use std::{sync::Arc, time::Duration};

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

use crate::{
    configuration::Config, db::error::DatabaseError, recommendation::RecommendationChain,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub recommender: RecommendationChain,
    pub http_client: reqwest::Client,
}

pub type SharedAppState = Arc<AppState>;

impl AppState {
    pub async fn init(config: Config) -> Result<Self, anyhow::Error> {
        // Idle connections are kept so an in-memory database survives between requests.
        let pool = SqlitePoolOptions::new()
            .min_connections(config.database.min_connections)
            .max_connections(config.database.max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_lazy_with(config.database.connect_options()?);

        if config.application.run_migration {
            tracing::warn!("Running database migrations...");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(DatabaseError::MigrationError)?;
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.recommendation.timeout_seconds))
            .build()?;
        let recommender =
            RecommendationChain::from_settings(&config.recommendation, http_client.clone());

        Ok(AppState {
            pool,
            recommender,
            http_client,
        })
    }
}
