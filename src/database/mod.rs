use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::{Category, Provider, ProviderQuery};
use crate::store::ProviderStore;
use crate::Result;

mod categories;
mod providers;

/// Database connection pool wrapper
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new database instance from configuration
    pub async fn from_config(config: &crate::config::AppConfig) -> Result<Self> {
        let pool_options = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections())
            .min_connections(config.min_connections())
            .acquire_timeout(std::time::Duration::from_secs(config.connection_timeout()));

        let pool = pool_options.connect(config.database_url()).await?;
        Ok(Self::new(pool))
    }

    /// Get a reference to the database pool for raw queries
    pub fn pool(&self) -> &sqlx::PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProviderStore for Database {
    async fn search_providers(&self, query: &ProviderQuery) -> Result<Vec<Provider>> {
        self.search_providers_rows(query).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        self.list_category_rows().await
    }

    async fn get_provider_by_slug(&self, slug: &str) -> Result<Option<Provider>> {
        self.provider_by_slug(slug).await
    }
}
