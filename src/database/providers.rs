use std::collections::HashMap;

use uuid::Uuid;

use super::Database;
use crate::models::{Provider, ProviderOrder, ProviderQuery, ServiceOffering};
use crate::Result;

const PROVIDER_COLUMNS: &str = r#"
    p.id, p.name, p.slug, p.description, p.rating, p.review_count,
    p.city, p.area, p.address, p.phone, p.latitude, p.longitude,
    p.operating_hours, p.status,
    c.name AS category_name, c.slug AS category_slug,
    p.created_at
"#;

impl Database {
    /// Search approved providers with optional category, name and rating
    /// filters. Category and name filters are passed as nullable binds so
    /// the statement stays static.
    pub(super) async fn search_providers_rows(
        &self,
        query: &ProviderQuery,
    ) -> Result<Vec<Provider>> {
        let order_clause = match query.order {
            ProviderOrder::RatingDesc => "ORDER BY p.rating DESC, p.review_count DESC",
            ProviderOrder::ReviewCountDesc => "ORDER BY p.review_count DESC, p.rating DESC",
            ProviderOrder::NameAsc => "ORDER BY p.name ASC",
        };

        let sql = format!(
            r#"
            SELECT {PROVIDER_COLUMNS}
            FROM providers p
            JOIN categories c ON c.id = p.category_id
            WHERE p.status = 'approved'
              AND ($1::text IS NULL OR c.slug = $1)
              AND ($2::text IS NULL OR p.name ILIKE '%' || $2 || '%')
              AND ($3::numeric IS NULL OR p.rating >= $3)
            {order_clause}
            LIMIT $4
            "#
        );

        let mut providers: Vec<Provider> = sqlx::query_as(&sql)
            .bind(query.category_slug.as_deref())
            .bind(query.name_match.as_deref())
            .bind(query.min_rating)
            .bind(query.limit.max(1))
            .fetch_all(&self.pool)
            .await?;

        self.attach_services(providers.as_mut_slice()).await?;
        Ok(providers)
    }

    /// Get an approved provider by URL slug
    pub(super) async fn provider_by_slug(&self, slug: &str) -> Result<Option<Provider>> {
        let sql = format!(
            r#"
            SELECT {PROVIDER_COLUMNS}
            FROM providers p
            JOIN categories c ON c.id = p.category_id
            WHERE p.status = 'approved' AND p.slug = $1
            "#
        );

        let provider: Option<Provider> = sqlx::query_as(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        match provider {
            Some(mut provider) => {
                self.attach_services(std::slice::from_mut(&mut provider))
                    .await?;
                Ok(Some(provider))
            }
            None => Ok(None),
        }
    }

    /// Eager-load services for a batch of providers with a single query
    async fn attach_services(&self, providers: &mut [Provider]) -> Result<()> {
        if providers.is_empty() {
            return Ok(());
        }

        let ids: Vec<Uuid> = providers.iter().map(|p| p.id).collect();
        let services: Vec<ServiceOffering> = sqlx::query_as(
            r#"
            SELECT id, provider_id, title, price, price_unit
            FROM services
            WHERE provider_id = ANY($1)
            ORDER BY title ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_provider: HashMap<Uuid, Vec<ServiceOffering>> = HashMap::new();
        for service in services {
            by_provider
                .entry(service.provider_id)
                .or_default()
                .push(service);
        }

        for provider in providers.iter_mut() {
            provider.services = by_provider.remove(&provider.id).unwrap_or_default();
        }

        Ok(())
    }
}
