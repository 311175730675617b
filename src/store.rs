//! Provider store seam
//!
//! The chat pipeline only issues read-only queries against the directory,
//! so the data access collaborator is a trait. `Database` implements it
//! over Postgres; `MemoryStore` is an in-process backend used for demo
//! mode and tests.

use async_trait::async_trait;

use crate::models::{Category, Provider, ProviderOrder, ProviderQuery};
use crate::Result;

#[async_trait]
pub trait ProviderStore: Send + Sync + 'static {
    /// Search approved providers according to the query shape
    async fn search_providers(&self, query: &ProviderQuery) -> Result<Vec<Provider>>;

    /// List all categories
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Fetch a single approved provider by its URL slug
    async fn get_provider_by_slug(&self, slug: &str) -> Result<Option<Provider>>;
}

/// In-memory provider store.
///
/// Serves the same query shapes as the Postgres store from a fixed vector,
/// which is all demo mode and the test suite need.
#[derive(Debug, Default)]
pub struct MemoryStore {
    providers: Vec<Provider>,
    categories: Vec<Category>,
}

impl MemoryStore {
    pub fn new(providers: Vec<Provider>, categories: Vec<Category>) -> Self {
        Self {
            providers,
            categories,
        }
    }

    /// A small fixed dataset for demo mode: a handful of approved
    /// providers across three categories, with enough geo and service
    /// data to exercise every pipeline branch.
    pub fn with_sample_data() -> Self {
        sample_data::build()
    }
}

mod sample_data {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::MemoryStore;
    use crate::models::{Category, Provider, ServiceOffering, APPROVED_STATUS};

    struct Seed {
        name: &'static str,
        category: usize,
        rating: &'static str,
        review_count: i32,
        city: &'static str,
        area: &'static str,
        phone: &'static str,
        geo: Option<(f64, f64)>,
        hours: &'static str,
        description: &'static str,
        service: (&'static str, &'static str, &'static str),
    }

    const CATEGORIES: &[(&str, &str)] = &[
        ("Electricians", "electricians"),
        ("Plumbers", "plumbers"),
        ("Restaurants", "restaurants"),
    ];

    const SEEDS: &[Seed] = &[
        Seed {
            name: "Bright Sparks Electricals",
            category: 0,
            rating: "4.7",
            review_count: 212,
            city: "Mumbai",
            area: "Andheri West",
            phone: "+91 98200 00001",
            geo: Some((19.1197, 72.8464)),
            hours: "9am-7pm, Mon-Sat",
            description: "House wiring, fan and light fitting, inverter setup.",
            service: ("Fan installation", "499", "visit"),
        },
        Seed {
            name: "Voltline Services",
            category: 0,
            rating: "4.3",
            review_count: 96,
            city: "Mumbai",
            area: "Bandra East",
            phone: "+91 98200 00002",
            geo: Some((19.0596, 72.8407)),
            hours: "8am-9pm",
            description: "Emergency electrical repairs and MCB replacement.",
            service: ("Wiring inspection", "799", "visit"),
        },
        Seed {
            name: "AquaFix Plumbing Co",
            category: 1,
            rating: "4.8",
            review_count: 340,
            city: "Mumbai",
            area: "Dadar",
            phone: "+91 98200 00003",
            geo: Some((19.0178, 72.8478)),
            hours: "24 hours",
            description: "Leak detection, tap and pipe repairs, bathroom fittings.",
            service: ("Tap repair", "299", "visit"),
        },
        Seed {
            name: "City Pipes",
            category: 1,
            rating: "4.1",
            review_count: 58,
            city: "Mumbai",
            area: "Kurla",
            phone: "+91 98200 00004",
            geo: None,
            hours: "10am-6pm",
            description: "Affordable plumbing for homes and small offices.",
            service: ("Pipe replacement", "1500", "job"),
        },
        Seed {
            name: "Spice Route Kitchen",
            category: 2,
            rating: "4.6",
            review_count: 1024,
            city: "Mumbai",
            area: "Colaba",
            phone: "+91 98200 00005",
            geo: Some((18.9067, 72.8147)),
            hours: "12pm-11pm",
            description: "Coastal and North Indian cuisine, family friendly.",
            service: ("Table reservation", "0", "booking"),
        },
        Seed {
            name: "Tandoor Tales",
            category: 2,
            rating: "4.4",
            review_count: 412,
            city: "Mumbai",
            area: "Powai",
            phone: "+91 98200 00006",
            geo: Some((19.1176, 72.9060)),
            hours: "1pm-11:30pm",
            description: "Charcoal tandoor specialties and biryanis.",
            service: ("Party booking", "5000", "event"),
        },
    ];

    pub(super) fn build() -> MemoryStore {
        let categories: Vec<Category> = CATEGORIES
            .iter()
            .map(|(name, slug)| Category {
                id: Uuid::new_v4(),
                name: (*name).to_string(),
                slug: (*slug).to_string(),
            })
            .collect();

        let providers = SEEDS
            .iter()
            .map(|seed| {
                let id = Uuid::new_v4();
                let category = &categories[seed.category];
                let (title, price, unit) = seed.service;
                Provider {
                    id,
                    name: seed.name.to_string(),
                    slug: seed.name.to_lowercase().replace(' ', "-"),
                    description: Some(seed.description.to_string()),
                    rating: seed.rating.parse::<Decimal>().unwrap_or_default(),
                    review_count: seed.review_count,
                    city: seed.city.to_string(),
                    area: Some(seed.area.to_string()),
                    address: Some(format!("{}, {}", seed.area, seed.city)),
                    phone: Some(seed.phone.to_string()),
                    latitude: seed.geo.map(|(lat, _)| lat),
                    longitude: seed.geo.map(|(_, lon)| lon),
                    operating_hours: Some(seed.hours.to_string()),
                    status: APPROVED_STATUS.to_string(),
                    category_name: category.name.clone(),
                    category_slug: category.slug.clone(),
                    created_at: Utc::now(),
                    services: vec![ServiceOffering {
                        id: Uuid::new_v4(),
                        provider_id: id,
                        title: title.to_string(),
                        price: price.parse::<Decimal>().ok(),
                        price_unit: Some(unit.to_string()),
                    }],
                }
            })
            .collect();

        MemoryStore::new(providers, categories)
    }
}

#[async_trait]
impl ProviderStore for MemoryStore {
    async fn search_providers(&self, query: &ProviderQuery) -> Result<Vec<Provider>> {
        let mut matches: Vec<Provider> = self
            .providers
            .iter()
            .filter(|p| p.status == crate::models::APPROVED_STATUS)
            .filter(|p| {
                query
                    .category_slug
                    .as_deref()
                    .map_or(true, |slug| p.category_slug == slug)
            })
            .filter(|p| {
                query.name_match.as_deref().map_or(true, |needle| {
                    p.name.to_lowercase().contains(&needle.to_lowercase())
                })
            })
            .filter(|p| query.min_rating.map_or(true, |min| p.rating >= min))
            .cloned()
            .collect();

        match query.order {
            ProviderOrder::RatingDesc => {
                matches.sort_by(|a, b| b.rating.cmp(&a.rating));
            }
            ProviderOrder::ReviewCountDesc => {
                matches.sort_by(|a, b| b.review_count.cmp(&a.review_count));
            }
            ProviderOrder::NameAsc => {
                matches.sort_by(|a, b| a.name.cmp(&b.name));
            }
        }

        if query.limit > 0 {
            matches.truncate(query.limit as usize);
        }
        Ok(matches)
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.categories.clone())
    }

    async fn get_provider_by_slug(&self, slug: &str) -> Result<Option<Provider>> {
        Ok(self
            .providers
            .iter()
            .find(|p| p.slug == slug && p.status == crate::models::APPROVED_STATUS)
            .cloned())
    }
}
