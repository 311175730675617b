use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::geo::GeoPoint;

/// Only providers with this approval status are ever surfaced.
pub const APPROVED_STATUS: &str = "approved";

/// A service category (electricians, plumbers, restaurants, ...)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

/// A single service offered by a provider, with an optional price
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServiceOffering {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub title: String,
    pub price: Option<Decimal>,
    pub price_unit: Option<String>,
}

/// A listed service business, joined with its category and services.
///
/// Read-only projection: the pipeline never mutates the store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Provider {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    /// Rating in [0, 5]
    pub rating: Decimal,
    pub review_count: i32,
    pub city: String,
    pub area: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub operating_hours: Option<String>,
    pub status: String,
    pub category_name: String,
    pub category_slug: String,
    pub created_at: DateTime<Utc>,
    /// Loaded with a second query, not part of the provider row
    #[sqlx(skip)]
    #[serde(default)]
    pub services: Vec<ServiceOffering>,
}

impl Provider {
    /// Geolocation, when both coordinates are present
    pub fn location(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint { lat, lon }),
            _ => None,
        }
    }

    /// Relative path to the provider's profile page
    pub fn profile_path(&self) -> Option<String> {
        if self.slug.is_empty() {
            None
        } else {
            Some(format!("/providers/{}", self.slug))
        }
    }

    /// Area when known, city otherwise
    pub fn area_or_city(&self) -> &str {
        self.area.as_deref().unwrap_or(&self.city)
    }
}

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One message of a conversation. The last message of a request is the
/// current turn, the prefix is history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Ordering for provider queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderOrder {
    #[default]
    RatingDesc,
    ReviewCountDesc,
    NameAsc,
}

/// Query shape for the provider store. Status is implicit: every query is
/// restricted to approved providers.
#[derive(Debug, Clone, Default)]
pub struct ProviderQuery {
    pub category_slug: Option<String>,
    pub name_match: Option<String>,
    pub min_rating: Option<Decimal>,
    pub order: ProviderOrder,
    pub limit: i64,
}

/// A provider candidate for the current turn, optionally annotated with
/// the distance from the user's location
#[derive(Debug, Clone)]
pub struct ProviderHit {
    pub provider: Provider,
    pub distance_km: Option<f64>,
}
