//! API request and response types

use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;

use crate::geo::GeoPoint;
use crate::models::{Category, ChatMessage, Provider};

/// Chat turn request. `messages` defaults to empty when the field is
/// absent so a missing array gets the same 400 as an empty one.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub user_location: Option<GeoPoint>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Chat turn reply
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Structural validation failure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Provider search query parameters
#[derive(Debug, Deserialize)]
pub struct ProviderSearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    20
}

/// Provider response
#[derive(Debug, Serialize)]
pub struct ProviderResponse {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub rating: Decimal,
    pub review_count: i32,
    pub city: String,
    pub area: Option<String>,
    pub phone: Option<String>,
    pub category: String,
    pub profile_path: Option<String>,
}

impl From<Provider> for ProviderResponse {
    fn from(p: Provider) -> Self {
        let profile_path = p.profile_path();
        Self {
            name: p.name,
            slug: p.slug,
            description: p.description,
            rating: p.rating,
            review_count: p.review_count,
            city: p.city,
            area: p.area,
            phone: p.phone,
            category: p.category_name,
            profile_path,
        }
    }
}

/// Category response
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub name: String,
    pub slug: String,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            name: c.name,
            slug: c.slug,
        }
    }
}
