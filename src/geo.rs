//! Great-circle distance helpers for "closest provider" queries

use serde::{Deserialize, Serialize};

use crate::models::{Provider, ProviderHit};

/// Mean Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance assigned to providers without a geolocation so they sort last
/// but are never excluded
pub const MISSING_LOCATION_SENTINEL_KM: f64 = 999.0;

/// How many providers survive the distance re-sort
pub const CLOSEST_RESULT_LIMIT: usize = 5;

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Haversine distance between two points, in kilometers.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Annotate each provider with its distance from the user, sort ascending
/// and keep the closest five. Providers without coordinates get the
/// sentinel distance and therefore sort last.
pub fn annotate_and_sort(providers: Vec<Provider>, user: GeoPoint) -> Vec<ProviderHit> {
    let mut hits: Vec<ProviderHit> = providers
        .into_iter()
        .map(|provider| {
            let distance = provider
                .location()
                .map(|loc| distance_km(user.lat, user.lon, loc.lat, loc.lon))
                .unwrap_or(MISSING_LOCATION_SENTINEL_KM);
            ProviderHit {
                provider,
                distance_km: Some(distance),
            }
        })
        .collect();

    hits.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hits.truncate(CLOSEST_RESULT_LIMIT);
    hits
}
