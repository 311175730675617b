//! Query shaping and provider retrieval for a chat turn

use std::sync::Arc;

use tracing::{debug, warn};

use crate::chat::intent::{is_substantive, IntentFlags};
use crate::models::{Provider, ProviderOrder, ProviderQuery};
use crate::store::ProviderStore;

/// Default result size, ordered by rating
pub const DEFAULT_RESULT_LIMIT: i64 = 5;

/// Wider candidate pool fetched when results will be re-sorted by
/// distance client-side
pub const CLOSEST_CANDIDATE_POOL: i64 = 20;

/// Shape a provider query from the classifier output.
///
/// A resolved category wins over text matching; otherwise substantive
/// utterances match on their first whitespace-delimited token only, so a
/// long sentence does not have to match a provider name verbatim.
pub fn shape_query(flags: &IntentFlags, utterance: &str, has_user_location: bool) -> ProviderQuery {
    let mut query = ProviderQuery {
        order: ProviderOrder::RatingDesc,
        limit: DEFAULT_RESULT_LIMIT,
        ..ProviderQuery::default()
    };

    if let Some(slug) = &flags.target_category_slug {
        query.category_slug = Some(slug.clone());
    } else if is_substantive(utterance) {
        query.name_match = utterance
            .trim()
            .to_lowercase()
            .split_whitespace()
            .next()
            .map(str::to_string);
    }

    if flags.is_asking_for_closest && has_user_location {
        query.limit = CLOSEST_CANDIDATE_POOL;
    }

    query
}

/// Retriever over the provider store
pub struct Retriever {
    store: Arc<dyn ProviderStore>,
}

impl Retriever {
    pub fn new(store: Arc<dyn ProviderStore>) -> Self {
        Self { store }
    }

    /// Fetch candidate providers for the turn.
    ///
    /// Data-access failures are recovered here: the turn continues with an
    /// empty result set instead of failing, per the degradation policy.
    pub async fn fetch_candidates(
        &self,
        flags: &IntentFlags,
        utterance: &str,
        has_user_location: bool,
    ) -> Vec<Provider> {
        let query = shape_query(flags, utterance, has_user_location);
        debug!(
            category = ?query.category_slug,
            name_match = ?query.name_match,
            limit = query.limit,
            "fetching provider candidates"
        );

        match self.store.search_providers(&query).await {
            Ok(providers) => {
                debug!("retrieved {} provider(s)", providers.len());
                providers
            }
            Err(e) => {
                warn!("provider lookup failed, continuing with empty results: {e}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::intent::classify;

    #[test]
    fn category_filter_wins_over_name_match() {
        let flags = classify("best electrician in andheri");
        let query = shape_query(&flags, "best electrician in andheri", false);
        assert_eq!(query.category_slug.as_deref(), Some("electricians"));
        assert_eq!(query.name_match, None);
        assert_eq!(query.limit, DEFAULT_RESULT_LIMIT);
    }

    #[test]
    fn name_match_uses_first_token_only() {
        let flags = classify("sharma general store");
        let query = shape_query(&flags, "Sharma general store", false);
        assert_eq!(query.category_slug, None);
        assert_eq!(query.name_match.as_deref(), Some("sharma"));
    }

    #[test]
    fn short_utterance_matches_nothing_specific() {
        let flags = classify("ok");
        let query = shape_query(&flags, "ok", false);
        assert_eq!(query.category_slug, None);
        assert_eq!(query.name_match, None);
    }

    #[test]
    fn closest_with_location_widens_the_pool() {
        let flags = classify("nearest plumber");
        let query = shape_query(&flags, "nearest plumber", true);
        assert_eq!(query.limit, CLOSEST_CANDIDATE_POOL);
        assert_eq!(query.category_slug.as_deref(), Some("plumbers"));
    }

    #[test]
    fn closest_without_location_keeps_default_limit() {
        let flags = classify("nearest plumber");
        let query = shape_query(&flags, "nearest plumber", false);
        assert_eq!(query.limit, DEFAULT_RESULT_LIMIT);
    }
}
