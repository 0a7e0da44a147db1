//! The set of lookups used for enrichment, one per metadata role.
//!
//! A [`ProviderSet`] is built once at startup from configuration and shared
//! by every request. Repeated titles never reach the network twice: AniList
//! and Kitsu are wrapped in [`Memoized`], and the Jikan roles share the
//! search memo of one [`JikanClient`]. Disabled providers are replaced by
//! [`Absent`].

use std::sync::Arc;

use tracing::info;

use crate::config::Config;

use super::provider::{Absent, MemoPolicy, MetadataLookup, Memoized};
use super::providers::{AniListScore, JikanClient, JikanCoverImage, JikanEpisodeCount, KitsuAgeRating};

/// One lookup per enrichment role.
#[derive(Clone)]
pub struct ProviderSet {
    pub cover_image: Arc<dyn MetadataLookup<String>>,
    pub episode_count: Arc<dyn MetadataLookup<u32>>,
    pub audience_score: Arc<dyn MetadataLookup<f64>>,
    pub classification: Arc<dyn MetadataLookup<String>>,
}

impl ProviderSet {
    /// A set where every role is absent.
    pub fn absent() -> Self {
        Self {
            cover_image: Arc::new(Absent::new("cover_image")),
            episode_count: Arc::new(Absent::new("episode_count")),
            audience_score: Arc::new(Absent::new("audience_score")),
            classification: Arc::new(Absent::new("classification")),
        }
    }

    /// Build the configured providers around a shared HTTP client.
    pub fn from_config(config: &Config, http: reqwest::Client) -> Self {
        let providers = &config.providers;
        let policy = MemoPolicy::from_config(&config.enrichment);

        let mut set = Self::absent();

        if providers.jikan.enabled {
            let client = Arc::new(JikanClient::new(
                http.clone(),
                providers.jikan.base_url.clone(),
                providers.jikan.requests_per_second,
                config.enrichment.request_timeout(),
                policy,
            ));
            set.cover_image = Arc::new(JikanCoverImage::new(client.clone()));
            set.episode_count = Arc::new(JikanEpisodeCount::new(client));
        }

        if providers.anilist.enabled {
            let lookup = AniListScore::new(http.clone(), providers.anilist.base_url.clone());
            set.audience_score = memoize(lookup, policy);
        }

        if providers.kitsu.enabled {
            let lookup = KitsuAgeRating::new(http, providers.kitsu.base_url.clone());
            set.classification = memoize(lookup, policy);
        }

        info!(
            cover_image = set.cover_image.name(),
            episode_count = set.episode_count.name(),
            audience_score = set.audience_score.name(),
            classification = set.classification.name(),
            "Metadata providers configured"
        );

        set
    }
}

fn memoize<T, L>(lookup: L, policy: MemoPolicy) -> Arc<dyn MetadataLookup<T>>
where
    T: Clone + Send + Sync + 'static,
    L: MetadataLookup<T> + 'static,
{
    Arc::new(Memoized::new(Arc::new(lookup), policy))
}
