//! Per-entry enrichment.
//!
//! Each field of an [`EnrichedEntry`] is resolved independently. Values the
//! primary source already knows win; providers are only asked for what is
//! missing, and all of those lookups for one entry run concurrently.
//!
//! An optional gate bounds provider calls across many entries: every lookup
//! holds one of its permits while it runs.

use std::future::Future;

use anistream_common::{CatalogEntry, EnrichedEntry};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::metadata::ProviderSet;

/// Enriches one catalog entry at a time using a [`ProviderSet`].
pub struct Enricher {
    providers: ProviderSet,
}

impl Enricher {
    pub fn new(providers: ProviderSet) -> Self {
        Self { providers }
    }

    pub fn providers(&self) -> &ProviderSet {
        &self.providers
    }

    /// Merge provider metadata into `entry`.
    ///
    /// Never fails: a provider that finds nothing leaves its field unset.
    pub async fn enrich(&self, entry: CatalogEntry) -> EnrichedEntry {
        self.enrich_within(entry, None).await
    }

    /// Like [`enrich`](Self::enrich), but each provider call first takes a
    /// permit from `gate`.
    pub async fn enrich_within(
        &self,
        entry: CatalogEntry,
        gate: Option<&Semaphore>,
    ) -> EnrichedEntry {
        let known_episodes = entry.best_episode_count();
        let known_image = entry.valid_image().map(str::to_string);
        let title = entry.name.as_str();

        let (total_episodes, image, rating_score, rating_classification) = tokio::join!(
            async {
                match known_episodes {
                    Some(count) => Some(count),
                    None => gated(gate, self.providers.episode_count.lookup(title)).await,
                }
            },
            async {
                match &known_image {
                    Some(url) => Some(url.clone()),
                    None => gated(gate, self.providers.cover_image.lookup(title)).await,
                }
            },
            gated(gate, self.providers.audience_score.lookup(title)),
            gated(gate, self.providers.classification.lookup(title)),
        );

        debug!(
            identifier = %entry.identifier,
            episodes = ?total_episodes,
            score = ?rating_score,
            classification = ?rating_classification,
            has_image = image.is_some(),
            "Entry enriched"
        );

        EnrichedEntry {
            total_episodes,
            image,
            rating_score,
            rating_classification,
            ..EnrichedEntry::from(entry)
        }
    }
}

async fn gated<F: Future>(gate: Option<&Semaphore>, lookup: F) -> F::Output {
    // The gate is never closed, so acquiring only waits.
    let _permit = match gate {
        Some(gate) => gate.acquire().await.ok(),
        None => None,
    };
    lookup.await
}
