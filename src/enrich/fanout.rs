//! Bounded, order-preserving enrichment of a whole page.
//!
//! Every entry gets its own task on a [`JoinSet`]. Two semaphores of
//! `concurrency` permits are shared by the whole page: one bounds the entries
//! being enriched, the other is taken by every provider call, so at most
//! `concurrency` calls are in flight no matter how many lookups each entry
//! needs. A call permit is held for one lookup only, so neither semaphore
//! waits on the other. Results are written back into the slot of their
//! input, so output order always matches input order regardless of
//! completion order.
//!
//! Dropping the future returned by [`PageEnricher::enrich_page`] drops the
//! `JoinSet`, which aborts all outstanding tasks.

use std::sync::Arc;

use anistream_common::{CatalogEntry, EnrichedEntry};
use futures::stream::{self, StreamExt};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::pipeline::Enricher;

/// Default bound on entries, and on provider calls, in flight for one page.
pub const DEFAULT_CONCURRENCY: usize = 10;

pub struct PageEnricher {
    enricher: Arc<Enricher>,
    concurrency: usize,
    image_prepass: bool,
}

impl PageEnricher {
    pub fn new(enricher: Arc<Enricher>, concurrency: usize, image_prepass: bool) -> Self {
        Self {
            enricher,
            concurrency: concurrency.max(1),
            image_prepass,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Enrich every entry, returning results in input order.
    ///
    /// A task that panics yields its entry un-enriched instead of failing the
    /// page.
    pub async fn enrich_page(&self, entries: Vec<CatalogEntry>) -> Vec<EnrichedEntry> {
        if entries.is_empty() {
            return Vec::new();
        }

        let entries = if self.image_prepass {
            self.backfill_images(entries).await
        } else {
            entries
        };

        let total = entries.len();
        let entry_permits = Arc::new(Semaphore::new(self.concurrency));
        let call_permits = Arc::new(Semaphore::new(self.concurrency));
        let mut slots: Vec<Option<EnrichedEntry>> = vec![None; total];
        let mut tasks = JoinSet::new();

        for (idx, entry) in entries.iter().cloned().enumerate() {
            let entry_permits = entry_permits.clone();
            let call_permits = call_permits.clone();
            let enricher = self.enricher.clone();

            tasks.spawn(async move {
                // Never closed, so this only ever waits.
                let _permit = entry_permits.acquire_owned().await.ok();
                (idx, enricher.enrich_within(entry, Some(&*call_permits)).await)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, enriched)) => slots[idx] = Some(enriched),
                Err(e) => warn!(error = %e, "Enrichment task failed"),
            }
        }

        let mut failed = 0usize;
        let enriched: Vec<EnrichedEntry> = slots
            .into_iter()
            .zip(entries)
            .map(|(slot, entry)| {
                slot.unwrap_or_else(|| {
                    failed += 1;
                    EnrichedEntry::from(entry)
                })
            })
            .collect();

        info!(entries = total, failed, "Page enriched");
        enriched
    }

    /// Enrich a single entry under the same call bound as a page.
    pub async fn enrich_one(&self, entry: CatalogEntry) -> EnrichedEntry {
        let gate = Semaphore::new(self.concurrency);
        self.enricher.enrich_within(entry, Some(&gate)).await
    }

    /// Fill in cover images the source did not provide, ahead of enrichment.
    async fn backfill_images(&self, entries: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
        let lookup = &self.enricher.providers().cover_image;

        stream::iter(entries)
            .map(|mut entry| async move {
                if entry.valid_image().is_none() {
                    if let Some(url) = lookup.lookup(&entry.name).await {
                        debug!(identifier = %entry.identifier, "Cover image backfilled");
                        entry.image = Some(url);
                    }
                }
                entry
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }
}
