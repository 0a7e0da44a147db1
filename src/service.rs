//! Discovery operations: catalog queries with enriched results.
//!
//! [`DiscoveryService`] is the composition root. It is built once (usually
//! from [`Config`]) and owns the catalog caches, the provider memo tables and
//! the shared HTTP client for the life of the process.

use std::sync::Arc;

use anistream_common::{
    CatalogEntry, EnrichedDetail, EnrichedEntry, EnrichedPage, Error, Result, SearchResults,
};
use anyhow::Context;
use tracing::info;

use crate::catalog::{CatalogService, CatalogSource, FileCatalog};
use crate::config::Config;
use crate::enrich::{Enricher, PageEnricher};
use crate::metadata::{http, ProviderSet};

/// Largest page or result count a caller may request.
pub const MAX_LIMIT: u32 = 50;

pub struct DiscoveryService {
    catalog: CatalogService,
    enricher: PageEnricher,
}

impl DiscoveryService {
    pub fn new(catalog: CatalogService, enricher: PageEnricher) -> Self {
        Self { catalog, enricher }
    }

    /// Wire the file catalog, providers and caches described by `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let source = FileCatalog::load(&config.catalog.path)?;
        Self::with_source(config, Arc::new(source))
    }

    /// Like [`from_config`](Self::from_config) with a caller-supplied source.
    pub fn with_source(config: &Config, source: Arc<dyn CatalogSource>) -> anyhow::Result<Self> {
        let client = http::build_client(config.enrichment.request_timeout())
            .context("Failed to set up metadata providers")?;
        let providers = ProviderSet::from_config(config, client);

        let catalog = CatalogService::new(source, &config.cache);
        let enricher = PageEnricher::new(
            Arc::new(Enricher::new(providers)),
            config.enrichment.concurrency,
            config.enrichment.image_prepass,
        );
        Ok(Self::new(catalog, enricher))
    }

    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    /// Search the catalog and enrich the first `limit` matches.
    pub async fn search(&self, query: &str, limit: u32) -> Result<SearchResults> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::invalid_input("query must not be empty"));
        }
        check_limit(limit)?;

        let matches = self.catalog.cached_search(query).await?;
        let total_results = matches.len();
        let selected: Vec<CatalogEntry> = matches.iter().take(limit as usize).cloned().collect();

        let results = self.enricher.enrich_page(selected).await;
        info!(query, total_results, returned = results.len(), "Search complete");

        Ok(SearchResults {
            query: query.to_string(),
            total_results,
            results,
        })
    }

    /// One enriched page of the catalog filtered by `genres`.
    pub async fn browse<S: AsRef<str>>(
        &self,
        page: u32,
        limit: u32,
        genres: &[S],
    ) -> Result<EnrichedPage> {
        check_page(page)?;
        check_limit(limit)?;

        let listing = self.catalog.cached_browse(page, limit, genres).await?;
        let data = self.enricher.enrich_page(listing.results.clone()).await;

        Ok(EnrichedPage {
            page: listing.page,
            has_next: listing.has_next,
            data,
        })
    }

    /// One enriched page of the popular listing.
    pub async fn popular(&self, page: u32, limit: u32) -> Result<EnrichedPage> {
        check_page(page)?;
        check_limit(limit)?;

        let listing = self.catalog.popular(page, limit).await?;
        let data = self.enricher.enrich_page(listing.results.clone()).await;

        Ok(EnrichedPage {
            page: listing.page,
            has_next: listing.has_next,
            data,
        })
    }

    /// Full details for one title, with its entry enriched.
    pub async fn info(&self, identifier: &str) -> Result<EnrichedDetail> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(Error::invalid_input("identifier must not be empty"));
        }

        let detail = (*self.catalog.info(identifier).await?).clone();
        let entry = self.enricher.enrich_one(detail.entry.clone()).await;
        info!(identifier, "Info complete");

        Ok(EnrichedDetail::new(entry, detail))
    }

    /// Enrich entries that did not come from the catalog.
    pub async fn enrich_page(&self, entries: Vec<CatalogEntry>) -> Vec<EnrichedEntry> {
        self.enricher.enrich_page(entries).await
    }
}

fn check_page(page: u32) -> Result<()> {
    if page == 0 {
        return Err(Error::invalid_input("page must be 1 or greater"));
    }
    Ok(())
}

fn check_limit(limit: u32) -> Result<()> {
    if limit == 0 || limit > MAX_LIMIT {
        return Err(Error::invalid_input(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }
    Ok(())
}
