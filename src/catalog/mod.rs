//! Primary catalog source and its cache-transparent service wrapper.
//!
//! A [`CatalogSource`] produces canonical entries (search and, when
//! supported, paginated browsing and per-title details). [`CatalogService`] sits in front of it,
//! resolves what the source can do once, and caches every successful answer
//! so repeated requests within the TTL never reach the source again.

mod file;

pub use file::FileCatalog;

use std::sync::Arc;

use anistream_common::{BrowsePage, CatalogDetail, CatalogEntry, Error, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::cache::{ListingKey, SearchKey, TtlCache};
use crate::config::CacheConfig;

/// Optional operations a catalog source supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogCapabilities {
    /// Paginated browsing with genre filters.
    pub browse: bool,
    /// An empty search query lists the whole catalog.
    pub empty_query: bool,
    /// Full details for a single identifier.
    pub details: bool,
}

/// The primary source of catalog entries.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Short identifier used in logs and errors.
    fn name(&self) -> &'static str;

    fn capabilities(&self) -> CatalogCapabilities;

    async fn search(&self, query: &str) -> anyhow::Result<Vec<CatalogEntry>>;

    /// One page of the catalog, restricted to entries that carry every genre
    /// in `genres`. `page` is 1-based.
    ///
    /// Genres arrive lowercase and must be matched case-insensitively.
    async fn browse(&self, _page: u32, _limit: u32, _genres: &[String]) -> anyhow::Result<BrowsePage> {
        anyhow::bail!("{} does not support browsing", self.name())
    }

    /// Full record for `identifier`, or `None` when the source has no such
    /// title.
    async fn info(&self, _identifier: &str) -> anyhow::Result<Option<CatalogDetail>> {
        anyhow::bail!("{} does not support details", self.name())
    }
}

/// Cached access to a [`CatalogSource`].
pub struct CatalogService {
    source: Arc<dyn CatalogSource>,
    capabilities: CatalogCapabilities,
    search_cache: TtlCache<SearchKey, Arc<Vec<CatalogEntry>>>,
    listing_cache: TtlCache<ListingKey, Arc<BrowsePage>>,
    detail_cache: TtlCache<String, Arc<CatalogDetail>>,
}

impl CatalogService {
    pub fn new(source: Arc<dyn CatalogSource>, cache: &CacheConfig) -> Self {
        let capabilities = source.capabilities();
        debug!(
            source = source.name(),
            browse = capabilities.browse,
            empty_query = capabilities.empty_query,
            details = capabilities.details,
            "Catalog source capabilities"
        );
        Self {
            source,
            capabilities,
            search_cache: TtlCache::new(cache.search_ttl(), cache.search_max_entries),
            listing_cache: TtlCache::new(cache.browse_ttl(), cache.browse_max_entries),
            detail_cache: TtlCache::new(cache.search_ttl(), cache.search_max_entries),
        }
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub fn capabilities(&self) -> CatalogCapabilities {
        self.capabilities
    }

    /// Search the source, answering repeats of the same query from cache.
    ///
    /// Queries are matched case-insensitively and ignoring surrounding
    /// whitespace.
    pub async fn cached_search(&self, query: &str) -> Result<Arc<Vec<CatalogEntry>>> {
        let key = SearchKey::new(query);
        if let Some(hit) = self.search_cache.get(&key) {
            debug!(query = key.as_str(), "Search cache hit");
            return Ok(hit);
        }

        let results = self
            .source
            .search(query.trim())
            .await
            .map_err(|e| self.upstream(e))?;

        let results = Arc::new(results);
        self.search_cache.set(key, results.clone());
        Ok(results)
    }

    /// Browse the source, answering repeats of the same page and filter set
    /// from cache.
    pub async fn cached_browse<S: AsRef<str>>(
        &self,
        page: u32,
        limit: u32,
        genres: &[S],
    ) -> Result<Arc<BrowsePage>> {
        if !self.capabilities.browse {
            return Err(Error::unsupported(format!(
                "{} does not support browsing",
                self.source.name()
            )));
        }

        let key = ListingKey::browse(page, limit, genres);
        if let Some(hit) = self.listing_cache.get(&key) {
            debug!(page, limit, genres = ?key.genres, "Browse cache hit");
            return Ok(hit);
        }

        let listing = self
            .source
            .browse(page, limit, &key.genres)
            .await
            .map_err(|e| self.upstream(e))?;

        let listing = Arc::new(listing);
        self.listing_cache.set(key, listing.clone());
        Ok(listing)
    }

    /// The "popular" listing.
    ///
    /// Uses unfiltered browsing when the source supports it, otherwise pages
    /// through the results of an empty search.
    pub async fn popular(&self, page: u32, limit: u32) -> Result<Arc<BrowsePage>> {
        if !self.capabilities.browse && !self.capabilities.empty_query {
            return Err(Error::unsupported(format!(
                "{} supports neither browsing nor empty queries",
                self.source.name()
            )));
        }

        let key = ListingKey::popular(page, limit);
        if let Some(hit) = self.listing_cache.get(&key) {
            debug!(page, limit, "Popular cache hit");
            return Ok(hit);
        }

        let listing = if self.capabilities.browse {
            self.source
                .browse(page, limit, &[])
                .await
                .map_err(|e| self.upstream(e))?
        } else {
            let everything = self
                .source
                .search("")
                .await
                .map_err(|e| self.upstream(e))?;
            paginate(everything, page, limit)
        };

        let listing = Arc::new(listing);
        self.listing_cache.set(key, listing.clone());
        Ok(listing)
    }

    /// Details for one identifier. Found records are cached; an unknown
    /// identifier is [`Error::NotFound`] and is asked again next time.
    pub async fn info(&self, identifier: &str) -> Result<Arc<CatalogDetail>> {
        if !self.capabilities.details {
            return Err(Error::unsupported(format!(
                "{} does not support details",
                self.source.name()
            )));
        }

        let identifier = identifier.trim();
        if let Some(hit) = self.detail_cache.get(&identifier.to_string()) {
            debug!(identifier, "Detail cache hit");
            return Ok(hit);
        }

        let detail = self
            .source
            .info(identifier)
            .await
            .map_err(|e| self.upstream(e))?
            .ok_or_else(|| Error::not_found(format!("anime '{identifier}'")))?;

        let detail = Arc::new(detail);
        self.detail_cache.set(identifier.to_string(), detail.clone());
        Ok(detail)
    }

    fn upstream(&self, err: anyhow::Error) -> Error {
        warn!(source = self.source.name(), error = %err, "Catalog source failed");
        Error::upstream(self.source.name(), format!("{err:#}"))
    }
}

/// Slice one 1-based page out of a full result list.
pub(crate) fn paginate(entries: Vec<CatalogEntry>, page: u32, limit: u32) -> BrowsePage {
    let limit = limit as usize;
    let start = (page.max(1) as usize - 1).saturating_mul(limit);
    let end = start.saturating_add(limit);
    let has_next = entries.len() > end;
    let results = entries.into_iter().skip(start).take(limit).collect();
    BrowsePage {
        page,
        has_next,
        results,
    }
}
