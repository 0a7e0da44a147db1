use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    #[serde(default)]
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// JSON file holding the catalog entries served by the file source
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("catalog.json")
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_listing_ttl")]
    pub search_ttl_secs: u64,

    #[serde(default = "default_search_max_entries")]
    pub search_max_entries: usize,

    #[serde(default = "default_listing_ttl")]
    pub browse_ttl_secs: u64,

    #[serde(default = "default_browse_max_entries")]
    pub browse_max_entries: usize,
}

fn default_listing_ttl() -> u64 {
    60
}
fn default_search_max_entries() -> usize {
    512
}
fn default_browse_max_entries() -> usize {
    256
}

impl CacheConfig {
    pub fn search_ttl(&self) -> Duration {
        Duration::from_secs(self.search_ttl_secs)
    }

    pub fn browse_ttl(&self) -> Duration {
        Duration::from_secs(self.browse_ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            search_ttl_secs: default_listing_ttl(),
            search_max_entries: default_search_max_entries(),
            browse_ttl_secs: default_listing_ttl(),
            browse_max_entries: default_browse_max_entries(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnrichmentConfig {
    /// Maximum entries, and provider calls, in flight while enriching one page
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-request timeout for metadata providers
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Distinct titles remembered per provider
    #[serde(default = "default_memo_max_entries")]
    pub memo_max_entries: usize,

    /// Forget memoized lookups after this long (default: never)
    #[serde(default)]
    pub memo_ttl_secs: Option<u64>,

    /// Forget lookups that found nothing (including timeouts and upstream
    /// errors) after this long
    #[serde(default = "default_memo_miss_ttl")]
    pub memo_miss_ttl_secs: u64,

    /// Backfill missing cover images for the whole page before enrichment
    #[serde(default)]
    pub image_prepass: bool,
}

fn default_concurrency() -> usize {
    10
}
fn default_request_timeout() -> u64 {
    5
}
fn default_memo_max_entries() -> usize {
    128
}
fn default_memo_miss_ttl() -> u64 {
    300
}

impl EnrichmentConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn memo_ttl(&self) -> Option<Duration> {
        self.memo_ttl_secs.map(Duration::from_secs)
    }

    /// TTL for remembered misses, never longer than [`memo_ttl`](Self::memo_ttl).
    pub fn memo_miss_ttl(&self) -> Duration {
        let miss = Duration::from_secs(self.memo_miss_ttl_secs);
        self.memo_ttl().map_or(miss, |ttl| ttl.min(miss))
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            request_timeout_secs: default_request_timeout(),
            memo_max_entries: default_memo_max_entries(),
            memo_ttl_secs: None,
            memo_miss_ttl_secs: default_memo_miss_ttl(),
            image_prepass: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProvidersConfig {
    /// Jikan (MyAnimeList) supplies cover images and episode counts
    #[serde(default)]
    pub jikan: JikanConfig,

    /// AniList supplies audience scores
    #[serde(default)]
    pub anilist: ProviderEndpoint,

    /// Kitsu supplies age ratings
    #[serde(default)]
    pub kitsu: ProviderEndpoint,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JikanConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Override the public API root (default: the provider's own)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Jikan rejects bursts above its public limit of 3 requests per second
    #[serde(default = "default_jikan_rate")]
    pub requests_per_second: u32,
}

fn default_enabled() -> bool {
    true
}
fn default_jikan_rate() -> u32 {
    3
}

impl Default for JikanConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            base_url: None,
            requests_per_second: default_jikan_rate(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderEndpoint {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Override the public API root (default: the provider's own)
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for ProviderEndpoint {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            base_url: None,
        }
    }
}
