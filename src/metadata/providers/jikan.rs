//! Jikan (unofficial MyAnimeList API) lookups.
//!
//! Jikan answers two questions for a title: its cover image and its total
//! episode count. Both come from the first hit of an anime search, so the two
//! lookups share one [`JikanClient`] and its rate limiter.
//!
//! Features:
//! - Token-bucket rate limiting (3 requests / second by default) via [`governor`].
//! - One search per title, shared by both lookups and memoized.
//! - The request timeout includes the wait for a rate-limit token.
//! - Only absolute http(s) image URLs are accepted.
//! - An episode count of zero (still airing, unknown) is treated as absent.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::debug;

use anistream_common::is_absolute_url;

use crate::cache::TtlCache;
use crate::metadata::http::{endpoint, fetch_json};
use crate::metadata::provider::{MemoPolicy, MetadataLookup};

pub const JIKAN_BASE_URL: &str = "https://api.jikan.moe/v4";
const PROVIDER_NAME: &str = "jikan";

// ---------------------------------------------------------------------------
// Jikan API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct JikanSearchResponse {
    #[serde(default)]
    data: Vec<JikanAnime>,
}

#[derive(Debug, Deserialize)]
struct JikanAnime {
    episodes: Option<u32>,
    images: Option<JikanImages>,
}

#[derive(Debug, Deserialize)]
struct JikanImages {
    jpg: Option<JikanImageSet>,
    webp: Option<JikanImageSet>,
}

#[derive(Debug, Deserialize)]
struct JikanImageSet {
    image_url: Option<String>,
    large_image_url: Option<String>,
}

impl JikanImageSet {
    fn best(&self) -> Option<&str> {
        [&self.large_image_url, &self.image_url]
            .into_iter()
            .filter_map(|url| url.as_deref())
            .find(|url| is_absolute_url(url))
    }
}

impl JikanAnime {
    fn cover_image(&self) -> Option<String> {
        let images = self.images.as_ref()?;
        images
            .jpg
            .as_ref()
            .and_then(JikanImageSet::best)
            .or_else(|| images.webp.as_ref().and_then(JikanImageSet::best))
            .map(|url| url.trim().to_string())
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// The two facts Jikan contributes, taken from one search hit.
#[derive(Debug, Clone)]
struct JikanMatch {
    episodes: Option<u32>,
    cover_image: Option<String>,
}

impl From<JikanAnime> for JikanMatch {
    fn from(anime: JikanAnime) -> Self {
        Self {
            cover_image: anime.cover_image(),
            episodes: anime.episodes.filter(|count| *count > 0),
        }
    }
}

type SearchCell = Arc<OnceCell<Option<JikanMatch>>>;

type DirectLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Rate-limited Jikan search client shared by the Jikan lookups.
///
/// Searches are memoized per case-folded title, so the cover image and the
/// episode count of one title cost a single request. Concurrent lookups of
/// the same title wait on the same in-flight search. The timeout covers the
/// wait for a rate-limit token as well as the request itself; a search that
/// times out is not remembered.
pub struct JikanClient {
    http: reqwest::Client,
    base_url: String,
    limiter: DirectLimiter,
    timeout: Duration,
    policy: MemoPolicy,
    searches: TtlCache<String, SearchCell>,
}

impl JikanClient {
    pub fn new(
        http: reqwest::Client,
        base_url: Option<String>,
        requests_per_second: u32,
        timeout: Duration,
        policy: MemoPolicy,
    ) -> Self {
        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            http,
            base_url: base_url.unwrap_or_else(|| JIKAN_BASE_URL.to_string()),
            limiter: RateLimiter::direct(Quota::per_second(rate)),
            timeout,
            searches: policy.cache(),
            policy,
        }
    }

    /// First search hit for `title`, or `None` on no match, failure or
    /// timeout.
    async fn first_match(&self, title: &str) -> Option<JikanMatch> {
        let title = title.trim();
        let key = title.to_lowercase();
        if key.is_empty() {
            return None;
        }

        let cell = self
            .searches
            .get_or_insert_with(key.clone(), || Arc::new(OnceCell::new()));
        let initialized = cell.initialized();

        let found = match tokio::time::timeout(
            self.timeout,
            cell.get_or_init(|| self.search(title)),
        )
        .await
        {
            Ok(found) => found.clone(),
            Err(_) => {
                debug!(title, timeout = ?self.timeout, "Jikan search timed out");
                return None;
            }
        };

        if found.is_none() && !initialized {
            // Shorten the lifetime of a remembered miss.
            self.searches
                .set_with_ttl(key, cell.clone(), self.policy.ttl_for(&found));
        }
        found
    }

    async fn search(&self, title: &str) -> Option<JikanMatch> {
        self.limiter.until_ready().await;

        let url = endpoint(&self.base_url, "/anime");
        debug!(url = %url, title, "Jikan anime search");
        let request = self.http.get(&url).query(&[("q", title), ("limit", "1")]);

        let body: JikanSearchResponse = fetch_json(PROVIDER_NAME, request).await?;
        body.data.into_iter().next().map(JikanMatch::from)
    }
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// Cover image URL from Jikan.
pub struct JikanCoverImage {
    client: Arc<JikanClient>,
}

impl JikanCoverImage {
    pub fn new(client: Arc<JikanClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MetadataLookup<String> for JikanCoverImage {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn lookup(&self, title: &str) -> Option<String> {
        self.client.first_match(title).await?.cover_image
    }
}

/// Total episode count from Jikan.
pub struct JikanEpisodeCount {
    client: Arc<JikanClient>,
}

impl JikanEpisodeCount {
    pub fn new(client: Arc<JikanClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MetadataLookup<u32> for JikanEpisodeCount {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn lookup(&self, title: &str) -> Option<u32> {
        self.client.first_match(title).await?.episodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::http::build_client;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> Arc<JikanClient> {
        client_with(server, 100, Duration::from_secs(5), MemoPolicy::new(64))
    }

    fn client_with(
        server: &MockServer,
        requests_per_second: u32,
        timeout: Duration,
        policy: MemoPolicy,
    ) -> Arc<JikanClient> {
        let http = build_client(Duration::from_secs(5)).unwrap();
        Arc::new(JikanClient::new(
            http,
            Some(server.uri()),
            requests_per_second,
            timeout,
            policy,
        ))
    }

    async fn mount_search(server: &MockServer, title: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/anime"))
            .and(query_param("q", title))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn cover_image_prefers_large_jpg() {
        let server = MockServer::start().await;
        mount_search(
            &server,
            "Naruto",
            json!({"data": [{
                "episodes": 220,
                "images": {
                    "jpg": {
                        "image_url": "https://cdn.myanimelist.net/images/anime/13/17405.jpg",
                        "large_image_url": "https://cdn.myanimelist.net/images/anime/13/17405l.jpg"
                    }
                }
            }]}),
        )
        .await;

        let lookup = JikanCoverImage::new(client_for(&server));
        assert_eq!(
            lookup.lookup("Naruto").await.as_deref(),
            Some("https://cdn.myanimelist.net/images/anime/13/17405l.jpg")
        );
    }

    #[tokio::test]
    async fn cover_image_falls_back_to_webp() {
        let server = MockServer::start().await;
        mount_search(
            &server,
            "Bleach",
            json!({"data": [{
                "images": {
                    "jpg": {"image_url": "not-a-url", "large_image_url": null},
                    "webp": {"image_url": "https://cdn.test/bleach.webp"}
                }
            }]}),
        )
        .await;

        let lookup = JikanCoverImage::new(client_for(&server));
        assert_eq!(
            lookup.lookup("Bleach").await.as_deref(),
            Some("https://cdn.test/bleach.webp")
        );
    }

    #[tokio::test]
    async fn episode_count_reads_first_hit() {
        let server = MockServer::start().await;
        mount_search(&server, "Naruto", json!({"data": [{"episodes": 220}]})).await;

        let lookup = JikanEpisodeCount::new(client_for(&server));
        assert_eq!(lookup.lookup("Naruto").await, Some(220));
    }

    #[tokio::test]
    async fn zero_or_missing_episode_count_is_absent() {
        let server = MockServer::start().await;
        mount_search(&server, "Airing", json!({"data": [{"episodes": 0}]})).await;
        mount_search(&server, "Unknown", json!({"data": [{"episodes": null}]})).await;

        let lookup = JikanEpisodeCount::new(client_for(&server));
        assert_eq!(lookup.lookup("Airing").await, None);
        assert_eq!(lookup.lookup("Unknown").await, None);
    }

    #[tokio::test]
    async fn no_results_is_absent() {
        let server = MockServer::start().await;
        mount_search(&server, "Nothing", json!({"data": []})).await;

        let client = client_for(&server);
        assert_eq!(JikanCoverImage::new(client.clone()).lookup("Nothing").await, None);
        assert_eq!(JikanEpisodeCount::new(client).lookup("Nothing").await, None);
    }

    #[tokio::test]
    async fn rate_limited_response_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let lookup = JikanEpisodeCount::new(client_for(&server));
        assert_eq!(lookup.lookup("Naruto").await, None);
    }

    #[tokio::test]
    async fn blank_title_skips_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(0)
            .mount(&server)
            .await;

        let lookup = JikanCoverImage::new(client_for(&server));
        assert_eq!(lookup.lookup("  ").await, None);
    }

    #[tokio::test]
    async fn cover_and_episode_count_share_one_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/anime"))
            .and(query_param("q", "Naruto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{
                "episodes": 220,
                "images": {"jpg": {"image_url": "https://cdn.test/naruto.jpg"}}
            }]})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let cover = JikanCoverImage::new(client.clone());
        let episodes = JikanEpisodeCount::new(client);

        let (image, count) = tokio::join!(cover.lookup("Naruto"), episodes.lookup("naruto"));
        assert_eq!(image.as_deref(), Some("https://cdn.test/naruto.jpg"));
        assert_eq!(count, Some(220));
        assert_eq!(episodes.lookup(" NARUTO ").await, Some(220));
    }

    #[tokio::test]
    async fn timeout_covers_rate_limit_wait() {
        let server = MockServer::start().await;
        mount_search(&server, "Monster", json!({"data": [{"episodes": 74}]})).await;
        Mock::given(method("GET"))
            .and(path("/anime"))
            .and(query_param("q", "Frieren"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"episodes": 28}]})))
            .expect(1)
            .mount(&server)
            .await;

        // One token per second: the first search drains the bucket.
        let timeout = Duration::from_millis(300);
        let client = client_with(&server, 1, timeout, MemoPolicy::new(8));
        let lookup = JikanEpisodeCount::new(client);
        assert_eq!(lookup.lookup("Monster").await, Some(74));

        let started = std::time::Instant::now();
        assert_eq!(lookup.lookup("Frieren").await, None);
        let waited = started.elapsed();
        assert!(waited >= timeout, "returned early after {waited:?}");
        assert!(waited < Duration::from_millis(900), "waited {waited:?}");

        // The timed-out search was not remembered.
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(lookup.lookup("Frieren").await, Some(28));
    }

    #[tokio::test]
    async fn missed_search_is_retried_after_miss_ttl() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/anime"))
            .respond_with(ResponseTemplate::new(429))
            .expect(2)
            .mount(&server)
            .await;

        let policy = MemoPolicy::new(8).with_miss_ttl(Duration::from_millis(200));
        let lookup = JikanCoverImage::new(client_with(&server, 100, Duration::from_secs(5), policy));

        assert_eq!(lookup.lookup("Naruto").await, None);
        assert_eq!(lookup.lookup("Naruto").await, None);
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(lookup.lookup("Naruto").await, None);
    }

    #[test]
    fn provider_name() {
        let http = reqwest::Client::new();
        let client = Arc::new(JikanClient::new(
            http,
            None,
            3,
            Duration::from_secs(5),
            MemoPolicy::new(8),
        ));
        assert_eq!(JikanCoverImage::new(client.clone()).name(), "jikan");
        assert_eq!(JikanEpisodeCount::new(client).name(), "jikan");
    }
}
