//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which writes a catalog file and a config file into
//! a temp directory and points every metadata provider at one [`MockServer`],
//! each under its own path prefix.

#![allow(dead_code)]

use std::path::PathBuf;

use anistream::config::{load_config, Config};
use anistream::service::DiscoveryService;
use anistream_common::CatalogEntry;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct TestHarness {
    pub server: MockServer,
    pub dir: TempDir,
    pub config_path: PathBuf,
    pub config: Config,
}

impl TestHarness {
    /// Harness serving `entries` with every provider enabled.
    pub async fn new(entries: &[CatalogEntry]) -> Self {
        Self::with_config(entries, |_| {}).await
    }

    /// Harness whose loaded config is adjusted by `tweak` before use.
    ///
    /// The config file on disk is not rewritten.
    pub async fn with_config<F: FnOnce(&mut Config)>(entries: &[CatalogEntry], tweak: F) -> Self {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().expect("failed to create temp dir");

        let catalog_path = dir.path().join("catalog.json");
        let catalog = serde_json::to_string_pretty(entries).expect("serialize catalog");
        std::fs::write(&catalog_path, catalog).expect("write catalog");

        let config_path = dir.path().join("anistream.toml");
        std::fs::write(&config_path, config_toml(&server.uri())).expect("write config");

        let mut config = load_config(&config_path).expect("generated config is valid");
        tweak(&mut config);

        Self {
            server,
            dir,
            config_path,
            config,
        }
    }

    pub fn service(&self) -> DiscoveryService {
        DiscoveryService::from_config(&self.config).expect("service builds")
    }

    /// Jikan search hit for `title`.
    pub async fn mock_jikan(&self, title: &str, episodes: Option<u32>, image: Option<&str>) {
        Mock::given(method("GET"))
            .and(path("/jikan/anime"))
            .and(query_param("q", title))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{
                    "episodes": episodes,
                    "images": {"jpg": {"large_image_url": image}}
                }]
            })))
            .mount(&self.server)
            .await;
    }

    /// AniList score for `title` on AniList's 0-100 scale, expected `times`
    /// times.
    pub async fn mock_anilist(&self, title: &str, score: u32, times: u64) {
        Mock::given(method("POST"))
            .and(path("/anilist"))
            .and(body_partial_json(json!({"variables": {"search": title}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"Media": {"averageScore": score, "meanScore": null}}
            })))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Kitsu age-rating code for `title`.
    pub async fn mock_kitsu(&self, title: &str, code: &str) {
        Mock::given(method("GET"))
            .and(path("/kitsu/anime"))
            .and(query_param("filter[text]", title))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"attributes": {"ageRating": code}}]
            })))
            .mount(&self.server)
            .await;
    }

    /// Every provider request fails with `status`.
    pub async fn mock_outage(&self, status: u16) {
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }
}

fn config_toml(base: &str) -> String {
    format!(
        r#"
[catalog]
path = "catalog.json"

[providers.jikan]
base_url = "{base}/jikan"
requests_per_second = 50

[providers.anilist]
base_url = "{base}/anilist"

[providers.kitsu]
base_url = "{base}/kitsu"
"#
    )
}

/// Small catalog used across the integration tests.
pub fn sample_catalog() -> Vec<CatalogEntry> {
    use anistream_common::Language;

    vec![
        CatalogEntry::new("nar-1", "Naruto")
            .with_languages([Language::Sub, Language::Dub])
            .with_image("/img/naruto.jpg")
            .with_genres(["Action", "Adventure"])
            .with_episode_count(Language::Sub, 220)
            .with_episode_count(Language::Dub, 220),
        CatalogEntry::new("frn-1", "Frieren")
            .with_languages([Language::Sub])
            .with_image("https://cdn.test/frieren.jpg")
            .with_genres(["Adventure", "Fantasy"]),
        CatalogEntry::new("mon-1", "Monster")
            .with_languages([Language::Sub])
            .with_genres(["Mystery"]),
    ]
}
