//! Kitsu age-rating lookup.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::debug;

use crate::metadata::http::{endpoint, fetch_json};
use crate::metadata::provider::MetadataLookup;

pub const KITSU_BASE_URL: &str = "https://kitsu.io/api/edge";
const PROVIDER_NAME: &str = "kitsu";
const JSON_API: &str = "application/vnd.api+json";

#[derive(Debug, Deserialize)]
struct KitsuResponse {
    #[serde(default)]
    data: Vec<KitsuAnime>,
}

#[derive(Debug, Deserialize)]
struct KitsuAnime {
    attributes: Option<KitsuAttributes>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KitsuAttributes {
    age_rating: Option<String>,
    age_rating_guide: Option<String>,
}

/// Display label for a Kitsu age-rating code.
fn rating_label(code: &str) -> String {
    match code {
        "G" => "G - All Ages".to_string(),
        "PG" => "PG - Children".to_string(),
        "R" => "R - 17+".to_string(),
        "R18" => "R18 - Adults Only".to_string(),
        other => other.to_string(),
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl KitsuAttributes {
    fn classification(&self) -> Option<String> {
        non_blank(&self.age_rating)
            .map(rating_label)
            .or_else(|| non_blank(&self.age_rating_guide).map(str::to_string))
    }
}

/// Age-rating classification from Kitsu.
pub struct KitsuAgeRating {
    http: reqwest::Client,
    base_url: String,
}

impl KitsuAgeRating {
    pub fn new(http: reqwest::Client, base_url: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.unwrap_or_else(|| KITSU_BASE_URL.to_string()),
        }
    }
}

#[async_trait]
impl MetadataLookup<String> for KitsuAgeRating {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn lookup(&self, title: &str) -> Option<String> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        let url = endpoint(&self.base_url, "/anime");
        debug!(url = %url, title, "Kitsu anime search");
        let request = self
            .http
            .get(&url)
            .header(ACCEPT, JSON_API)
            .query(&[("filter[text]", title), ("page[limit]", "1")]);

        let body: KitsuResponse = fetch_json(PROVIDER_NAME, request).await?;
        body.data
            .into_iter()
            .next()?
            .attributes?
            .classification()
    }
}
