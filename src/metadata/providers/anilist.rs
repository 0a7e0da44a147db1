//! AniList audience-score lookup.
//!
//! AniList reports scores on a 0-100 scale; they are rescaled to 0-10 here so
//! callers only ever see one scale.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::metadata::http::fetch_json;
use crate::metadata::provider::MetadataLookup;

pub const ANILIST_BASE_URL: &str = "https://graphql.anilist.co";
const PROVIDER_NAME: &str = "anilist";

const SCORE_QUERY: &str = r#"
query ($search: String) {
  Media(search: $search, type: ANIME) {
    averageScore
    meanScore
  }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<MediaData>,
}

#[derive(Debug, Deserialize)]
struct MediaData {
    #[serde(rename = "Media")]
    media: Option<Media>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Media {
    average_score: Option<f64>,
    mean_score: Option<f64>,
}

/// Convert a 0-100 score to 0-10 with one decimal.
fn rescale(score: f64) -> Option<f64> {
    if !score.is_finite() || !(0.0..=100.0).contains(&score) {
        return None;
    }
    Some(score.round() / 10.0)
}

/// Audience score from AniList.
pub struct AniListScore {
    http: reqwest::Client,
    base_url: String,
}

impl AniListScore {
    pub fn new(http: reqwest::Client, base_url: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.unwrap_or_else(|| ANILIST_BASE_URL.to_string()),
        }
    }
}

#[async_trait]
impl MetadataLookup<f64> for AniListScore {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn lookup(&self, title: &str) -> Option<f64> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        debug!(url = %self.base_url, title, "AniList score query");
        let request = self.http.post(&self.base_url).json(&json!({
            "query": SCORE_QUERY,
            "variables": { "search": title },
        }));

        let body: GraphQlResponse = fetch_json(PROVIDER_NAME, request).await?;
        let media = body.data?.media?;
        media.average_score.or(media.mean_score).and_then(rescale)
    }
}
