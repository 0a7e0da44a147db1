//! Core type definitions for catalog entries and result pages.
//!
//! All enums are serialized in lowercase to match what clients of the
//! original catalog API expect (`"sub"`, `"dub"`).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Audio/subtitle language track of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Original audio with subtitles.
    Sub,
    /// Dubbed audio.
    Dub,
    /// Original audio without subtitles.
    Raw,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sub => write!(f, "sub"),
            Self::Dub => write!(f, "dub"),
            Self::Raw => write!(f, "raw"),
        }
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sub" => Ok(Self::Sub),
            "dub" => Ok(Self::Dub),
            "raw" => Ok(Self::Raw),
            other => Err(Error::invalid_input(format!(
                "Invalid language '{other}', must be 'sub', 'dub' or 'raw'"
            ))),
        }
    }
}

/// Returns `true` when `value` is an absolute http(s) URL.
///
/// The scheme check is case-insensitive and ignores surrounding whitespace.
pub fn is_absolute_url(value: &str) -> bool {
    let value = value.trim();
    let Some((scheme, rest)) = value.split_once("://") else {
        return false;
    };
    (scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https"))
        && !rest.is_empty()
}

/// A catalog entry as produced by the primary source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Primary-source identifier.
    pub identifier: String,
    /// Display name, also the lookup key for metadata providers.
    pub name: String,
    /// Available language tracks.
    #[serde(default)]
    pub languages: BTreeSet<Language>,
    /// Cover image as reported by the source. May be relative or garbage.
    #[serde(default)]
    pub image: Option<String>,
    /// Genre labels, if the source reports them.
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    /// Episode counts available per language.
    #[serde(default)]
    pub available_episodes: Option<BTreeMap<Language, u32>>,
}

impl CatalogEntry {
    /// Create an entry with only an identifier and a name.
    pub fn new<I: Into<String>, N: Into<String>>(identifier: I, name: N) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            languages: BTreeSet::new(),
            image: None,
            genres: None,
            available_episodes: None,
        }
    }

    pub fn with_languages<L: IntoIterator<Item = Language>>(mut self, languages: L) -> Self {
        self.languages = languages.into_iter().collect();
        self
    }

    pub fn with_image<S: Into<String>>(mut self, image: S) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_genres<G, S>(mut self, genres: G) -> Self
    where
        G: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = Some(genres.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_episode_count(mut self, language: Language, count: u32) -> Self {
        self.available_episodes
            .get_or_insert_with(BTreeMap::new)
            .insert(language, count);
        self
    }

    /// Best known total episode count: the maximum positive count across
    /// languages.
    pub fn best_episode_count(&self) -> Option<u32> {
        self.available_episodes
            .as_ref()?
            .values()
            .copied()
            .filter(|count| *count > 0)
            .max()
    }

    /// The source image, if it is usable as an absolute URL.
    pub fn valid_image(&self) -> Option<&str> {
        self.image
            .as_deref()
            .filter(|url| is_absolute_url(url))
            .map(str::trim)
    }
}

/// A catalog entry with metadata merged in from enrichment providers.
///
/// Each optional field is independently nullable; `None` means unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedEntry {
    pub identifier: String,
    pub name: String,
    pub languages: BTreeSet<Language>,
    pub image: Option<String>,
    pub genres: Option<Vec<String>>,
    /// Total number of episodes.
    pub total_episodes: Option<u32>,
    /// Audience score on a 0-10 scale.
    pub rating_score: Option<f64>,
    /// Human-readable age/content classification.
    pub rating_classification: Option<String>,
}

impl From<CatalogEntry> for EnrichedEntry {
    /// Carry over what the primary source already knows.
    ///
    /// An image that is not an absolute URL is dropped, never passed through.
    fn from(entry: CatalogEntry) -> Self {
        let image = entry.valid_image().map(str::to_string);
        let total_episodes = entry.best_episode_count();
        Self {
            identifier: entry.identifier,
            name: entry.name,
            languages: entry.languages,
            image,
            genres: entry.genres,
            total_episodes,
            rating_score: None,
            rating_classification: None,
        }
    }
}

/// One page of a browse or popular listing from the primary source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowsePage {
    pub page: u32,
    pub has_next: bool,
    pub results: Vec<CatalogEntry>,
}

/// One page of enriched entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedPage {
    pub page: u32,
    pub has_next: bool,
    pub data: Vec<EnrichedEntry>,
}

/// Enriched search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    /// Number of matches before truncation to the requested limit.
    pub total_results: usize,
    pub results: Vec<EnrichedEntry>,
}

/// Full record for a single title, as returned by a primary-source info
/// lookup.
///
/// Serialized flat: the catalog entry fields sit next to the detail fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDetail {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub release_year: Option<u32>,
    /// Airing status as reported by the source (e.g. "finished").
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub alternative_names: Option<Vec<String>>,
}

impl From<CatalogEntry> for CatalogDetail {
    fn from(entry: CatalogEntry) -> Self {
        Self {
            entry,
            synopsis: None,
            release_year: None,
            status: None,
            alternative_names: None,
        }
    }
}

/// A [`CatalogDetail`] whose entry has been enriched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedDetail {
    #[serde(flatten)]
    pub entry: EnrichedEntry,
    pub synopsis: Option<String>,
    pub release_year: Option<u32>,
    pub status: Option<String>,
    pub alternative_names: Option<Vec<String>>,
}

impl EnrichedDetail {
    /// Attach the detail fields of `detail` to an already enriched entry.
    pub fn new(entry: EnrichedEntry, detail: CatalogDetail) -> Self {
        Self {
            entry,
            synopsis: detail.synopsis,
            release_year: detail.release_year,
            status: detail.status,
            alternative_names: detail.alternative_names,
        }
    }
}
