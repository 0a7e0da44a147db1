//! Catalog source backed by a JSON file.
//!
//! The file holds a JSON array of catalog entries, each optionally carrying
//! detail fields (`synopsis`, `release_year`, `status`,
//! `alternative_names`). It is read once at construction and served from
//! memory afterwards.

use std::path::{Path, PathBuf};

use anistream_common::{BrowsePage, CatalogDetail, CatalogEntry};
use anyhow::Context;
use async_trait::async_trait;
use tracing::info;

use super::{paginate, CatalogCapabilities, CatalogSource};

pub struct FileCatalog {
    path: PathBuf,
    entries: Vec<CatalogDetail>,
}

impl FileCatalog {
    /// Load entries from `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {:?}", path))?;
        let entries: Vec<CatalogDetail> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse catalog file: {:?}", path))?;

        info!(path = %path.display(), entries = entries.len(), "Catalog loaded");
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self::from_details(entries.into_iter().map(CatalogDetail::from).collect())
    }

    pub fn from_details(entries: Vec<CatalogDetail>) -> Self {
        Self {
            path: PathBuf::new(),
            entries,
        }
    }

    fn catalog_entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().map(|detail| &detail.entry)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn has_all_genres(entry: &CatalogEntry, wanted: &[String]) -> bool {
    if wanted.is_empty() {
        return true;
    }
    let Some(genres) = &entry.genres else {
        return false;
    };
    wanted.iter().all(|w| {
        let w = w.trim().to_lowercase();
        genres.iter().any(|g| g.trim().to_lowercase() == w)
    })
}

#[async_trait]
impl CatalogSource for FileCatalog {
    fn name(&self) -> &'static str {
        "file"
    }

    fn capabilities(&self) -> CatalogCapabilities {
        CatalogCapabilities {
            browse: true,
            empty_query: true,
            details: true,
        }
    }

    async fn search(&self, query: &str) -> anyhow::Result<Vec<CatalogEntry>> {
        let needle = query.trim().to_lowercase();
        Ok(self
            .catalog_entries()
            .filter(|entry| needle.is_empty() || entry.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn browse(&self, page: u32, limit: u32, genres: &[String]) -> anyhow::Result<BrowsePage> {
        if page == 0 {
            anyhow::bail!("pages start at 1");
        }
        let matching: Vec<CatalogEntry> = self
            .catalog_entries()
            .filter(|entry| has_all_genres(entry, genres))
            .cloned()
            .collect();
        Ok(paginate(matching, page, limit))
    }

    async fn info(&self, identifier: &str) -> anyhow::Result<Option<CatalogDetail>> {
        Ok(self
            .entries
            .iter()
            .find(|detail| detail.entry.identifier == identifier)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anistream_common::Language;
    use std::io::Write;

    fn sample() -> FileCatalog {
        FileCatalog::from_entries(vec![
            CatalogEntry::new("1", "Naruto").with_genres(["Action", "Adventure"]),
            CatalogEntry::new("2", "Naruto Shippuden").with_genres(["Action"]),
            CatalogEntry::new("3", "Monster").with_genres(["Mystery", "Drama"]),
            CatalogEntry::new("4", "Mushishi"),
        ])
    }

    #[tokio::test]
    async fn search_is_case_insensitive_substring() {
        let catalog = sample();
        let hits = catalog.search("  naRUto ").await.unwrap();
        let ids: Vec<_> = hits.iter().map(|e| e.identifier.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
    }

    #[tokio::test]
    async fn empty_query_lists_everything() {
        assert_eq!(sample().search("").await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn browse_requires_every_genre() {
        let catalog = sample();
        let page = catalog
            .browse(1, 10, &["action".to_string(), "Adventure".to_string()])
            .await
            .unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].identifier, "1");
        assert!(!page.has_next);
    }

    #[tokio::test]
    async fn browse_paginates() {
        let catalog = sample();
        let first = catalog.browse(1, 3, &[]).await.unwrap();
        assert_eq!(first.results.len(), 3);
        assert!(first.has_next);

        let second = catalog.browse(2, 3, &[]).await.unwrap();
        assert_eq!(second.results.len(), 1);
        assert_eq!(second.results[0].identifier, "4");
        assert!(!second.has_next);
    }

    #[tokio::test]
    async fn browse_matches_non_ascii_genres_case_insensitively() {
        let catalog =
            FileCatalog::from_entries(vec![CatalogEntry::new("5", "Mahou").with_genres(["Ésotérique"])]);
        let page = catalog.browse(1, 10, &["ésotérique".to_string()]).await.unwrap();
        assert_eq!(page.results.len(), 1);
    }

    #[tokio::test]
    async fn info_finds_entry_with_details() {
        let mut frieren = CatalogDetail::from(CatalogEntry::new("7", "Frieren"));
        frieren.synopsis = Some("An elf mage outlives her party.".to_string());
        frieren.release_year = Some(2023);
        let catalog = FileCatalog::from_details(vec![frieren]);

        let detail = catalog.info("7").await.unwrap().unwrap();
        assert_eq!(detail.entry.name, "Frieren");
        assert_eq!(detail.release_year, Some(2023));
        assert!(catalog.info("8").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn page_zero_is_rejected() {
        assert!(sample().browse(0, 3, &[]).await.is_err());
    }

    #[test]
    fn load_reads_json_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"identifier": "a", "name": "Frieren", "languages": ["sub", "dub"],
                 "available_episodes": {{"sub": 28, "dub": 28}}, "status": "finished"}}]"#
        )
        .unwrap();

        let catalog = FileCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.path(), file.path());
        assert!(catalog.entries[0].entry.languages.contains(&Language::Dub));
        assert_eq!(catalog.entries[0].entry.best_episode_count(), Some(28));
        assert_eq!(catalog.entries[0].status.as_deref(), Some("finished"));
    }

    #[test]
    fn load_reports_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();

        let err = FileCatalog::load(file.path()).err().unwrap();
        assert!(err.to_string().contains("Failed to parse catalog file"));
    }
}
