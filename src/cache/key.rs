//! Cache key derivation for catalog requests.
//!
//! Keys are normalized so that requests which mean the same thing share one
//! cache slot: search text is trimmed and case-folded, and genre filters are
//! reduced to a sorted, de-duplicated list of case-folded names.

/// Key for the primary-source search cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchKey(String);

impl SearchKey {
    pub fn new(query: &str) -> Self {
        Self(query.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Which listing a [`ListingKey`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingKind {
    Browse,
    Popular,
}

/// Key for the primary-source listing cache (browse and popular pages).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListingKey {
    pub kind: ListingKind,
    pub page: u32,
    pub limit: u32,
    /// Canonical genre filter: trimmed, lowercase, non-empty, sorted, unique.
    pub genres: Vec<String>,
}

impl ListingKey {
    pub fn browse<S: AsRef<str>>(page: u32, limit: u32, genres: &[S]) -> Self {
        Self {
            kind: ListingKind::Browse,
            page,
            limit,
            genres: canonical_genres(genres),
        }
    }

    pub fn popular(page: u32, limit: u32) -> Self {
        Self {
            kind: ListingKind::Popular,
            page,
            limit,
            genres: Vec::new(),
        }
    }
}

/// Order- and case-independent form of a genre filter.
///
/// Catalog sources match genres case-insensitively, so `"Action"` and
/// `"action"` select the same page and share a key.
pub fn canonical_genres<S: AsRef<str>>(genres: &[S]) -> Vec<String> {
    let mut out: Vec<String> = genres
        .iter()
        .map(|g| g.as_ref().trim())
        .filter(|g| !g.is_empty())
        .map(str::to_lowercase)
        .collect();
    out.sort();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_key_normalizes_case_and_whitespace() {
        assert_eq!(SearchKey::new("  Naruto "), SearchKey::new("naruto"));
        assert_eq!(SearchKey::new("NARUTO").as_str(), "naruto");
        assert_ne!(SearchKey::new("naruto"), SearchKey::new("naruto shippuden"));
    }

    #[test]
    fn browse_key_ignores_genre_order() {
        let a = ListingKey::browse(1, 20, &["Action", "Comedy"]);
        let b = ListingKey::browse(1, 20, &["Comedy", "Action"]);
        assert_eq!(a, b);
    }

    #[test]
    fn browse_key_drops_blank_and_duplicate_genres() {
        let key = ListingKey::browse(2, 10, &[" Drama", "", "Drama ", "Action"]);
        assert_eq!(key.genres, vec!["action".to_string(), "drama".to_string()]);
    }

    #[test]
    fn browse_key_ignores_genre_case() {
        let a = ListingKey::browse(1, 20, &["Action", "Sci-Fi"]);
        let b = ListingKey::browse(1, 20, &["sci-fi", "ACTION", "action"]);
        assert_eq!(a, b);
        assert_eq!(a.genres, vec!["action".to_string(), "sci-fi".to_string()]);
    }

    #[test]
    fn browse_key_distinguishes_pagination() {
        let empty: [&str; 0] = [];
        assert_ne!(
            ListingKey::browse(1, 20, &empty),
            ListingKey::browse(2, 20, &empty)
        );
        assert_ne!(
            ListingKey::browse(1, 20, &empty),
            ListingKey::browse(1, 10, &empty)
        );
    }

    #[test]
    fn popular_and_browse_keys_never_collide() {
        let empty: [&str; 0] = [];
        assert_ne!(ListingKey::popular(1, 20), ListingKey::browse(1, 20, &empty));
    }
}
