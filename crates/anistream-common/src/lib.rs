//! Anistream-Common: Shared types and error definitions.
//!
//! This crate provides the data model shared by the catalog, enrichment and
//! CLI layers of anistream:
//!
//! - **Catalog Types**: [`CatalogEntry`] as produced by a primary source and
//!   [`EnrichedEntry`] after metadata enrichment
//! - **Pages**: [`BrowsePage`], [`EnrichedPage`] and [`SearchResults`]
//! - **Error Handling**: Common error type and result alias
//!
//! # Examples
//!
//! ```
//! use anistream_common::{CatalogEntry, EnrichedEntry, Language};
//!
//! let entry = CatalogEntry::new("abc123", "Naruto").with_languages([Language::Sub]);
//! let enriched = EnrichedEntry::from(entry);
//! assert!(enriched.total_episodes.is_none());
//! ```

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
