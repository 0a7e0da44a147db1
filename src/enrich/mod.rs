//! Enrichment of catalog entries with provider metadata.
//!
//! - [`pipeline`] -- [`Enricher`], field-by-field merging for one entry.
//! - [`fanout`] -- [`PageEnricher`], bounded concurrent enrichment of a page.

pub mod fanout;
pub mod pipeline;

#[cfg(test)]
mod test_fixtures;

pub use fanout::{PageEnricher, DEFAULT_CONCURRENCY};
pub use pipeline::Enricher;
