//! Metadata lookups used to enrich catalog entries.
//!
//! # Module layout
//!
//! - [`provider`] -- The [`MetadataLookup`] trait plus the [`Absent`] and
//!   [`Memoized`] wrappers.
//! - [`providers`] -- Concrete lookups (Jikan, AniList, Kitsu).
//! - [`registry`] -- [`ProviderSet`], one lookup per enrichment role.
//! - [`http`] -- The shared HTTP client and response handling.

pub mod http;
pub mod provider;
pub mod providers;
pub mod registry;

pub use provider::{Absent, MemoPolicy, MetadataLookup, Memoized};
pub use registry::ProviderSet;
