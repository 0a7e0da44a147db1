//! Concrete metadata provider implementations.
//!
//! Each submodule wraps a single external API and implements
//! [`MetadataLookup`](super::MetadataLookup) for the roles it can answer.

pub mod anilist;
pub mod jikan;
pub mod kitsu;

pub use anilist::AniListScore;
pub use jikan::{JikanClient, JikanCoverImage, JikanEpisodeCount};
pub use kitsu::KitsuAgeRating;
