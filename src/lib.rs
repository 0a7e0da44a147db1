//! Anistream - anime catalog lookup with metadata enrichment
//!
//! This library crate exposes the core functionality for integration testing.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod enrich;
pub mod metadata;
pub mod service;
